//! Instance pool generation.
//!
//! Every record gets a `FooPool` alias for `binidl_rt::InstancePool<Foo>`
//! and a `Foo::pool()` accessor for a lazily created process-wide pool.
//! Pools are independent of the record's buffer strategy.

use binidl_ir::Name;

use crate::emit::{type_ident, SourceWriter};

/// Names emitted for one record's pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolDecl {
    /// Rust identifier of the pooled record.
    pub record: String,
    /// Rust identifier of the pool alias.
    pub alias: String,
}

impl PoolDecl {
    pub fn for_record(record: &Name) -> Self {
        let record = type_ident(record.as_str());
        let alias = format!("{}Pool", record.trim_start_matches("r#"));
        PoolDecl { record, alias }
    }

    pub(crate) fn emit(&self, w: &mut SourceWriter) {
        let PoolDecl { record, alias } = self;
        w.newline();
        w.writeln(&format!("/// Pool of recycled `{record}` instances."));
        w.writeln(&format!(
            "pub type {alias} = binidl_rt::InstancePool<{record}>;"
        ));
        w.newline();
        w.open(&format!("impl {record} {{"));
        w.writeln("/// The process-wide instance pool.");
        w.open(&format!("pub fn pool() -> &'static {alias} {{"));
        w.writeln(&format!(
            "static POOL: std::sync::OnceLock<{alias}> = std::sync::OnceLock::new();"
        ));
        w.writeln(&format!("POOL.get_or_init({alias}::new)"));
        w.close("}");
        w.close("}");
    }
}
