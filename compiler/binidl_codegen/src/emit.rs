//! Rust source emission.
//!
//! Renders a [`PlanSet`] as one Rust module: aliases, record structs with a
//! zeroing `Default`, `binidl_rt::Marshal` and `binidl_rt::Unmarshal`
//! impls, and pools. Emitted code names everything by full path, so it
//! needs no `use` items and compiles wherever `binidl_rt` is a dependency.
//!
//! Multi-byte fields are converted with explicit shifts in the configured
//! byte order, matching `binidl_rt::put_uint` / `get_uint` byte for byte.

mod mangle;
mod writer;

use std::fmt::Write as _;

use binidl_ir::{Arity, Endian, Field, PrimitiveKind, TypeDef, TypeGraph, TypeRef};
use binidl_layout::Strategy;

pub use mangle::{field_ident, type_ident};
pub use writer::SourceWriter;

use crate::plan::{contains_resize, CodecPlan, LoopCount, Op, Path, PlanSet, Step};
use crate::pool::PoolDecl;
use crate::synth::Direction;
use crate::GeneratorConfig;

/// Render every alias and record of `graph` as Rust source.
#[tracing::instrument(level = "debug", skip_all, fields(records = plans.len()))]
pub fn emit_module(graph: &TypeGraph, plans: &PlanSet, config: &GeneratorConfig) -> String {
    let mut w = SourceWriter::new();
    w.writeln("// Code generated by binidl. DO NOT EDIT.");
    w.writeln(&format!("// Byte order: {}.", plans.endian));

    for (name, def) in graph.iter() {
        match def {
            TypeDef::Alias(kind) => {
                w.newline();
                w.writeln(&format!(
                    "pub type {} = {};",
                    type_ident(name.as_str()),
                    kind.rust_name()
                ));
            }
            TypeDef::Record(fields) => {
                let Some(plan) = plans.get(name.as_str()) else {
                    continue;
                };
                let mut record = RecordEmitter {
                    graph,
                    plan,
                    endian: plans.endian,
                    ty: type_ident(name.as_str()),
                    decoded_len: None,
                    w: &mut w,
                };
                record.emit_struct(fields);
                record.emit_default(fields);
                record.emit_marshal();
                record.emit_unmarshal();
                if config.emit_pools {
                    PoolDecl::for_record(name).emit(&mut w);
                }
            }
            TypeDef::External { .. } => {}
        }
    }
    w.take_output()
}

struct RecordEmitter<'a> {
    graph: &'a TypeGraph,
    plan: &'a CodecPlan,
    endian: Endian,
    ty: String,
    /// Sequence path and the local holding its freshly read length.
    decoded_len: Option<(Path, String)>,
    w: &'a mut SourceWriter,
}

impl RecordEmitter<'_> {
    fn emit_struct(&mut self, fields: &[Field]) {
        self.w.newline();
        self.w.writeln("#[derive(Debug, Clone, PartialEq, Eq)]");
        self.w.open(&format!("pub struct {} {{", self.ty));
        for field in fields {
            let line = format!(
                "pub {}: {},",
                field_ident(field.name.as_str()),
                self.field_type(field)
            );
            self.w.writeln(&line);
        }
        self.w.close("}");
    }

    fn emit_default(&mut self, fields: &[Field]) {
        self.w.newline();
        self.w.open(&format!("impl Default for {} {{", self.ty));
        self.w.open("fn default() -> Self {");
        self.w.open(&format!("{} {{", self.ty));
        for field in fields {
            let line = format!(
                "{}: {},",
                field_ident(field.name.as_str()),
                self.zero_value(field)
            );
            self.w.writeln(&line);
        }
        self.w.close("}");
        self.w.close("}");
        self.w.close("}");
    }

    fn emit_marshal(&mut self) {
        let plan = self.plan;
        let ops = &plan.marshal;
        let sink = if ops.is_empty() { "_w" } else { "w" };
        self.w.newline();
        self.w.open(&format!("impl binidl_rt::Marshal for {} {{", self.ty));
        self.w.open(&format!(
            "fn marshal<W: std::io::Write + ?Sized>(&self, {sink}: &mut W) -> std::io::Result<()> {{"
        ));
        self.emit_body(ops, Direction::Marshal, false);
        self.w.close("}");
        self.w.newline();
        self.w.open("fn binary_size() -> binidl_rt::BinarySize {");
        self.w.writeln(&format!(
            "binidl_rt::BinarySize::new({}, {})",
            plan.fixed_size, plan.size_is_exact
        ));
        self.w.close("}");
        self.w.close("}");
    }

    fn emit_unmarshal(&mut self) {
        let plan = self.plan;
        let ops = &plan.unmarshal;
        let source = if ops.is_empty() { "_r" } else { "r" };
        self.w.newline();
        self.w.open(&format!("impl binidl_rt::Unmarshal for {} {{", self.ty));
        if plan.needs_byte_source {
            self.w.open(
                "fn unmarshal_from<R: std::io::Read + ?Sized>(&mut self, r: &mut R) -> std::io::Result<()> {",
            );
            self.w.writeln(
                "binidl_rt::Unmarshal::unmarshal_buffered(self, &mut binidl_rt::ByteReader::new(r))",
            );
            self.w.close("}");
            self.w.newline();
            self.w.open(&format!(
                "fn unmarshal_buffered<R: binidl_rt::ByteRead + ?Sized>(&mut self, {source}: &mut R) -> std::io::Result<()> {{"
            ));
            self.emit_body(ops, Direction::Unmarshal, true);
        } else {
            self.w.open(&format!(
                "fn unmarshal_from<R: std::io::Read + ?Sized>(&mut self, {source}: &mut R) -> std::io::Result<()> {{"
            ));
            self.emit_body(ops, Direction::Unmarshal, false);
        }
        self.w.close("}");
        self.w.close("}");
    }

    fn emit_body(&mut self, ops: &[Op], dir: Direction, buffered: bool) {
        self.w.reset_temps();
        let len = self.plan.buffer_len;
        match self.plan.strategy {
            Strategy::Static if !ops.is_empty() => {
                self.w.writeln(&format!("let mut buf = [0u8; {len}];"));
            }
            Strategy::Streaming if contains_resize(ops) => {
                self.w.writeln(&format!("let mut scratch = [0u8; {len}];"));
            }
            Strategy::Static | Strategy::Streaming => {}
        }
        self.emit_ops(ops, dir, buffered);
        self.w.writeln("Ok(())");
    }

    fn emit_ops(&mut self, ops: &[Op], dir: Direction, buffered: bool) {
        let statik = self.plan.strategy == Strategy::Static;
        let buf = if statik { "buf" } else { "view" };
        for op in ops {
            match op {
                Op::Resize(len) => self.w.writeln(&format!("let view = &mut scratch[..{len}];")),
                Op::Store { offset, kind, path } => self.store(buf, *offset, *kind, &render_path(path)),
                Op::Load { offset, kind, path } => self.load(buf, *offset, *kind, &render_path(path)),
                Op::Write if statik => self.w.writeln("w.write_all(&buf)?;"),
                Op::Write => self.w.writeln("w.write_all(view)?;"),
                Op::Fill if statik => self.w.writeln("r.read_exact(&mut buf)?;"),
                Op::Fill => self.w.writeln("r.read_exact(view)?;"),
                Op::Dispatch { path, .. } => {
                    let target = render_path(path);
                    let call = match (dir, buffered) {
                        (Direction::Marshal, _) => format!("binidl_rt::Marshal::marshal(&{target}, w)?;"),
                        (Direction::Unmarshal, true) => {
                            format!("binidl_rt::Unmarshal::unmarshal_buffered(&mut {target}, r)?;")
                        }
                        (Direction::Unmarshal, false) => {
                            format!("binidl_rt::Unmarshal::unmarshal_from(&mut {target}, r)?;")
                        }
                    };
                    self.w.writeln(&call);
                }
                Op::WriteLen { path } => {
                    let line = format!("binidl_rt::write_len(w, {}.len())?;", render_path(path));
                    self.w.writeln(&line);
                }
                Op::ReadLen { path } => {
                    let len = self.w.fresh_temp();
                    self.w.writeln(&format!("let {len} = binidl_rt::read_len(r)?;"));
                    self.w.writeln(&format!(
                        "binidl_rt::begin_seq(&mut {}, {len});",
                        render_path(path)
                    ));
                    self.decoded_len = Some((path.clone(), len));
                }
                Op::Loop { var, count, body } => {
                    let (bound, grows) = match count {
                        LoopCount::Fixed(n) => (n.to_string(), None),
                        LoopCount::LenOf(path) => match self.decoded_len.take() {
                            Some((read, len)) if read == *path => (len, Some(render_path(path))),
                            _ => (format!("{}.len()", render_path(path)), None),
                        },
                    };
                    self.w.open(&format!("for {} in 0..{bound} {{", var.name()));
                    if let Some(seq) = grows {
                        self.w.writeln(&format!(
                            "binidl_rt::seq_element(&mut {seq}, {}, Default::default);",
                            var.name()
                        ));
                    }
                    self.emit_ops(body, dir, buffered);
                    self.w.close("}");
                }
            }
        }
    }

    fn store(&mut self, buf: &str, offset: usize, kind: PrimitiveKind, value: &str) {
        let width = kind.width();
        if width == 1 {
            let byte = if kind.is_signed() {
                format!("{value} as u8")
            } else {
                value.to_string()
            };
            self.w.writeln(&format!("{buf}[{offset}] = {byte};"));
            return;
        }

        let temp = self.w.fresh_temp();
        let bits = if kind.is_signed() {
            format!("{value} as {}", kind.encodes_as().rust_name())
        } else {
            value.to_string()
        };
        self.w.writeln(&format!("let {temp} = {bits};"));
        for index in 0..width {
            let byte = match self.endian.shift(width, index) {
                0 => format!("{temp} as u8"),
                shift => format!("({temp} >> {shift}) as u8"),
            };
            self.w.writeln(&format!("{buf}[{}] = {byte};", offset + index));
        }
    }

    fn load(&mut self, buf: &str, offset: usize, kind: PrimitiveKind, target: &str) {
        let width = kind.width();
        let value = if width == 1 {
            if kind.is_signed() {
                format!("{buf}[{offset}] as i8")
            } else {
                format!("{buf}[{offset}]")
            }
        } else {
            let unsigned = kind.encodes_as().rust_name();
            let bits = (0..width)
                .map(|index| {
                    let byte = format!("{unsigned}::from({buf}[{}])", offset + index);
                    match self.endian.shift(width, index) {
                        0 => byte,
                        shift => format!("({byte} << {shift})"),
                    }
                })
                .collect::<Vec<_>>()
                .join(" | ");
            if kind.is_signed() {
                format!("({bits}) as {}", kind.rust_name())
            } else {
                bits
            }
        };
        self.w.writeln(&format!("{target} = {value};"));
    }

    fn is_primitive(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Primitive(_) => true,
            TypeRef::Named(name) => matches!(self.graph.get(name.as_str()), Some(TypeDef::Alias(_))),
        }
    }

    fn element_type(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Primitive(kind) => kind.rust_name().to_string(),
            TypeRef::Named(name) => match self.graph.get(name.as_str()) {
                Some(TypeDef::External { path }) => path.to_string(),
                _ => type_ident(name.as_str()),
            },
        }
    }

    fn field_type(&self, field: &Field) -> String {
        let elem = self.element_type(&field.ty);
        match field.arity {
            Arity::Scalar => elem,
            Arity::FixedArray(len) => format!("[{elem}; {len}]"),
            Arity::VariableArray => format!("Vec<{elem}>"),
        }
    }

    fn zero_value(&self, field: &Field) -> String {
        let primitive = self.is_primitive(&field.ty);
        match field.arity {
            Arity::Scalar if primitive => "0".to_string(),
            Arity::Scalar => "Default::default()".to_string(),
            Arity::FixedArray(len) if primitive => format!("[0; {len}]"),
            Arity::FixedArray(_) => "std::array::from_fn(|_| Default::default())".to_string(),
            Arity::VariableArray => "Vec::new()".to_string(),
        }
    }
}

/// Render an access path rooted at `self`.
fn render_path(path: &Path) -> String {
    let mut out = String::from("self");
    for step in path {
        match step {
            Step::Field(name) => {
                out.push('.');
                out.push_str(&field_ident(name.as_str()));
            }
            Step::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
            Step::Var(var) => {
                let _ = write!(out, "[{}]", var.name());
            }
        }
    }
    out
}
