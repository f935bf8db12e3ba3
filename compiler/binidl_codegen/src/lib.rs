//! Codec synthesis and Rust code generation for binidl.
//!
//! # Architecture
//!
//! ```text
//! TypeGraph
//!     ↓
//! binidl_layout::analyze      (LayoutInfo + FieldClass per record)
//!     ↓
//! select_strategy             (Static or Streaming per record)
//!     ↓
//! synthesize_record           (CodecPlan: marshal + unmarshal ops)
//!     ↓
//! emit_module                 (Rust source, pools included)
//! ```
//!
//! [`synthesize`] stops after planning; `binidl_eval` executes the plans
//! directly. [`generate`] runs the whole pipeline.

mod config;
mod context;
pub mod emit;
pub mod plan;
mod pool;
mod synth;

use std::sync::Once;

use binidl_ir::{SchemaError, TypeGraph};

pub use config::GeneratorConfig;
pub use context::{LoopScope, SynthesisContext};
pub use emit::emit_module;
pub use plan::{CodecPlan, IndexVar, LoopCount, Op, Path, PlanSet, Step};
pub use pool::PoolDecl;
pub use synth::{synthesize_procedure, synthesize_record, Direction};

/// Environment variable holding the tracing filter for generation runs.
pub const LOG_ENV: &str = "BINIDL_LOG";

static TRACING_INIT: Once = Once::new();

/// Send analysis and synthesis traces to stderr.
///
/// Does nothing unless [`LOG_ENV`] holds a filter such as
/// `binidl_layout=trace,binidl_codegen=debug`, or when another subscriber is
/// already installed. Build scripts that generate codecs call this first;
/// their stderr shows up in `cargo build -vv`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) else {
            return;
        };
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .without_time(),
            )
            .with(filter)
            .try_init();
    });
}

/// Output of a full generation run.
#[derive(Clone, Debug)]
pub struct Generated {
    /// The synthesized procedures, one per record.
    pub plans: PlanSet,
    /// The emitted Rust module.
    pub source: String,
}

/// Analyze `graph` and synthesize a plan for every record.
pub fn synthesize(graph: &TypeGraph, config: &GeneratorConfig) -> Result<PlanSet, SchemaError> {
    let layouts = binidl_layout::analyze(graph)?;
    let mut plans = PlanSet::new(config.endian);
    for (name, _) in graph.records() {
        plans.push(synthesize_record(graph, &layouts, config, name.as_str())?);
    }
    Ok(plans)
}

/// Run the whole pipeline: analysis, synthesis, and Rust emission.
#[tracing::instrument(level = "debug", skip_all, fields(types = graph.len()))]
pub fn generate(graph: &TypeGraph, config: &GeneratorConfig) -> Result<Generated, SchemaError> {
    let plans = synthesize(graph, config)?;
    let source = emit_module(graph, &plans, config);
    Ok(Generated { plans, source })
}
