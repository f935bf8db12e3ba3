//! Marshal and unmarshal synthesis.
//!
//! Both procedures come from one walk over a record's fields in declaration
//! order. Inline primitives, including those of inlined records and
//! unrolled fixed arrays, accumulate into the current run at increasing
//! offsets. Anything else (a dispatched field, a length prefix, a loop)
//! first flushes the run: one view resize if the length changed, then the
//! stores and a write, or a fill and the loads.

use binidl_ir::{Field, Name, PrimitiveKind, SchemaError, TypeDef, TypeGraph};
use binidl_layout::{select_strategy, Element, FieldClass, Layouts, RecordLayout, Strategy};
use tracing::{debug, trace};

use crate::context::SynthesisContext;
use crate::plan::{CodecPlan, LoopCount, Op, Path, Step};
use crate::GeneratorConfig;

/// Which procedure is being synthesized.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Marshal,
    Unmarshal,
}

/// A primitive waiting in the current run.
struct Slot {
    offset: usize,
    kind: PrimitiveKind,
    path: Path,
}

struct Walker<'a> {
    graph: &'a TypeGraph,
    layouts: &'a Layouts,
    dir: Direction,
    ctx: SynthesisContext,
    ops: Vec<Op>,
    run: Vec<Slot>,
    run_len: usize,
}

/// Synthesize both procedures of `record`.
#[tracing::instrument(level = "debug", skip(graph, layouts, config))]
pub fn synthesize_record(
    graph: &TypeGraph,
    layouts: &Layouts,
    config: &GeneratorConfig,
    record: &str,
) -> Result<CodecPlan, SchemaError> {
    let name = match graph.get(record) {
        Some(TypeDef::Record(_)) => Name::new(record),
        Some(TypeDef::Alias(_) | TypeDef::External { .. }) => {
            return Err(SchemaError::NotARecord {
                name: Name::new(record),
            })
        }
        None => {
            return Err(SchemaError::UnknownType {
                name: Name::new(record),
            })
        }
    };
    let layout = layouts
        .get(record)
        .ok_or_else(|| SchemaError::UnknownType { name: name.clone() })?;
    let info = &layout.info;
    let strategy = select_strategy(info, config.static_threshold);

    let marshal = synthesize_procedure(graph, layouts, &name, strategy, Direction::Marshal)?;
    let unmarshal = synthesize_procedure(graph, layouts, &name, strategy, Direction::Unmarshal)?;

    let buffer_len = match strategy {
        Strategy::Static => info.fixed_size,
        Strategy::Streaming => info.max_run().max(info.max_field_width),
    };
    debug!(%name, ?strategy, buffer_len, "synthesized record");

    Ok(CodecPlan {
        record: name,
        strategy,
        buffer_len,
        fixed_size: info.fixed_size,
        size_is_exact: info.size_is_exact(),
        needs_byte_source: info.needs_byte_source(),
        marshal,
        unmarshal,
    })
}

/// Synthesize one procedure of `record` under `strategy`.
pub fn synthesize_procedure(
    graph: &TypeGraph,
    layouts: &Layouts,
    record: &Name,
    strategy: Strategy,
    dir: Direction,
) -> Result<Vec<Op>, SchemaError> {
    let mut walker = Walker {
        graph,
        layouts,
        dir,
        ctx: SynthesisContext::new(record.clone(), strategy),
        ops: Vec::new(),
        run: Vec::new(),
        run_len: 0,
    };
    walker.walk_record(record, &Path::new())?;
    walker.flush_run();
    trace!(%record, ?dir, resizes = walker.ctx.resizes(), "procedure done");
    Ok(walker.ops)
}

impl<'a> Walker<'a> {
    fn parts(&self, record: &Name) -> Option<(&'a [Field], &'a RecordLayout)> {
        let graph: &'a TypeGraph = self.graph;
        let layouts: &'a Layouts = self.layouts;
        let fields = graph.get(record.as_str()).and_then(TypeDef::fields)?;
        let layout = layouts.get(record.as_str())?;
        Some((fields, layout))
    }

    fn walk_record(&mut self, record: &Name, base: &Path) -> Result<(), SchemaError> {
        let Some((fields, layout)) = self.parts(record) else {
            return Err(SchemaError::UnknownType {
                name: record.clone(),
            });
        };
        for (field, class) in fields.iter().zip(&layout.fields) {
            let mut path = base.clone();
            path.push(Step::Field(field.name.clone()));
            self.walk_field(field, class, path)?;
        }
        Ok(())
    }

    fn walk_field(&mut self, field: &Field, class: &FieldClass, path: Path) -> Result<(), SchemaError> {
        match class {
            FieldClass::Primitive(kind) => self.push_slot(*kind, path),
            FieldClass::InlinableRecord(ty) => self.walk_record(ty, &path)?,
            FieldClass::DispatchedRecord(ty) => self.dispatch(ty, path),
            FieldClass::FixedArray { len, elem } => match elem {
                Element::Primitive(kind) => {
                    for index in 0..*len {
                        self.push_slot(*kind, indexed(&path, index));
                    }
                }
                Element::Inline(ty) => {
                    for index in 0..*len {
                        self.walk_record(ty, &indexed(&path, index))?;
                    }
                }
                Element::Dispatched(ty) => {
                    self.flush_run();
                    self.emit_loop(field, &path, LoopCount::Fixed(*len), |walker, elem| {
                        walker.dispatch(ty, elem);
                    })?;
                }
            },
            FieldClass::VariableArray { elem } => {
                self.flush_run();
                self.ops.push(match self.dir {
                    Direction::Marshal => Op::WriteLen { path: path.clone() },
                    Direction::Unmarshal => Op::ReadLen { path: path.clone() },
                });
                let count = LoopCount::LenOf(path.clone());
                match elem {
                    Element::Primitive(kind) => {
                        let kind = *kind;
                        self.emit_loop(field, &path, count, |walker, elem| {
                            walker.push_slot(kind, elem);
                            walker.flush_run();
                        })?;
                    }
                    Element::Inline(ty) | Element::Dispatched(ty) => {
                        self.emit_loop(field, &path, count, |walker, elem| {
                            walker.dispatch(ty, elem);
                        })?;
                    }
                }
            }
        }
        Ok(())
    }

    fn push_slot(&mut self, kind: PrimitiveKind, path: Path) {
        self.run.push(Slot {
            offset: self.run_len,
            kind,
            path,
        });
        self.run_len += kind.width();
    }

    fn dispatch(&mut self, ty: &Name, path: Path) {
        self.flush_run();
        self.ops.push(Op::Dispatch {
            ty: ty.clone(),
            path,
        });
    }

    /// Emit the pending run, if any.
    fn flush_run(&mut self) {
        if self.run.is_empty() {
            return;
        }
        self.ctx.resize(self.run_len, &mut self.ops);
        let slots = std::mem::take(&mut self.run);
        self.run_len = 0;
        match self.dir {
            Direction::Marshal => {
                self.ops.extend(slots.into_iter().map(|s| Op::Store {
                    offset: s.offset,
                    kind: s.kind,
                    path: s.path,
                }));
                self.ops.push(Op::Write);
            }
            Direction::Unmarshal => {
                self.ops.push(Op::Fill);
                self.ops.extend(slots.into_iter().map(|s| Op::Load {
                    offset: s.offset,
                    kind: s.kind,
                    path: s.path,
                }));
            }
        }
    }

    /// Emit a loop over the elements of the array at `path`.
    ///
    /// `body` receives the element path and must leave no pending run. It
    /// is synthesized against the view from before the loop, and again with
    /// the view unknown if that first attempt resized.
    fn emit_loop(
        &mut self,
        field: &Field,
        path: &Path,
        count: LoopCount,
        body: impl Fn(&mut Self, Path),
    ) -> Result<(), SchemaError> {
        let var = self.ctx.push_index(&field.name)?;
        let scope = self.ctx.enter_loop();
        let outer = std::mem::take(&mut self.ops);

        let mut elem_path = path.clone();
        elem_path.push(Step::Var(var));
        body(self, elem_path.clone());
        if self.ctx.resized_in(scope) {
            trace!(record = %self.ctx.record(), field = %field.name, "loop body resizes");
            self.ops.clear();
            self.ctx.restart_loop(scope);
            body(self, elem_path);
        }
        debug_assert!(self.run.is_empty(), "loop body left a pending run");

        let body = std::mem::replace(&mut self.ops, outer);
        self.ctx.exit_loop(scope);
        self.ctx.pop_index();
        self.ops.push(Op::Loop { var, count, body });
        Ok(())
    }
}

fn indexed(path: &Path, index: usize) -> Path {
    let mut path = path.clone();
    path.push(Step::Index(index));
    path
}
