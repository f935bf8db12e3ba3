//! The two-pass layout analyzer.
//!
//! Pass 1 resolves field types and orders records so that by-value children
//! come first, failing on unresolved references and by-value cycles. Pass 2
//! walks records in that order, folding each child's already-computed
//! layout into its parent.

use binidl_ir::{Arity, Field, Name, PrimitiveKind, SchemaError, TypeDef, TypeGraph, TypeRef};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{Element, FieldClass, LayoutFlags, LayoutInfo, RecordLayout};

/// What a field's type reference names once aliases are looked through.
#[derive(Clone, Debug)]
enum Target {
    Primitive(PrimitiveKind),
    Record(Name),
    External(Name),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Layouts of every record in a graph.
#[derive(Clone, Debug, Default)]
pub struct Layouts {
    records: FxHashMap<Name, RecordLayout>,
}

impl Layouts {
    /// Layout and field classes of a record.
    pub fn get(&self, record: &str) -> Option<&RecordLayout> {
        self.records.get(record)
    }

    /// Layout facts of a record.
    pub fn info(&self, record: &str) -> Option<&LayoutInfo> {
        self.records.get(record).map(|layout| &layout.info)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Analyze every record of `graph`.
pub fn analyze(graph: &TypeGraph) -> Result<Layouts, SchemaError> {
    LayoutAnalyzer::new(graph).run()
}

/// Analyzer state for one graph.
///
/// Holds the resolved field targets, the depth-first marks used for cycle
/// detection, and the memo of finished layouts that parents read from.
pub struct LayoutAnalyzer<'g> {
    graph: &'g TypeGraph,
    resolved: FxHashMap<Name, Vec<Target>>,
    marks: FxHashMap<Name, Mark>,
    /// Records in by-value post-order: children before parents.
    order: Vec<Name>,
    memo: FxHashMap<Name, RecordLayout>,
}

impl<'g> LayoutAnalyzer<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        LayoutAnalyzer {
            graph,
            resolved: FxHashMap::default(),
            marks: FxHashMap::default(),
            order: Vec::new(),
            memo: FxHashMap::default(),
        }
    }

    /// Run both passes and return the layout table.
    #[tracing::instrument(level = "debug", skip_all, fields(types = self.graph.len()))]
    pub fn run(mut self) -> Result<Layouts, SchemaError> {
        self.resolve_all()?;
        self.order_by_value()?;

        let order = std::mem::take(&mut self.order);
        for record in &order {
            let layout = self.layout_record(record)?;
            self.memo.insert(record.clone(), layout);
        }
        Ok(Layouts { records: self.memo })
    }

    fn resolve_all(&mut self) -> Result<(), SchemaError> {
        let graph = self.graph;
        for (record, fields) in graph.records() {
            let targets = fields
                .iter()
                .map(|field| resolve(graph, record, field))
                .collect::<Result<Vec<_>, _>>()?;
            self.resolved.insert(record.clone(), targets);
        }
        Ok(())
    }

    fn order_by_value(&mut self) -> Result<(), SchemaError> {
        let graph = self.graph;
        let mut path = Vec::new();
        for (record, _) in graph.records() {
            self.visit(record, &mut path)?;
        }
        Ok(())
    }

    fn visit(&mut self, record: &Name, path: &mut Vec<Name>) -> Result<(), SchemaError> {
        match self.marks.get(record) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|n| n == record).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(record.clone());
                return Err(SchemaError::CyclicByValue { cycle });
            }
            None => {}
        }

        self.marks.insert(record.clone(), Mark::Visiting);
        path.push(record.clone());
        for child in self.by_value_children(record) {
            self.visit(&child, path)?;
        }
        path.pop();
        self.marks.insert(record.clone(), Mark::Done);
        self.order.push(record.clone());
        Ok(())
    }

    /// Records contained by value: scalar and fixed-array record fields.
    fn by_value_children(&self, record: &Name) -> SmallVec<[Name; 4]> {
        let fields = self
            .graph
            .get(record.as_str())
            .and_then(TypeDef::fields)
            .unwrap_or_default();
        let Some(targets) = self.resolved.get(record) else {
            return SmallVec::new();
        };
        fields
            .iter()
            .zip(targets)
            .filter_map(|(field, target)| match (target, field.arity) {
                (Target::Record(name), Arity::Scalar | Arity::FixedArray(_)) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    fn layout_record(&self, record: &Name) -> Result<RecordLayout, SchemaError> {
        let fields = self
            .graph
            .get(record.as_str())
            .and_then(TypeDef::fields)
            .unwrap_or_default();
        let targets = self
            .resolved
            .get(record)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut acc = Accumulator::default();
        let classes = fields
            .iter()
            .zip(targets)
            .map(|(field, target)| {
                let class = self
                    .classify(field.arity, target, &mut acc)
                    .ok_or_else(|| SchemaError::SizeOverflow {
                        record: record.clone(),
                        field: field.name.clone(),
                    })?;
                trace!(%record, field = %field.name, ?class, "classified field");
                Ok(class)
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;
        let info = acc.finish();

        debug!(
            %record,
            fixed_size = info.fixed_size,
            total_size = info.total_size,
            runs = ?info.runs,
            flags = ?info.flags,
            "analyzed record"
        );
        Ok(RecordLayout {
            info,
            fields: classes,
        })
    }

    /// Classify one field and fold it into `acc`.
    ///
    /// `None` when the record's size no longer fits in `usize`.
    fn classify(&self, arity: Arity, target: &Target, acc: &mut Accumulator) -> Option<FieldClass> {
        if arity == Arity::VariableArray {
            let elem = match target {
                Target::Primitive(kind) => Element::Primitive(*kind),
                Target::Record(name) | Target::External(name) => Element::Dispatched(name.clone()),
            };
            acc.variable(&elem)?;
            return Some(FieldClass::VariableArray { elem });
        }

        let count = match arity {
            Arity::FixedArray(len) => len,
            Arity::Scalar | Arity::VariableArray => 1,
        };
        let elem = self.element(target);
        match &elem {
            Element::Primitive(kind) => acc.inline_primitive(*kind, count)?,
            Element::Inline(name) => {
                if let Some(child) = self.child(name) {
                    acc.inline_record(child, count)?;
                }
            }
            Element::Dispatched(name) => acc.dispatch(self.child(name), count)?,
        }

        Some(match (arity, elem) {
            (Arity::FixedArray(len), elem) => FieldClass::FixedArray { len, elem },
            (_, Element::Primitive(kind)) => FieldClass::Primitive(kind),
            (_, Element::Inline(name)) => FieldClass::InlinableRecord(name),
            (_, Element::Dispatched(name)) => FieldClass::DispatchedRecord(name),
        })
    }

    /// Classify a by-value target. Its record layout is already memoized.
    fn element(&self, target: &Target) -> Element {
        match target {
            Target::Primitive(kind) => Element::Primitive(*kind),
            Target::External(name) => Element::Dispatched(name.clone()),
            Target::Record(name) => match self.child(name) {
                Some(child) if child.is_inlinable() => Element::Inline(name.clone()),
                _ => Element::Dispatched(name.clone()),
            },
        }
    }

    fn child(&self, name: &Name) -> Option<&LayoutInfo> {
        self.memo.get(name).map(|layout| &layout.info)
    }
}

fn resolve(graph: &TypeGraph, record: &Name, field: &Field) -> Result<Target, SchemaError> {
    match &field.ty {
        TypeRef::Primitive(kind) => Ok(Target::Primitive(*kind)),
        TypeRef::Named(name) => match graph.get(name.as_str()) {
            Some(TypeDef::Alias(kind)) => Ok(Target::Primitive(*kind)),
            Some(TypeDef::Record(_)) => Ok(Target::Record(name.clone())),
            Some(TypeDef::External { .. }) => Ok(Target::External(name.clone())),
            None => Err(SchemaError::UnresolvedType {
                record: record.clone(),
                field: field.name.clone(),
                type_ref: name.clone(),
            }),
        },
    }
}

/// Running layout of the record being analyzed.
///
/// Every size update is checked; `None` means the record's size overflowed.
#[derive(Default)]
struct Accumulator {
    info: LayoutInfo,
    current_run: usize,
    /// Minimum bytes contributed outside `fixed_size`.
    extra: usize,
}

impl Accumulator {
    fn inline_primitive(&mut self, kind: PrimitiveKind, count: usize) -> Option<()> {
        if count == 0 {
            return Some(());
        }
        let width = kind.width();
        self.note_widths(width, width);
        self.extend(width.checked_mul(count)?)
    }

    fn inline_record(&mut self, child: &LayoutInfo, count: usize) -> Option<()> {
        if count == 0 {
            return Some(());
        }
        self.note_widths(child.first_field_width, child.max_field_width);
        self.extend(child.fixed_size.checked_mul(count)?)
    }

    fn dispatch(&mut self, child: Option<&LayoutInfo>, count: usize) -> Option<()> {
        self.info.flags |= LayoutFlags::REQUIRES_DISPATCH;
        if let Some(child) = child {
            if child.needs_byte_source() {
                self.info.flags |= LayoutFlags::NEEDS_BYTE_SOURCE;
            }
            self.add_extra(child.total_size.checked_mul(count)?)?;
        }
        self.close_run();
        Some(())
    }

    fn variable(&mut self, elem: &Element) -> Option<()> {
        self.info.flags |= LayoutFlags::VARIABLE_LENGTH | LayoutFlags::NEEDS_BYTE_SOURCE;
        if let Element::Primitive(kind) = elem {
            self.info.max_field_width = self.info.max_field_width.max(kind.width());
        }
        // A zero count still costs its one-byte prefix.
        self.add_extra(1)?;
        self.close_run();
        Some(())
    }

    fn note_widths(&mut self, first: usize, max: usize) {
        if self.info.first_field_width == 0 {
            self.info.first_field_width = first;
        }
        self.info.max_field_width = self.info.max_field_width.max(max);
    }

    fn extend(&mut self, bytes: usize) -> Option<()> {
        self.info.fixed_size = self.info.fixed_size.checked_add(bytes)?;
        self.current_run += bytes;
        self.info.total_size = self.info.fixed_size.checked_add(self.extra)?;
        Some(())
    }

    fn add_extra(&mut self, bytes: usize) -> Option<()> {
        self.extra = self.extra.checked_add(bytes)?;
        self.info.total_size = self.info.fixed_size.checked_add(self.extra)?;
        Some(())
    }

    fn close_run(&mut self) {
        if self.current_run > 0 {
            self.info.runs.push(self.current_run);
            self.current_run = 0;
        }
    }

    fn finish(mut self) -> LayoutInfo {
        self.close_run();
        self.info
    }
}

#[cfg(test)]
mod tests;
