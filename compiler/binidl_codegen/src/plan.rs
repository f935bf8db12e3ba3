//! The codec plan IR.
//!
//! A [`CodecPlan`] is the synthesized marshal and unmarshal procedure of one
//! record, as a flat list of [`Op`]s with structured loops. The Rust emitter
//! renders plans as source; `binidl_eval` executes them directly.
//!
//! Both procedures work on one byte buffer. Static plans use a buffer of
//! exactly the record's fixed size for the whole call. Streaming plans use a
//! scratch buffer and an *active view*, a prefix of the scratch set by
//! [`Op::Resize`]; stores, loads, writes and fills address the active view.

use binidl_ir::{Endian, Name, PrimitiveKind};
use binidl_layout::Strategy;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A loop index variable, identified by nesting depth.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexVar(u8);

impl IndexVar {
    /// Names of the available index variables, outermost first.
    pub const NAMES: [&'static str; 6] = ["i", "j", "k", "ii", "jj", "kk"];

    /// How many loops may be nested in one procedure.
    pub const LIMIT: usize = Self::NAMES.len();

    pub(crate) fn at_depth(depth: usize) -> Option<Self> {
        if depth < Self::LIMIT {
            u8::try_from(depth).ok().map(IndexVar)
        } else {
            None
        }
    }

    #[inline]
    pub fn depth(self) -> usize {
        usize::from(self.0)
    }

    #[inline]
    pub fn name(self) -> &'static str {
        Self::NAMES[self.depth()]
    }
}

/// One step from the record being coded to a value inside it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// A named field.
    Field(Name),
    /// A constant array index, from unrolling.
    Index(usize),
    /// The current value of a loop index.
    Var(IndexVar),
}

/// Access path from the record root.
pub type Path = SmallVec<[Step; 4]>;

/// Iteration count of a [`Op::Loop`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoopCount {
    /// A fixed-size array.
    Fixed(usize),
    /// The length of the sequence at the path.
    ///
    /// Marshal loops run over the sequence as it is. Unmarshal loops run
    /// to the count read by the preceding [`Op::ReadLen`] on the same path
    /// and append each element as it is decoded.
    LenOf(Path),
}

/// One step of a codec procedure.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// Make the active view exactly this many bytes. Streaming only.
    Resize(usize),
    /// Encode the primitive at `path` into the buffer at `offset`.
    Store {
        offset: usize,
        kind: PrimitiveKind,
        path: Path,
    },
    /// Decode the primitive at `offset` of the buffer into `path`.
    Load {
        offset: usize,
        kind: PrimitiveKind,
        path: Path,
    },
    /// Write the buffer (or active view) to the sink.
    Write,
    /// Read exactly the buffer (or active view) length from the source.
    Fill,
    /// Code the value at `path` with type `ty`'s own procedure.
    Dispatch { ty: Name, path: Path },
    /// Write the length of the sequence at `path` as a varint.
    WriteLen { path: Path },
    /// Read a varint length for the sequence at `path` and drop elements
    /// past it. Nothing is allocated for the count itself.
    ReadLen { path: Path },
    /// Run `body` with `var` bound to each index in `0..count`.
    Loop {
        var: IndexVar,
        count: LoopCount,
        body: Vec<Op>,
    },
}

/// Whether any op, loops included, sets the active view.
pub fn contains_resize(ops: &[Op]) -> bool {
    ops.iter().any(|op| match op {
        Op::Resize(_) => true,
        Op::Loop { body, .. } => contains_resize(body),
        _ => false,
    })
}

/// Count the ops matching `pred`, loops included.
pub fn count_ops(ops: &[Op], pred: &impl Fn(&Op) -> bool) -> usize {
    ops.iter()
        .map(|op| {
            let nested = match op {
                Op::Loop { body, .. } => count_ops(body, pred),
                _ => 0,
            };
            usize::from(pred(op)) + nested
        })
        .sum()
}

/// Synthesized procedures of one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecPlan {
    pub record: Name,
    pub strategy: Strategy,
    /// Static: the record's fixed size. Streaming: scratch capacity.
    pub buffer_len: usize,
    /// Reported by `binary_size`.
    pub fixed_size: usize,
    /// Whether `fixed_size` is exact.
    pub size_is_exact: bool,
    /// Whether decoding needs single-byte reads at some depth.
    pub needs_byte_source: bool,
    pub marshal: Vec<Op>,
    pub unmarshal: Vec<Op>,
}

/// Plans of every record in a graph, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct PlanSet {
    pub endian: Endian,
    plans: Vec<CodecPlan>,
    index: FxHashMap<Name, usize>,
}

impl PlanSet {
    pub fn new(endian: Endian) -> Self {
        PlanSet {
            endian,
            ..PlanSet::default()
        }
    }

    pub(crate) fn push(&mut self, plan: CodecPlan) {
        self.index.insert(plan.record.clone(), self.plans.len());
        self.plans.push(plan);
    }

    pub fn get(&self, record: &str) -> Option<&CodecPlan> {
        self.index.get(record).map(|&i| &self.plans[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodecPlan> {
        self.plans.iter()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
