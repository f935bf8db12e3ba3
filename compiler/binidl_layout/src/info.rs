//! Layout facts and field classes.

use binidl_ir::{Name, PrimitiveKind};
use smallvec::SmallVec;

use crate::LayoutFlags;

/// Layout of one record type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutInfo {
    /// Bytes of the statically sized fields this record encodes itself,
    /// including inlined records and unrolled fixed arrays.
    pub fixed_size: usize,
    /// Widest primitive this record encodes inline, array elements included.
    pub max_field_width: usize,
    /// Width of the first inline primitive in declaration order, or 0.
    pub first_field_width: usize,
    /// Lengths of the maximal stretches of inline fields, in order.
    ///
    /// Dispatched fields and variable-length arrays separate runs; empty
    /// runs are never recorded.
    pub runs: SmallVec<[usize; 4]>,
    /// Minimum encoded size of any instance.
    pub total_size: usize,
    pub flags: LayoutFlags,
}

impl LayoutInfo {
    #[inline]
    pub fn is_variable_length(&self) -> bool {
        self.flags.contains(LayoutFlags::VARIABLE_LENGTH)
    }

    #[inline]
    pub fn requires_dispatch(&self) -> bool {
        self.flags.contains(LayoutFlags::REQUIRES_DISPATCH)
    }

    #[inline]
    pub fn needs_byte_source(&self) -> bool {
        self.flags.contains(LayoutFlags::NEEDS_BYTE_SOURCE)
    }

    #[inline]
    pub fn is_inlinable(&self) -> bool {
        self.flags.is_inlinable()
    }

    /// Whether [`fixed_size`](Self::fixed_size) is the exact size of every
    /// instance.
    #[inline]
    pub fn size_is_exact(&self) -> bool {
        self.is_inlinable()
    }

    /// Longest run, or 0 when the record has none.
    pub fn max_run(&self) -> usize {
        self.runs.iter().copied().max().unwrap_or(0)
    }
}

/// How one element of an array, or a scalar record field, is encoded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Element {
    /// A primitive stored inline.
    Primitive(PrimitiveKind),
    /// A record whose fields are folded into the parent's runs.
    Inline(Name),
    /// A type encoded by its own codec.
    Dispatched(Name),
}

/// Resolved encoding of one record field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldClass {
    /// A primitive or alias scalar.
    Primitive(PrimitiveKind),
    /// A fixed-size record stored inline.
    InlinableRecord(Name),
    /// A record or external type that encodes itself.
    DispatchedRecord(Name),
    /// `[n]T`.
    FixedArray { len: usize, elem: Element },
    /// `[]T`. Record elements are always dispatched.
    VariableArray { elem: Element },
}

/// Everything the synthesizers need to know about one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    pub info: LayoutInfo,
    /// One class per field, in declaration order.
    pub fields: Vec<FieldClass>,
}
