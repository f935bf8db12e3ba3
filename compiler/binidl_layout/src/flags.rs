//! Pre-computed layout flags.

use bitflags::bitflags;

bitflags! {
    /// Boolean layout facts of a record, computed once during analysis.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct LayoutFlags: u8 {
        /// Contains a variable-length array outside any dispatch boundary.
        const VARIABLE_LENGTH = 1 << 0;
        /// Contains a field encoded by another type's codec.
        const REQUIRES_DISPATCH = 1 << 1;
        /// Decoding reads a varint at some depth, dispatch included.
        const NEEDS_BYTE_SOURCE = 1 << 2;
    }
}

impl LayoutFlags {
    /// Whether a parent may fold this type's bytes into its own runs.
    #[inline]
    pub fn is_inlinable(self) -> bool {
        !self.intersects(Self::VARIABLE_LENGTH | Self::REQUIRES_DISPATCH)
    }
}
