//! Global byte order.

use std::fmt;

/// Byte order applied to every multi-byte field of every type.
///
/// Chosen once per generation run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Bit shift that brings byte `index` of a `width`-byte value into the
    /// low eight bits.
    ///
    /// Byte 0 is the first byte on the wire.
    #[inline]
    #[allow(clippy::cast_possible_truncation, reason = "widths are at most 8")]
    pub const fn shift(self, width: usize, index: usize) -> u32 {
        debug_assert!(index < width);
        let significance = match self {
            Endian::Little => index,
            Endian::Big => width - 1 - index,
        };
        (significance * 8) as u32
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endian::Little => f.write_str("little-endian"),
            Endian::Big => f.write_str("big-endian"),
        }
    }
}
