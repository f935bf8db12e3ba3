//! Fixed-width primitive kinds.

use std::fmt;

/// A fixed-width numeric leaf type.
///
/// Every primitive encodes as an unsigned integer of exactly its own width
/// (see [`encodes_as`](Self::encodes_as)); signed values are reinterpreted
/// bit-for-bit, never widened.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    /// Raw byte. Layout-identical to `U8`.
    Byte,
}

impl PrimitiveKind {
    /// All kinds, in declaration order.
    pub const ALL: [PrimitiveKind; 9] = [
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::Byte,
    ];

    /// Width in bytes on the wire.
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            Self::I8 | Self::U8 | Self::Byte => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 => 4,
            Self::I64 | Self::U64 => 8,
        }
    }

    /// Whether decoded values must be sign-extended.
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// The canonical unsigned kind this kind is converted through.
    pub const fn encodes_as(self) -> PrimitiveKind {
        match self.width() {
            1 => Self::U8,
            2 => Self::U16,
            4 => Self::U32,
            _ => Self::U64,
        }
    }

    /// Resolve a primitive type name.
    ///
    /// Accepts Rust spellings (`u32`), Go spellings (`uint32`), `byte`, and
    /// `int`, which is an 8-byte signed integer.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "i8" | "int8" => Self::I8,
            "i16" | "int16" => Self::I16,
            "i32" | "int32" => Self::I32,
            "i64" | "int64" | "int" => Self::I64,
            "u8" | "uint8" => Self::U8,
            "u16" | "uint16" => Self::U16,
            "u32" | "uint32" => Self::U32,
            "u64" | "uint64" => Self::U64,
            "byte" => Self::Byte,
            _ => return None,
        };
        Some(kind)
    }

    /// The Rust type emitted for fields of this kind.
    pub const fn rust_name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 | Self::Byte => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte => f.write_str("byte"),
            other => f.write_str(other.rust_name()),
        }
    }
}

#[cfg(test)]
mod tests;
