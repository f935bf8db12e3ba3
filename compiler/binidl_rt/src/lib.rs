//! Runtime support for binidl-generated codecs.
//!
//! Generated code depends on this crate and nothing else. It provides:
//!
//! - **[`Marshal`] / [`Unmarshal`]** - the per-record codec entry points
//! - **Varints** - zig-zag LEB128 length prefixes ([`write_len`], [`read_len`])
//! - **Byte order** - the generic fixed-width conversions that generated
//!   inline shifts must agree with ([`put_uint`], [`get_uint`])
//! - **[`ByteRead`]** - the single-byte-read capability varint decoding needs,
//!   and [`ByteReader`], the adapter that supplies it
//! - **[`InstancePool`]** - a mutex-guarded LIFO free list of instances
//! - **Sequences** - bounded growth of decoded variable-length arrays
//!   ([`begin_seq`], [`seq_element`])
//!
//! # Byte sources
//!
//! Records whose decoding reads a length prefix need [`ByteRead`]. Every
//! `BufRead` already has it. [`Unmarshal::unmarshal_from`] accepts any
//! `Read` and, for such records, wraps it once at the top level;
//! [`Unmarshal::unmarshal_buffered`] accepts a source that already has the
//! capability and never wraps.

mod byte_order;
mod byte_read;
mod pool;
mod seq;
mod varint;

use std::io::{self, Read, Write};

pub use byte_order::{get_uint, put_uint, ByteOrder};
pub use byte_read::{ByteRead, ByteReader};
pub use pool::InstancePool;
pub use seq::{begin_seq, seq_element, PREALLOC_BYTES};
pub use varint::{encode_varint, read_len, read_varint, write_len, write_varint, MAX_VARINT_LEN};

/// Statically known size information for a record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinarySize {
    /// Bytes occupied by the fixed-size portion of the record.
    pub fixed: usize,
    /// Whether `fixed` is the exact encoded size of every instance.
    pub exact: bool,
}

impl BinarySize {
    pub const fn new(fixed: usize, exact: bool) -> Self {
        BinarySize { fixed, exact }
    }
}

/// Serialize a record to a byte sink.
pub trait Marshal {
    /// Write the encoding of `self` to `w`.
    ///
    /// Fails only when `w` does; the sink's error is returned unchanged.
    fn marshal<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()>;

    /// Size facts computed at generation time.
    fn binary_size() -> BinarySize
    where
        Self: Sized;

    /// Convenience: marshal into a fresh vector.
    fn marshal_to_vec(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.marshal(&mut out)?;
        Ok(out)
    }
}

/// Reconstruct a record from a byte source.
///
/// Decoding overwrites every field of `self`. Variable-length arrays are
/// truncated to the decoded length and grown one element at a time, so a
/// length prefix never allocates more than the bytes that actually follow
/// it. On error the contents of `self` are unspecified and must not be used.
pub trait Unmarshal {
    /// Decode from any byte source.
    fn unmarshal_from<R: Read + ?Sized>(&mut self, r: &mut R) -> io::Result<()>;

    /// Decode from a source that already supports single-byte reads.
    ///
    /// Records that never read a length prefix simply forward to
    /// [`unmarshal_from`](Self::unmarshal_from).
    fn unmarshal_buffered<R: ByteRead + ?Sized>(&mut self, r: &mut R) -> io::Result<()> {
        self.unmarshal_from(r)
    }

    /// Decode a new instance.
    fn unmarshal<R: Read + ?Sized>(r: &mut R) -> io::Result<Self>
    where
        Self: Sized + Default,
    {
        let mut value = Self::default();
        value.unmarshal_from(r)?;
        Ok(value)
    }
}
