//! Signed LEB128 varints with zig-zag sign folding.
//!
//! Byte-compatible with Go's `binary.PutVarint` / `binary.ReadVarint`: the
//! value is zig-zag mapped to an unsigned integer, then emitted seven bits
//! at a time, least significant group first, with the high bit of each
//! byte set when more bytes follow.

use std::io::{self, Write};

use crate::ByteRead;

/// Longest possible encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Encode `value` into `buf`, returning the number of bytes used.
#[allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    reason = "zig-zag folding and 7-bit grouping are bit-level reinterpretations"
)]
pub fn encode_varint(value: i64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut ux = ((value << 1) ^ (value >> 63)) as u64;
    let mut i = 0;
    while ux >= 0x80 {
        buf[i] = (ux as u8) | 0x80;
        ux >>= 7;
        i += 1;
    }
    buf[i] = ux as u8;
    i + 1
}

/// Write `value` as a varint.
pub fn write_varint<W: Write + ?Sized>(w: &mut W, value: i64) -> io::Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let n = encode_varint(value, &mut buf);
    w.write_all(&buf[..n])
}

/// Read a varint one byte at a time.
///
/// Never consumes more bytes than the encoding occupies. A source that ends
/// mid-encoding yields `UnexpectedEof`; an encoding that does not fit in 64
/// bits yields `InvalidData`.
#[allow(
    clippy::cast_possible_wrap,
    reason = "zig-zag unfolding reinterprets the unsigned bits"
)]
pub fn read_varint<R: ByteRead + ?Sized>(r: &mut R) -> io::Result<i64> {
    let mut ux: u64 = 0;
    let mut shift = 0u32;
    for i in 0..MAX_VARINT_LEN {
        let byte = r.read_byte()?;
        if byte < 0x80 {
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(overflow());
            }
            ux |= u64::from(byte) << shift;
            let x = (ux >> 1) as i64;
            return Ok(if ux & 1 == 0 { x } else { !x });
        }
        ux |= u64::from(byte & 0x7f) << shift;
        shift += 7;
    }
    Err(overflow())
}

/// Write a sequence length prefix.
pub fn write_len<W: Write + ?Sized>(w: &mut W, len: usize) -> io::Result<()> {
    let len = i64::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "sequence length does not fit in a signed 64-bit varint",
        )
    })?;
    write_varint(w, len)
}

/// Read a sequence length prefix.
///
/// A negative count is `InvalidData`: the encoder never produces one.
pub fn read_len<R: ByteRead + ?Sized>(r: &mut R) -> io::Result<usize> {
    let len = read_varint(r)?;
    usize::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("negative sequence length {len}"),
        )
    })
}

fn overflow() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        "varint overflows a 64-bit integer",
    )
}

#[cfg(test)]
mod tests;
