//! Generic fixed-width integer conversions.
//!
//! Generated code inlines explicit shifts for every primitive; these helpers
//! are the reference those shifts are checked against, and the path the
//! schema interpreter takes.

/// Byte order of multi-byte primitives on the wire.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Store the low `buf.len()` bytes of `value` into `buf`.
///
/// # Panics
///
/// Panics if `buf` is longer than 8 bytes.
#[allow(
    clippy::cast_possible_truncation,
    reason = "each byte deliberately keeps only the low 8 bits of a shifted value"
)]
pub fn put_uint(buf: &mut [u8], value: u64, order: ByteOrder) {
    assert!(buf.len() <= 8, "integer width {} exceeds 8 bytes", buf.len());
    let width = buf.len();
    for (i, slot) in buf.iter_mut().enumerate() {
        let shift = match order {
            ByteOrder::Little => 8 * i,
            ByteOrder::Big => 8 * (width - 1 - i),
        };
        *slot = (value >> shift) as u8;
    }
}

/// Load an unsigned integer of width `buf.len()` from `buf`.
///
/// # Panics
///
/// Panics if `buf` is longer than 8 bytes.
pub fn get_uint(buf: &[u8], order: ByteOrder) -> u64 {
    assert!(buf.len() <= 8, "integer width {} exceeds 8 bytes", buf.len());
    match order {
        ByteOrder::Little => buf
            .iter()
            .rev()
            .fold(0, |acc, &b| (acc << 8) | u64::from(b)),
        ByteOrder::Big => buf.iter().fold(0, |acc, &b| (acc << 8) | u64::from(b)),
    }
}
