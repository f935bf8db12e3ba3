//! Growing decoded sequences.
//!
//! A length prefix is untrusted input. Decoders never allocate the decoded
//! count up front: [`begin_seq`] drops surplus elements and reserves a
//! bounded amount, and [`seq_element`] appends one element at a time as
//! the body of each element arrives. A truncated payload therefore fails
//! with the source's read error after allocating at most what was read.

/// Bytes reserved ahead of decoding a sequence, whatever its prefix says.
pub const PREALLOC_BYTES: usize = 64 * 1024;

/// Prepare `seq` to receive `len` decoded elements.
///
/// Elements past `len` are dropped. Elements below it are kept so their
/// allocations can be reused; decoding overwrites them in order.
pub fn begin_seq<T>(seq: &mut Vec<T>, len: usize) {
    seq.truncate(len);
    let budget = PREALLOC_BYTES / std::mem::size_of::<T>().max(1);
    seq.reserve((len - seq.len()).min(budget));
}

/// Make `seq[index]` exist before it is decoded.
///
/// Indices are visited in order, so a missing element is always the next
/// one and is appended with `fill`.
pub fn seq_element<T>(seq: &mut Vec<T>, index: usize, fill: impl FnOnce() -> T) {
    debug_assert!(index <= seq.len(), "sequence elements decoded out of order");
    if index == seq.len() {
        seq.push(fill());
    }
}
