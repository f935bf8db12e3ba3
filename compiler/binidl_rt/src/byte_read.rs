//! The single-byte-read capability.

use std::io::{self, BufRead, BufReader, Read};

/// A byte source that can yield one byte at a time cheaply.
///
/// Varint length prefixes have no a-priori width, so decoding them pulls
/// bytes one by one. Every [`BufRead`] has this capability; plain readers
/// get it from [`ByteReader`].
pub trait ByteRead: Read {
    /// Read exactly one byte, or fail with `UnexpectedEof`.
    fn read_byte(&mut self) -> io::Result<u8>;
}

impl<R: BufRead + ?Sized> ByteRead for R {
    fn read_byte(&mut self) -> io::Result<u8> {
        let byte = match self.fill_buf()?.first() {
            Some(&byte) => byte,
            None => return Err(io::ErrorKind::UnexpectedEof.into()),
        };
        self.consume(1);
        Ok(byte)
    }
}

/// Adapter giving any reader the [`ByteRead`] capability.
///
/// Generated `unmarshal_from` entry points install this exactly once when
/// the record reads length prefixes. It never reads ahead: run-sized reads
/// go straight to the inner reader and single-byte reads fetch one byte, so
/// the inner reader is left positioned exactly after the decoded record.
/// Callers that want read-ahead buffering should pass their own `BufRead`
/// to `unmarshal_buffered` instead.
pub struct ByteReader<R> {
    inner: BufReader<R>,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        ByteReader {
            inner: BufReader::with_capacity(1, inner),
        }
    }

    /// Recover the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read> Read for ByteReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> BufRead for ByteReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
    }
}

#[cfg(test)]
mod tests;
