//! A type with a hand-written codec, referenced by the schema as external.

use std::io::{self, Read, Write};

use binidl_rt::{BinarySize, Marshal, Unmarshal};

/// Nanoseconds since the epoch, always big-endian on the wire.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Stamp(pub u64);

impl Marshal for Stamp {
    fn marshal<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.0.to_be_bytes())
    }

    fn binary_size() -> BinarySize {
        BinarySize::new(8, true)
    }
}

impl Unmarshal for Stamp {
    fn unmarshal_from<R: Read + ?Sized>(&mut self, r: &mut R) -> io::Result<()> {
        let mut buf = [0u8; 8];
        r.read_exact(&mut buf)?;
        self.0 = u64::from_be_bytes(buf);
        Ok(())
    }
}
