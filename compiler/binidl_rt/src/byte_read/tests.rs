use super::*;
use pretty_assertions::assert_eq;

/// A reader that hands out at most one byte per call and counts calls.
struct Trickle<'a> {
    bytes: &'a [u8],
    reads: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        match (self.bytes.split_first(), buf.first_mut()) {
            (Some((&b, rest)), Some(slot)) => {
                *slot = b;
                self.bytes = rest;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[test]
fn slices_read_bytes_directly() {
    let mut src: &[u8] = &[1, 2];
    assert_eq!(src.read_byte().unwrap(), 1);
    assert_eq!(src.read_byte().unwrap(), 2);
    assert_eq!(
        src.read_byte().unwrap_err().kind(),
        io::ErrorKind::UnexpectedEof
    );
}

#[test]
fn adapter_does_not_read_ahead() {
    let data = [7u8, 8, 9, 10];
    let mut inner: &[u8] = &data;
    {
        let mut reader = ByteReader::new(&mut inner);
        assert_eq!(reader.read_byte().unwrap(), 7);
        let mut pair = [0u8; 2];
        reader.read_exact(&mut pair).unwrap();
        assert_eq!(pair, [8, 9]);
    }
    assert_eq!(inner, &[10]);
}

#[test]
fn adapter_handles_short_reads() {
    let mut trickle = Trickle {
        bytes: &[1, 2, 3, 4, 5],
        reads: 0,
    };
    let mut reader = ByteReader::new(&mut trickle);
    let mut run = [0u8; 4];
    reader.read_exact(&mut run).unwrap();
    assert_eq!(run, [1, 2, 3, 4]);
    assert_eq!(reader.read_byte().unwrap(), 5);
    drop(reader);
    assert_eq!(trickle.bytes.len(), 0);
    assert!(trickle.reads >= 5);
}

#[test]
fn adapter_reports_eof() {
    let mut reader = ByteReader::new(io::empty());
    assert_eq!(
        reader.read_byte().unwrap_err().kind(),
        io::ErrorKind::UnexpectedEof
    );
}

#[test]
fn into_inner_returns_reader() {
    let data = [1u8, 2, 3];
    let mut reader = ByteReader::new(&data[..]);
    assert_eq!(reader.read_byte().unwrap(), 1);
    let rest = reader.into_inner();
    assert_eq!(rest, &[2, 3]);
}
