use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn encoded(value: i64) -> Vec<u8> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let n = encode_varint(value, &mut buf);
    buf[..n].to_vec()
}

#[test]
fn small_values_zigzag() {
    assert_eq!(encoded(0), vec![0x00]);
    assert_eq!(encoded(-1), vec![0x01]);
    assert_eq!(encoded(1), vec![0x02]);
    assert_eq!(encoded(3), vec![0x06]);
    assert_eq!(encoded(-64), vec![0x7f]);
    assert_eq!(encoded(64), vec![0x80, 0x01]);
}

#[test]
fn length_boundaries_roundtrip() {
    for len in [0usize, 1, 63, 64, 127, 128, 8191, 8192, 16383, 16384] {
        let mut out = Vec::new();
        write_len(&mut out, len).unwrap();
        let mut src = out.as_slice();
        assert_eq!(read_len(&mut src).unwrap(), len);
        assert!(src.is_empty(), "length {len} left trailing bytes");
    }
}

#[test]
fn encoding_width_grows_at_boundaries() {
    // Zig-zag doubles the magnitude, so the width steps at 64, 8192, ...
    assert_eq!(encoded(63).len(), 1);
    assert_eq!(encoded(64).len(), 2);
    assert_eq!(encoded(127).len(), 2);
    assert_eq!(encoded(128).len(), 2);
    assert_eq!(encoded(8192).len(), 3);
    assert_eq!(encoded(16384).len(), 3);
}

#[test]
fn extremes_use_ten_bytes() {
    assert_eq!(encoded(i64::MAX).len(), MAX_VARINT_LEN);
    assert_eq!(encoded(i64::MIN).len(), MAX_VARINT_LEN);
}

#[test]
fn read_stops_after_encoding() {
    let mut bytes = encoded(300);
    bytes.extend_from_slice(&[0xAA, 0xBB]);
    let mut src = bytes.as_slice();
    assert_eq!(read_varint(&mut src).unwrap(), 300);
    assert_eq!(src, &[0xAA, 0xBB]);
}

#[test]
fn truncated_varint_is_eof() {
    let mut src: &[u8] = &[0x80, 0x80];
    let err = read_varint(&mut src).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn empty_source_is_eof() {
    let mut src: &[u8] = &[];
    let err = read_len(&mut src).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn overlong_varint_is_invalid() {
    let mut bytes = vec![0xFF; MAX_VARINT_LEN - 1];
    bytes.push(0x02);
    let mut src = bytes.as_slice();
    let err = read_varint(&mut src).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    let mut src: &[u8] = &[0x80; MAX_VARINT_LEN + 1];
    let err = read_varint(&mut src).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn negative_length_is_invalid() {
    let bytes = encoded(-3);
    let mut src = bytes.as_slice();
    let err = read_len(&mut src).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

proptest! {
    #[test]
    fn varint_roundtrip(value in any::<i64>()) {
        let bytes = encoded(value);
        let mut src = bytes.as_slice();
        prop_assert_eq!(read_varint(&mut src).unwrap(), value);
        prop_assert!(src.is_empty());
    }

    #[test]
    fn smaller_magnitude_never_encodes_longer(a in any::<i32>(), b in any::<i32>()) {
        prop_assume!(a.unsigned_abs() != b.unsigned_abs());
        let (small, large) = if a.unsigned_abs() < b.unsigned_abs() { (a, b) } else { (b, a) };
        prop_assert!(encoded(i64::from(small)).len() <= encoded(i64::from(large)).len());
    }
}
