use super::*;
use pretty_assertions::assert_eq;

#[test]
fn widths_match_rust_types() {
    for kind in PrimitiveKind::ALL {
        let expected = match kind.rust_name() {
            "i8" | "u8" => 1,
            "i16" | "u16" => 2,
            "i32" | "u32" => 4,
            _ => 8,
        };
        assert_eq!(kind.width(), expected, "{kind}");
    }
}

#[test]
fn encodes_as_same_width_unsigned() {
    for kind in PrimitiveKind::ALL {
        let canonical = kind.encodes_as();
        assert_eq!(canonical.width(), kind.width());
        assert!(!canonical.is_signed());
    }
}

#[test]
fn go_and_rust_spellings_resolve() {
    assert_eq!(PrimitiveKind::from_name("int16"), Some(PrimitiveKind::I16));
    assert_eq!(PrimitiveKind::from_name("i16"), Some(PrimitiveKind::I16));
    assert_eq!(PrimitiveKind::from_name("uint64"), Some(PrimitiveKind::U64));
    assert_eq!(PrimitiveKind::from_name("byte"), Some(PrimitiveKind::Byte));
}

#[test]
fn bare_int_is_eight_bytes() {
    let kind = PrimitiveKind::from_name("int");
    assert_eq!(kind, Some(PrimitiveKind::I64));
    assert_eq!(kind.map(PrimitiveKind::width), Some(8));
}

#[test]
fn unknown_names_do_not_resolve() {
    assert_eq!(PrimitiveKind::from_name("float64"), None);
    assert_eq!(PrimitiveKind::from_name("Demo"), None);
    assert_eq!(PrimitiveKind::from_name(""), None);
}

#[test]
fn byte_displays_as_byte() {
    assert_eq!(PrimitiveKind::Byte.to_string(), "byte");
    assert_eq!(PrimitiveKind::Byte.rust_name(), "u8");
    assert_eq!(PrimitiveKind::I32.to_string(), "i32");
}
