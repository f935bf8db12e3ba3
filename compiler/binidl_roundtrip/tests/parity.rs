//! Compiled codecs and the plan interpreter agree byte for byte.

#[path = "../schema.rs"]
mod schema;

use binidl_codegen::GeneratorConfig;
use binidl_eval::{Interpreter, Value};
use binidl_ir::Endian;
use binidl_roundtrip::{be, le, stream};
use binidl_rt::Marshal;
use proptest::prelude::*;

fn point(x: i32, y: i32) -> Value {
    Value::record([("X", Value::Signed(x.into())), ("Y", Value::Signed(y.into()))])
}

fn line_value(line: &le::Line) -> Value {
    Value::record([
        ("A", point(line.a.x, line.a.y)),
        ("B", point(line.b.x, line.b.y)),
        ("Color", Value::Unsigned(line.color.into())),
    ])
}

fn wide_value(words: &[u64; 12], flag: i8) -> Value {
    Value::record([
        ("Words", Value::unsigned_array(words.iter().copied())),
        ("Flag", Value::Signed(flag.into())),
    ])
}

fn sliced_value(s: &[i8]) -> Value {
    Value::record([("s", Value::signed_array(s.iter().copied().map(i64::from)))])
}

proptest! {
    #[test]
    fn line_matches_interpreter(ax: i32, ay: i32, bx: i32, by: i32, color: u8) {
        let graph = schema::schema().unwrap();
        let line = le::Line {
            a: le::Point { x: ax, y: ay },
            b: le::Point { x: bx, y: by },
            color,
        };
        let interp = Interpreter::new(&graph, &GeneratorConfig::default()).unwrap();
        let expected = interp.marshal_to_vec("Line", &line_value(&line)).unwrap();
        prop_assert_eq!(line.marshal_to_vec().unwrap(), expected);
    }

    #[test]
    fn wide_matches_interpreter_in_every_module(words: [u64; 12], flag: i8) {
        let graph = schema::schema().unwrap();
        let value = wide_value(&words, flag);
        let little = Interpreter::new(&graph, &GeneratorConfig::default()).unwrap();
        let big = Interpreter::new(&graph, &GeneratorConfig::default().with_endian(Endian::Big)).unwrap();

        let le_bytes = le::Wide { words, flag }.marshal_to_vec().unwrap();
        prop_assert_eq!(&le_bytes, &little.marshal_to_vec("Wide", &value).unwrap());
        prop_assert_eq!(&le_bytes, &stream::Wide { words, flag }.marshal_to_vec().unwrap());
        prop_assert_eq!(
            be::Wide { words, flag }.marshal_to_vec().unwrap(),
            big.marshal_to_vec("Wide", &value).unwrap()
        );
    }

    #[test]
    fn framed_bytes_match_interpreter(kind: u8, body in prop::collection::vec(any::<u8>(), 0..64), end: u8) {
        let graph = schema::schema().unwrap();
        let interp = Interpreter::new(&graph, &GeneratorConfig::default()).unwrap();
        let value = Value::record([
            ("Kind", Value::Unsigned(kind.into())),
            ("Body", Value::unsigned_array(body.iter().copied().map(u64::from))),
            ("End", Value::Unsigned(end.into())),
        ]);
        let bytes = le::Frame { kind, body, end }.marshal_to_vec().unwrap();
        prop_assert_eq!(&bytes, &interp.marshal_to_vec("Frame", &value).unwrap());
        prop_assert_eq!(interp.unmarshal("Frame", &mut bytes.as_slice()).unwrap(), value);
    }

    #[test]
    fn sequences_match_interpreter(s in prop::collection::vec(any::<i8>(), 0..300)) {
        let graph = schema::schema().unwrap();
        let interp = Interpreter::new(&graph, &GeneratorConfig::default()).unwrap();
        let bytes = le::Sliced { s: s.clone() }.marshal_to_vec().unwrap();
        prop_assert_eq!(&bytes, &interp.marshal_to_vec("Sliced", &sliced_value(&s)).unwrap());
        let decoded = interp.unmarshal("Sliced", &mut bytes.as_slice()).unwrap();
        prop_assert_eq!(decoded, sliced_value(&s));
    }
}
