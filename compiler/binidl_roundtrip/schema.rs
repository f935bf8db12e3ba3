//! The schema every generated module is built from.

use binidl_ir::{PrimitiveKind, SchemaError, TypeGraph};

pub fn schema() -> Result<TypeGraph, SchemaError> {
    TypeGraph::builder()
        .alias("Celsius", PrimitiveKind::I16)
        .external("Stamp", "crate::stamp::Stamp")
        .record("Demo", |r| {
            r.field("A", "uint32").field("B", "uint16").array("C", "int16", 4)
        })
        .record("Sliced", |r| r.vec("s", "int8"))
        .record("Point", |r| r.field("X", "int32").field("Y", "int32"))
        .record("Line", |r| r.field("A", "Point").field("B", "Point").field("Color", "byte"))
        .record("Blob", |r| r.vec("Data", "byte"))
        .record("Packet", |r| {
            r.field("ID", "uint16")
                .field("Line", "Line")
                .field("Blob", "Blob")
                .vec("Points", "Point")
                .field("At", "Stamp")
                .array("History", "Stamp", 2)
                .field("Temp", "Celsius")
                .vec("Deltas", "int64")
                .array("Blobs", "Blob", 2)
                .field("Tail", "uint32")
        })
        .record("Frame", |r| r.field("Kind", "byte").vec("Body", "byte").field("End", "byte"))
        .record("Tree", |r| r.field("Value", "Celsius").vec("Kids", "Tree"))
        .record("Wide", |r| r.array("Words", "uint64", 12).field("Flag", "int8"))
        .record("Keywords", |r| r.field("Type", "u8").field("Match", "u16").field("Self", "i32"))
        .record("Empty", |r| r)
        .build()
}
