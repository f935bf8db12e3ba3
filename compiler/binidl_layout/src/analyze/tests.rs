use super::*;
use binidl_ir::PrimitiveKind as P;
use pretty_assertions::assert_eq;
use smallvec::smallvec;

fn layouts(build: impl FnOnce(binidl_ir::TypeGraphBuilder) -> binidl_ir::TypeGraphBuilder) -> Layouts {
    let graph = build(TypeGraph::builder()).build().unwrap();
    analyze(&graph).unwrap()
}

fn analyze_err(
    build: impl FnOnce(binidl_ir::TypeGraphBuilder) -> binidl_ir::TypeGraphBuilder,
) -> SchemaError {
    let graph = build(TypeGraph::builder()).build().unwrap();
    analyze(&graph).unwrap_err()
}

fn point(b: binidl_ir::TypeGraphBuilder) -> binidl_ir::TypeGraphBuilder {
    b.record("Point", |r| r.field("x", "i32").field("y", "i32"))
}

fn blob(b: binidl_ir::TypeGraphBuilder) -> binidl_ir::TypeGraphBuilder {
    b.record("Blob", |r| r.vec("data", "u8"))
}

#[test]
fn demo_record_is_one_fixed_run() {
    let l = layouts(|b| {
        b.record("Demo", |r| {
            r.field("a", "u32").field("b", "u16").array("c", "i16", 4)
        })
    });
    let demo = l.get("Demo").unwrap();
    assert_eq!(
        demo.info,
        LayoutInfo {
            fixed_size: 14,
            max_field_width: 4,
            first_field_width: 4,
            runs: smallvec![14],
            total_size: 14,
            flags: LayoutFlags::empty(),
        }
    );
    assert_eq!(
        demo.fields,
        vec![
            FieldClass::Primitive(P::U32),
            FieldClass::Primitive(P::U16),
            FieldClass::FixedArray {
                len: 4,
                elem: Element::Primitive(P::I16),
            },
        ]
    );
    assert!(demo.info.size_is_exact());
}

#[test]
fn variable_array_sets_flags_and_prefix_cost() {
    let l = layouts(|b| b.record("Sliced", |r| r.vec("s", "int8")));
    let info = l.info("Sliced").unwrap();
    assert_eq!(info.fixed_size, 0);
    assert!(info.runs.is_empty());
    assert_eq!(
        info.flags,
        LayoutFlags::VARIABLE_LENGTH | LayoutFlags::NEEDS_BYTE_SOURCE
    );
    assert_eq!(info.total_size, 1);
    assert_eq!(info.max_field_width, 1);
    assert_eq!(info.first_field_width, 0);
    assert!(!info.size_is_exact());
}

#[test]
fn inlinable_records_merge_into_parent_run() {
    let l = layouts(|b| {
        point(b).record("Line", |r| {
            r.field("tag", "u8")
                .field("a", "Point")
                .field("b", "Point")
                .field("n", "u16")
        })
    });
    let line = l.get("Line").unwrap();
    assert_eq!(line.info.runs.as_slice(), &[19]);
    assert_eq!(line.info.fixed_size, 19);
    assert_eq!(line.info.max_field_width, 4);
    assert_eq!(line.info.first_field_width, 1);
    assert_eq!(line.fields[1], FieldClass::InlinableRecord("Point".into()));
    assert!(line.info.is_inlinable());
}

#[test]
fn fixed_array_of_inlinable_records_unrolls() {
    let l = layouts(|b| point(b).record("Grid", |r| r.array("cells", "Point", 3)));
    let grid = l.get("Grid").unwrap();
    assert_eq!(grid.info.fixed_size, 24);
    assert_eq!(grid.info.runs.as_slice(), &[24]);
    assert_eq!(
        grid.fields[0],
        FieldClass::FixedArray {
            len: 3,
            elem: Element::Inline("Point".into()),
        }
    );
}

#[test]
fn dispatch_closes_the_current_run() {
    let l = layouts(|b| {
        blob(b).record("Msg", |r| {
            r.field("id", "u32")
                .field("blob", "Blob")
                .field("crc", "u16")
                .field("crc2", "u16")
        })
    });
    let msg = l.get("Msg").unwrap();
    assert_eq!(msg.info.runs.as_slice(), &[4, 4]);
    assert_eq!(msg.info.fixed_size, 8);
    assert_eq!(msg.info.total_size, 9);
    assert_eq!(
        msg.info.flags,
        LayoutFlags::REQUIRES_DISPATCH | LayoutFlags::NEEDS_BYTE_SOURCE
    );
    assert!(!msg.info.is_variable_length());
    assert_eq!(msg.fields[1], FieldClass::DispatchedRecord("Blob".into()));
}

#[test]
fn fixed_array_of_dispatched_records_closes_run_once() {
    let l = layouts(|b| {
        blob(b).record("Batch", |r| {
            r.field("a", "u8")
                .array("blobs", "Blob", 3)
                .field("b", "u8")
                .field("c", "u8")
        })
    });
    let batch = l.info("Batch").unwrap();
    assert_eq!(batch.runs.as_slice(), &[1, 2]);
    assert_eq!(batch.total_size, 3 + 3);
}

#[test]
fn forward_references_do_not_depend_on_order() {
    let before = layouts(|b| {
        b.record("Outer", |r| r.field("inner", "Inner").field("z", "u64"))
            .record("Inner", |r| r.field("a", "u16"))
    });
    let after = layouts(|b| {
        b.record("Inner", |r| r.field("a", "u16"))
            .record("Outer", |r| r.field("inner", "Inner").field("z", "u64"))
    });
    assert_eq!(before.get("Outer"), after.get("Outer"));
    assert_eq!(before.info("Outer").unwrap().fixed_size, 10);
}

#[test]
fn direct_self_containment_is_a_cycle() {
    let err = analyze_err(|b| b.record("Node", |r| r.field("next", "Node")));
    assert_eq!(
        err,
        SchemaError::CyclicByValue {
            cycle: vec!["Node".into(), "Node".into()],
        }
    );
}

#[test]
fn indirect_containment_through_array_is_a_cycle() {
    let err = analyze_err(|b| {
        b.record("A", |r| r.field("b", "B"))
            .record("B", |r| r.array("a", "A", 2))
    });
    assert_eq!(
        err,
        SchemaError::CyclicByValue {
            cycle: vec!["A".into(), "B".into(), "A".into()],
        }
    );
}

#[test]
fn variable_array_breaks_cycles() {
    let l = layouts(|b| b.record("Tree", |r| r.field("v", "u32").vec("kids", "Tree")));
    let tree = l.get("Tree").unwrap();
    assert_eq!(
        tree.fields[1],
        FieldClass::VariableArray {
            elem: Element::Dispatched("Tree".into()),
        }
    );
    assert_eq!(tree.info.runs.as_slice(), &[4]);
}

#[test]
fn unresolved_reference_names_record_and_field() {
    let err = analyze_err(|b| b.record("Bad", |r| r.field("x", "Missing")));
    assert_eq!(
        err,
        SchemaError::UnresolvedType {
            record: "Bad".into(),
            field: "x".into(),
            type_ref: "Missing".into(),
        }
    );
}

#[test]
fn external_types_are_dispatched() {
    let l = layouts(|b| {
        b.external("Stamp", "crate::Stamp")
            .record("Event", |r| r.field("at", "Stamp").field("seq", "u64"))
    });
    let event = l.get("Event").unwrap();
    assert_eq!(event.fields[0], FieldClass::DispatchedRecord("Stamp".into()));
    assert_eq!(event.info.flags, LayoutFlags::REQUIRES_DISPATCH);
    assert_eq!(event.info.runs.as_slice(), &[8]);
    assert_eq!(event.info.total_size, 8);
    assert!(l.get("Stamp").is_none());
}

#[test]
fn aliases_resolve_to_their_primitive() {
    let l = layouts(|b| {
        b.alias("Celsius", P::I16)
            .record("Temp", |r| r.field("t", "Celsius").field("raw", "byte"))
    });
    let temp = l.get("Temp").unwrap();
    assert_eq!(
        temp.fields,
        vec![FieldClass::Primitive(P::I16), FieldClass::Primitive(P::Byte)]
    );
    assert_eq!(temp.info.fixed_size, 3);
}

#[test]
fn byte_source_need_crosses_dispatch_boundaries() {
    let l = layouts(|b| {
        b.record("Leaf", |r| r.vec("xs", "u8"))
            .record("Mid", |r| r.field("leaf", "Leaf"))
            .record("Top", |r| r.field("mid", "Mid").field("n", "u8"))
    });
    let top = l.info("Top").unwrap();
    assert!(top.needs_byte_source());
    assert!(top.requires_dispatch());
    assert!(!top.is_variable_length());
    assert_eq!(top.total_size, 2);
}

#[test]
fn fixed_records_never_need_a_byte_source() {
    let l = layouts(|b| point(b).record("Pair", |r| r.array("p", "Point", 2)));
    assert!(!l.info("Pair").unwrap().needs_byte_source());
}

#[test]
fn variable_array_of_inlinable_records_dispatches_elements() {
    let l = layouts(|b| point(b).record("Path", |r| r.vec("pts", "Point")));
    let path = l.get("Path").unwrap();
    assert_eq!(
        path.fields[0],
        FieldClass::VariableArray {
            elem: Element::Dispatched("Point".into()),
        }
    );
    assert_eq!(path.info.max_field_width, 0);
}

#[test]
fn empty_records_and_arrays_contribute_nothing() {
    let l = layouts(|b| {
        b.record("Empty", |r| r)
            .record("Holder", |r| r.field("e", "Empty").array("z", "u32", 0).field("x", "u8"))
    });
    let empty = l.info("Empty").unwrap();
    assert_eq!(empty.fixed_size, 0);
    assert!(empty.runs.is_empty());
    assert!(empty.is_inlinable());

    let holder = l.info("Holder").unwrap();
    assert_eq!(holder.runs.as_slice(), &[1]);
    assert_eq!(holder.first_field_width, 1);
    assert_eq!(holder.max_field_width, 1);
}

#[test]
fn every_record_gets_a_layout() {
    let l = layouts(|b| point(b).alias("Id", P::U64).record("Tagged", |r| r.field("id", "Id")));
    assert_eq!(l.len(), 2);
    assert!(l.info("Id").is_none());
}

#[test]
fn oversized_array_names_the_overflowing_field() {
    let err = analyze_err(|b| {
        b.record("Huge", |r| r.field("tag", "u8").array("words", "u64", usize::MAX / 4))
    });
    assert_eq!(
        err,
        SchemaError::SizeOverflow {
            record: "Huge".into(),
            field: "words".into(),
        }
    );
}

#[test]
fn overflow_through_nested_records_is_reported_on_the_parent() {
    let err = analyze_err(|b| {
        b.record("Half", |r| r.array("bytes", "u8", usize::MAX / 2 + 1))
            .record("Pair", |r| r.array("halves", "Half", 2))
    });
    assert_eq!(
        err,
        SchemaError::SizeOverflow {
            record: "Pair".into(),
            field: "halves".into(),
        }
    );
}
