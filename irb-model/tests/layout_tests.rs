//! Tests for data layout parsing and size/alignment queries

use irb_common::IrbError;
use irb_model::{DataLayout, FloatKind, StructType, Type, DEFAULT_DATA_LAYOUT};
use irb_model::layout::Endianness;
use pretty_assertions::assert_eq;

fn va_list_tag() -> Type {
    Type::Struct(StructType::named(
        "struct.__va_list_tag",
        vec![Type::I32, Type::I32, Type::pointer_to(Type::I8), Type::pointer_to(Type::I8)],
    ))
}

#[test]
fn test_default_layout_primitives() {
    let layout = &*DEFAULT_DATA_LAYOUT;
    assert_eq!(layout.endianness, Endianness::Little);
    assert_eq!(layout.native_integer_widths, vec![8, 16, 32, 64]);
    assert_eq!(layout.stack_alignment, Some(128));

    assert_eq!(layout.size_of(&Type::I1), 1);
    assert_eq!(layout.size_of(&Type::I32), 4);
    assert_eq!(layout.alignment_of(&Type::I64), 8);
    assert_eq!(layout.size_of(&Type::pointer_to(Type::I8)), 8);
    assert_eq!(layout.alignment_of(&Type::DOUBLE), 8);
}

#[test]
fn test_integer_without_exact_entry() {
    let layout = &*DEFAULT_DATA_LAYOUT;
    // next larger entry
    assert_eq!(layout.alignment_of(&Type::Integer(24)), 4);
    // largest entry
    assert_eq!(layout.alignment_of(&Type::Integer(128)), 8);
    assert_eq!(layout.size_of(&Type::Integer(128)), 16);
}

#[test]
fn test_extended_floats() {
    let layout = &*DEFAULT_DATA_LAYOUT;
    assert_eq!(layout.size_of(&Type::X86_FP80), 16);
    assert_eq!(layout.store_size_of(&Type::X86_FP80), 10);
    assert_eq!(layout.alignment_of(&Type::Float(FloatKind::Half)), 2);
    assert_eq!(layout.size_of(&Type::FP128), 16);
}

#[test]
fn test_aggregates() {
    let layout = &*DEFAULT_DATA_LAYOUT;
    assert_eq!(layout.size_of(&va_list_tag()), 24);
    assert_eq!(layout.alignment_of(&va_list_tag()), 8);
    assert_eq!(layout.size_of(&Type::array_of(1, va_list_tag())), 24);

    let mixed = StructType::literal(vec![Type::I8, Type::I32, Type::I8]);
    assert_eq!(layout.field_offsets(&mixed.fields, false), vec![0, 4, 8]);
    assert_eq!(layout.size_of(&Type::Struct(mixed.clone())), 12);

    let mut packed = mixed;
    packed.packed = true;
    assert_eq!(layout.size_of(&Type::Struct(packed.clone())), 6);
    assert_eq!(layout.alignment_of(&Type::Struct(packed)), 1);
}

#[test]
fn test_vectors() {
    let layout = &*DEFAULT_DATA_LAYOUT;
    assert_eq!(layout.alignment_of(&Type::vector_of(4, Type::I32)), 16);
    assert_eq!(layout.size_of(&Type::vector_of(2, Type::I32)), 8);
    // no v96 entry: natural alignment
    assert_eq!(layout.alignment_of(&Type::vector_of(3, Type::I32)), 16);
    assert_eq!(layout.size_of(&Type::vector_of(3, Type::I32)), 16);
}

#[test]
fn test_non_storage_types() {
    let layout = &*DEFAULT_DATA_LAYOUT;
    for ty in [Type::Void, Type::Label, Type::Metadata, Type::Opaque("o".to_string())] {
        assert_eq!(layout.size_of(&ty), 0);
        assert_eq!(layout.alignment_of(&ty), 1);
    }
}

#[test]
fn test_custom_layout() {
    let layout = DataLayout::parse("E-p:32:32-i64:32-m:e").unwrap();
    assert_eq!(layout.endianness, Endianness::Big);
    assert_eq!(layout.size_of(&Type::pointer_to(Type::I32)), 4);
    assert_eq!(layout.alignment_of(&Type::I64), 4);
    assert_eq!(layout.mangling.as_deref(), Some("e"));
}

#[test]
fn test_unrecognized_token() {
    let err = DataLayout::parse("e-q:1:2").unwrap_err();
    assert!(matches!(err, IrbError::DataLayout { ref token, .. } if token == "q:1:2"));

    let err = DataLayout::parse("e-i32:abc").unwrap_err();
    assert!(err.to_string().contains("'abc' is not a bit count"));
}
