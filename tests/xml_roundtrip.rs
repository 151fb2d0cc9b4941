//! Property-based tests for the XML structural codec
//!
//! Documents made of string scalars, nested mappings and arrays of scalars or flat
//! mappings must survive an encode → decode cycle unchanged, and encoding must be
//! deterministic for any value.

use proptest::prelude::*;
use shapeshift::formats::xml::{parse_document, serialize_document, XmlMapping};
use shapeshift::{Mapping, Number, Value};

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,5}"
}

/// Non-empty text, whitespace-only values included; an empty element has no value to keep
fn text_strategy() -> impl Strategy<Value = Value> {
    "[a-zA-Z0-9 &<>]{1,8}".prop_map(Value::String)
}

fn scalar_list_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec(text_strategy(), 1..4).prop_map(Value::Sequence)
}

fn flat_mapping_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(
        key_strategy(),
        prop_oneof![text_strategy(), scalar_list_strategy()],
        1..4,
    )
    .prop_map(Value::Mapping)
}

fn tree_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        text_strategy(),
        scalar_list_strategy(),
        prop::collection::vec(flat_mapping_strategy(), 1..4).prop_map(Value::Sequence),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map(key_strategy(), inner, 1..4).prop_map(Value::Mapping)
    })
}

fn document_strategy() -> impl Strategy<Value = Mapping> {
    prop::collection::btree_map(key_strategy(), tree_strategy(), 1..5)
}

/// Any value, numbers and nulls included
fn any_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(Number::Int(n))),
        (-1.0e6f64..1.0e6).prop_map(|f| Value::Number(Number::Float(f))),
        ".{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
            prop::collection::btree_map(key_strategy(), inner, 0..4).prop_map(Value::Mapping),
        ]
    })
}

fn encode(document: &Mapping) -> Vec<u8> {
    serialize_document(XmlMapping::new(document), "xml", 4).expect("encode")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_encode_decode_round_trip(document in document_strategy()) {
        let encoded = encode(&document);
        let decoded = parse_document(&encoded[..]);
        prop_assert!(decoded.is_ok(), "decode failed for {}", String::from_utf8_lossy(&encoded));
        prop_assert_eq!(decoded.unwrap(), document);
    }

    #[test]
    fn test_round_trip_without_indentation(document in document_strategy()) {
        let encoded = serialize_document(XmlMapping::new(&document), "root", 0).unwrap();
        prop_assert_eq!(parse_document(&encoded[..]).unwrap(), document);
    }

    #[test]
    fn test_encoding_is_deterministic(
        document in prop::collection::btree_map(key_strategy(), any_value_strategy(), 0..5)
    ) {
        prop_assert_eq!(encode(&document), encode(&document.clone()));
    }
}
