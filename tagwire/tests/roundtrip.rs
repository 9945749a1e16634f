//! Round-trip laws: decode(encode(v)) == v and canonical byte stability.

use proptest::prelude::*;

use tagwire::codec::{decode_message, decode_scalar, encode_scalar, encode_to_vec};
use tagwire::props::{
    EnumProps, FieldProps, FieldType, MessageProps, ScalarKind, Syntax, TypeRegistry,
};
use tagwire::value::{MessageValue, Value};

fn scalar_roundtrip(kind: ScalarKind, value: Value) -> Value {
    let mut buf = Vec::new();
    encode_scalar(kind, &value, &mut buf).unwrap();
    decode_scalar(kind, &mut &buf[..]).unwrap()
}

proptest! {
    #[test]
    fn proptest_int32_roundtrip(v: i32) {
        let value = Value::Int(i64::from(v));
        prop_assert_eq!(scalar_roundtrip(ScalarKind::Int32, value.clone()), value);
    }

    #[test]
    fn proptest_int64_roundtrip(v: i64) {
        let value = Value::Int(v);
        prop_assert_eq!(scalar_roundtrip(ScalarKind::Int64, value.clone()), value);

        // Negative 64-bit values produce exactly ten bytes.
        if v < 0 {
            let mut buf = Vec::new();
            encode_scalar(ScalarKind::Int64, &Value::Int(v), &mut buf).unwrap();
            prop_assert_eq!(buf.len(), 10);
        }
    }

    #[test]
    fn proptest_uint_roundtrip(v: u64) {
        let value = Value::UInt(v);
        prop_assert_eq!(scalar_roundtrip(ScalarKind::UInt64, value.clone()), value);
    }

    #[test]
    fn proptest_sint_roundtrip(v: i64) {
        let value = Value::Int(v);
        prop_assert_eq!(scalar_roundtrip(ScalarKind::Sint64, value.clone()), value);
    }

    #[test]
    fn proptest_sint32_roundtrip(v: i32) {
        let value = Value::Int(i64::from(v));
        prop_assert_eq!(scalar_roundtrip(ScalarKind::Sint32, value.clone()), value);
    }

    #[test]
    fn proptest_fixed_roundtrip(v: u32, w: i64) {
        let value = Value::UInt(u64::from(v));
        prop_assert_eq!(scalar_roundtrip(ScalarKind::Fixed32, value.clone()), value);

        let value = Value::Int(w);
        prop_assert_eq!(scalar_roundtrip(ScalarKind::Sfixed64, value.clone()), value);
    }

    #[test]
    fn proptest_double_roundtrip(v in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let value = Value::Double(v);
        prop_assert_eq!(scalar_roundtrip(ScalarKind::Double, value.clone()), value);
    }

    #[test]
    fn proptest_string_roundtrip(s in ".*") {
        let value = Value::Str(s);
        prop_assert_eq!(scalar_roundtrip(ScalarKind::String, value.clone()), value);
    }

    #[test]
    fn proptest_bytes_roundtrip(b: Vec<u8>) {
        let value = Value::Bytes(b);
        prop_assert_eq!(scalar_roundtrip(ScalarKind::Bytes, value.clone()), value);
    }
}

#[test]
fn test_nan_roundtrips_to_emitted_pattern() {
    let mut buf = Vec::new();
    encode_scalar(ScalarKind::Double, &Value::Double(f64::NAN), &mut buf).unwrap();
    let decoded = decode_scalar(ScalarKind::Double, &mut &buf[..]).unwrap();

    // NaN compares bit-identical to the emitted pattern, not by ==.
    let Value::Double(v) = decoded else {
        panic!("expected a double")
    };
    assert!(v.is_nan());

    let mut again = Vec::new();
    encode_scalar(ScalarKind::Double, &Value::Double(v), &mut again).unwrap();
    assert_eq!(buf, again);
}

fn demo_schema() -> (MessageProps, TypeRegistry) {
    let mut registry = TypeRegistry::new();
    registry.register_enum(
        "demo.Kind",
        EnumProps::new("Kind")
            .with_symbol("KIND_UNSPECIFIED", 0)
            .with_symbol("ALPHA", 1)
            .with_symbol("BETA", 2),
    );
    registry.register_message(
        "demo.Inner",
        MessageProps::new("Inner", Syntax::Proto3)
            .with_field(FieldProps::new(1, "n", FieldType::Scalar(ScalarKind::Sint64))),
    );
    registry.register_message(
        "demo.Outer.LabelsEntry",
        MessageProps::new("Outer::LabelsEntry", Syntax::Proto3)
            .with_field(FieldProps::new(1, "key", FieldType::Scalar(ScalarKind::String)))
            .with_field(FieldProps::new(2, "value", FieldType::Scalar(ScalarKind::UInt32))),
    );

    let props = MessageProps::new("Outer", Syntax::Proto3)
        .with_oneof("choice")
        .with_field(FieldProps::new(1, "name", FieldType::Scalar(ScalarKind::String)))
        .with_field(FieldProps::new(2, "kind", FieldType::Enum("demo.Kind".into())))
        .with_field(FieldProps::new(3, "inner", FieldType::Message("demo.Inner".into())))
        .with_field(FieldProps::new(4, "values", FieldType::Scalar(ScalarKind::Int32)).packed())
        .with_field(
            FieldProps::new(5, "labels", FieldType::Message("demo.Outer.LabelsEntry".into()))
                .map_entry(),
        )
        .with_field(FieldProps::new(6, "left", FieldType::Scalar(ScalarKind::Int32)).oneof(0))
        .with_field(FieldProps::new(7, "right", FieldType::Scalar(ScalarKind::String)).oneof(0));
    (props, registry)
}

#[test]
fn test_message_roundtrip() {
    let (props, registry) = demo_schema();

    let mut labels = std::collections::BTreeMap::new();
    labels.insert(tagwire::value::MapKey::Str("x".into()), Value::UInt(7));

    let msg = MessageValue::new()
        .with("name", "roundtrip")
        .with("kind", Value::Sym("BETA".into()))
        .with("inner", MessageValue::new().with("n", -42i64))
        .with(
            "values",
            Value::List(vec![Value::Int(3), Value::Int(0), Value::Int(-3)]),
        )
        .with("labels", Value::Map(labels))
        .with("choice", Value::branch("left", Value::Int(0)));

    let bytes = encode_to_vec(&msg, &props, &registry).unwrap();
    let decoded = decode_message(&mut &bytes[..], &props, &registry).unwrap();
    assert_eq!(decoded, msg);

    // Canonical decode then re-encode reproduces the original bytes.
    let again = encode_to_vec(&decoded, &props, &registry).unwrap();
    assert_eq!(bytes, again);
}

#[test]
fn test_decode_accepts_expanded_repeated() {
    let (props, registry) = demo_schema();

    // The canonical encoder packs field 4; an expanded record stream must
    // still decode. Two tagged varints: (4, 1) and (4, 2).
    let bytes = [0x20, 0x01, 0x20, 0x02];
    let decoded = decode_message(&mut &bytes[..], &props, &registry).unwrap();
    assert_eq!(
        decoded.get("values"),
        Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
    );
}

#[test]
fn test_decode_skips_unknown_fields() {
    let (props, registry) = demo_schema();

    // Unknown field 99 (varint 42) followed by name = "roundtrip".
    let bytes = [
        0x98, 0x06, 0x2a, //
        0x0a, 0x09, b'r', b'o', b'u', b'n', b'd', b't', b'r', b'i', b'p',
    ];
    let decoded = decode_message(&mut &bytes[..], &props, &registry).unwrap();
    // Unknown fields are skipped, not preserved.
    assert_eq!(decoded.get("name"), Some(&Value::Str("roundtrip".into())));
}

#[test]
fn test_decode_unknown_enum_number_stays_integer() {
    let (props, registry) = demo_schema();

    // kind = 9 has no symbol in demo.Kind.
    let bytes = [0x10, 0x09];
    let decoded = decode_message(&mut &bytes[..], &props, &registry).unwrap();
    assert_eq!(decoded.get("kind"), Some(&Value::Int(9)));

    // Re-encoding keeps the raw integer on the wire.
    let again = encode_to_vec(&decoded, &props, &registry).unwrap();
    assert_eq!(again, bytes);
}

#[test]
fn test_decode_last_scalar_wins() {
    let (props, registry) = demo_schema();

    // name = "a" then name = "b".
    let bytes = [0x0a, 0x01, b'a', 0x0a, 0x01, b'b'];
    let decoded = decode_message(&mut &bytes[..], &props, &registry).unwrap();
    assert_eq!(decoded.get("name"), Some(&Value::Str("b".into())));
}
