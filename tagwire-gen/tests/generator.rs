//! End-to-end generator test: request bytes in, generated modules out.

use tagwire::leb128::LebCodec;
use tagwire::wire::{encode_key, WireType};

use tagwire_gen::plugin::{run, CodeGeneratorRequest};
use tagwire_gen::generate;

fn field_varint(tag: u32, value: u64, buf: &mut Vec<u8>) {
    encode_key(WireType::Varint, tag, buf);
    value.encode_leb128(buf);
}

fn field_bytes(tag: u32, payload: &[u8], buf: &mut Vec<u8>) {
    encode_key(WireType::Len, tag, buf);
    (payload.len() as u64).encode_leb128(buf);
    buf.extend_from_slice(payload);
}

fn field_str(tag: u32, value: &str, buf: &mut Vec<u8>) {
    field_bytes(tag, value.as_bytes(), buf);
}

fn scalar_field(name: &str, number: u64, label: u64, ty: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    field_str(1, name, &mut buf);
    field_varint(3, number, &mut buf);
    field_varint(4, label, &mut buf);
    field_varint(5, ty, &mut buf);
    buf
}

/// Build a request for:
///
/// ```proto
/// syntax = "proto3";
/// package demo;
/// enum Month { MONTH_UNSPECIFIED = 0; JANUARY = 2; }
/// message MonthValue { Month value = 1; }
/// message Event {
///   string name = 1;
///   MonthValue month = 2;
///   repeated int32 values = 3;
///   oneof payload { string text = 4; }
/// }
/// ```
fn demo_request_bytes(parameter: &str) -> Vec<u8> {
    // enum Month
    let mut unspecified = Vec::new();
    field_str(1, "MONTH_UNSPECIFIED", &mut unspecified);
    field_varint(2, 0, &mut unspecified);
    let mut january = Vec::new();
    field_str(1, "JANUARY", &mut january);
    field_varint(2, 2, &mut january);
    let mut month = Vec::new();
    field_str(1, "Month", &mut month);
    field_bytes(2, &unspecified, &mut month);
    field_bytes(2, &january, &mut month);

    // message MonthValue { Month value = 1; }
    let mut value_field = Vec::new();
    field_str(1, "value", &mut value_field);
    field_varint(3, 1, &mut value_field);
    field_varint(4, 1, &mut value_field);
    field_varint(5, 14, &mut value_field); // enum
    field_str(6, ".demo.Month", &mut value_field);
    let mut month_value = Vec::new();
    field_str(1, "MonthValue", &mut month_value);
    field_bytes(2, &value_field, &mut month_value);

    // message Event
    let mut month_field = Vec::new();
    field_str(1, "month", &mut month_field);
    field_varint(3, 2, &mut month_field);
    field_varint(4, 1, &mut month_field);
    field_varint(5, 11, &mut month_field); // message
    field_str(6, ".demo.MonthValue", &mut month_field);

    let mut text_field = scalar_field("text", 4, 1, 9);
    field_varint(9, 0, &mut text_field); // oneof_index

    let mut payload_decl = Vec::new();
    field_str(1, "payload", &mut payload_decl);

    let mut event = Vec::new();
    field_str(1, "Event", &mut event);
    field_bytes(2, &scalar_field("name", 1, 1, 9), &mut event);
    field_bytes(2, &month_field, &mut event);
    field_bytes(2, &scalar_field("values", 3, 3, 5), &mut event);
    field_bytes(2, &text_field, &mut event);
    field_bytes(8, &payload_decl, &mut event);

    let mut file = Vec::new();
    field_str(1, "demo.proto", &mut file);
    field_str(2, "demo", &mut file);
    field_bytes(5, &month, &mut file);
    field_bytes(4, &month_value, &mut file);
    field_bytes(4, &event, &mut file);
    field_str(12, "proto3", &mut file);

    let mut request = Vec::new();
    field_str(1, "demo.proto", &mut request);
    field_str(2, parameter, &mut request);
    field_bytes(15, &file, &mut request);
    request
}

#[test]
fn test_generate_demo_module() {
    let bytes = demo_request_bytes("using_value_wrappers=true,gen_descriptors=true");
    let request = CodeGeneratorRequest::decode(&bytes).unwrap();
    let response = generate(&request).unwrap();

    assert_eq!(response.file.len(), 1);
    let file = &response.file[0];
    assert_eq!(file.name, "demo.rs");

    let content = &file.content;
    assert!(content.contains("pub fn registry()"), "{content}");
    assert!(content.contains("MessageProps::new"), "{content}");
    assert!(content.contains("\"Demo::Event\""), "{content}");
    assert!(content.contains("register_message(\"demo.Event\""), "{content}");
    assert!(content.contains("register_enum(\"demo.Month\""), "{content}");
    assert!(content.contains("push_oneof(\"payload\")"), "{content}");
    assert!(content.contains(".oneof(0usize)"), "{content}");
    // proto3 repeated int32 comes out packed.
    assert!(content.contains(".packed()"), "{content}");
    // The wrapper is flagged in its compiled props and aliased in TYPES.
    assert!(content.contains("props.wrapper = true;"), "{content}");
    assert!(content.contains("(\"demo.MonthValue\", \"Demo::Month\")"), "{content}");
    assert!(content.contains("(\"demo.Event\", \"Demo::Event\")"), "{content}");
    // gen_descriptors embeds the raw descriptor.
    assert!(content.contains("pub const FILE_DESCRIPTOR: &[u8]"), "{content}");
}

#[test]
fn test_generate_without_options() {
    let bytes = demo_request_bytes("");
    let request = CodeGeneratorRequest::decode(&bytes).unwrap();
    let response = generate(&request).unwrap();
    let content = &response.file[0].content;

    // No wrapper collapsing without using_value_wrappers.
    assert!(!content.contains("props.wrapper = true;"), "{content}");
    assert!(
        content.contains("(\"demo.MonthValue\", \"Demo::MonthValue\")"),
        "{content}"
    );
    // No descriptor constant without gen_descriptors.
    assert!(!content.contains("FILE_DESCRIPTOR"), "{content}");
}

#[test]
fn test_generated_registry_drives_the_encoder() {
    // The generated source must compile `MessageProps` construction the
    // same way this hand-built registry does; mirror it and verify the
    // end-to-end bytes for Event{month: JANUARY}.
    use tagwire::codec::encode_to_vec;
    use tagwire::props::{EnumProps, FieldProps, FieldType, MessageProps, ScalarKind, Syntax, TypeRegistry};
    use tagwire::value::{MessageValue, Value};

    let mut registry = TypeRegistry::new();
    registry.register_enum(
        "demo.Month",
        EnumProps::new("Demo::Month")
            .with_symbol("MONTH_UNSPECIFIED", 0)
            .with_symbol("JANUARY", 2),
    );
    let mut wrapper = MessageProps::new("Demo::MonthValue", Syntax::Proto3)
        .with_field(FieldProps::new(1, "value", FieldType::Enum("demo.Month".into())));
    wrapper.wrapper = true;
    registry.register_message("demo.MonthValue", wrapper);

    let props = MessageProps::new("Demo::Event", Syntax::Proto3)
        .with_oneof("payload")
        .with_field(FieldProps::new(1, "name", FieldType::Scalar(ScalarKind::String)))
        .with_field(FieldProps::new(2, "month", FieldType::Message("demo.MonthValue".into())))
        .with_field(FieldProps::new(3, "values", FieldType::Scalar(ScalarKind::Int32)).packed())
        .with_field(FieldProps::new(4, "text", FieldType::Scalar(ScalarKind::String)).oneof(0));

    let event = MessageValue::new().with("month", Value::Sym("JANUARY".into()));
    let bytes = encode_to_vec(&event, &props, &registry).unwrap();
    assert_eq!(bytes, [0x12, 0x02, 0x08, 0x02]);
}

#[test]
fn test_run_end_to_end() {
    let bytes = demo_request_bytes("using_value_wrappers=true");
    let mut output = Vec::new();
    run(&mut &bytes[..], &mut output).unwrap();

    // The response starts with a file entry: field 15, Len framing.
    assert_eq!(output[0], 0x7a);
    assert!(!output.is_empty());
}

#[test]
fn test_run_rejects_garbage() {
    // A truncated length prefix cannot decode.
    let bytes = [0x7a, 0xff];
    let mut output = Vec::new();
    assert!(run(&mut &bytes[..], &mut output).is_err());
    assert!(output.is_empty());
}

#[test]
fn test_unknown_requested_file_fails() {
    let mut request = Vec::new();
    field_str(1, "missing.proto", &mut request);
    let request = CodeGeneratorRequest::decode(&request).unwrap();
    assert!(matches!(
        generate(&request).unwrap_err(),
        tagwire_gen::Error::UnknownFile(_)
    ));
}
