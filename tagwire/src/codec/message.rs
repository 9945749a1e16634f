//! The dynamic message encoder and its symmetric decoder.

use alloc::string::String;
use alloc::vec::Vec;

use bytes::Buf;

use crate::codec::scalar::ElementCodec;
use crate::codec::{default_check, map, oneof, packed};
use crate::error::{DecodeErrorKind, EncodeError, TypeEncodeError};
use crate::leb128::LebCodec;
use crate::props::{FieldClass, FieldProps, FieldType, MessageProps, Syntax, TypeRegistry};
use crate::value::{MessageValue, Value};
use crate::wire::{self, WireType};

/// Encode a message value against its compiled properties.
///
/// Fields are emitted in declaration order; proto2 extensions follow the
/// declared fields. Any scalar range violation, invalid enum symbol or oneof
/// inconsistency fails the whole call with an error naming the struct and
/// field.
pub fn encode_message<B: bytes::BufMut>(
    msg: &MessageValue,
    props: &MessageProps,
    registry: &TypeRegistry,
    buf: &mut B,
) -> Result<(), EncodeError> {
    let active = oneof::resolve_groups(msg, props)?;

    for field in props.fields() {
        let value = match field.oneof {
            // Oneof members read from the resolved branch mapping; an unset
            // branch never emits.
            Some(_) => match active.get(field.name.as_str()) {
                Some(payload) => Some(*payload),
                None => continue,
            },
            None => msg.get(&field.name),
        };
        encode_field(props, field, value, field.oneof.is_some(), registry, buf)?;
    }

    if props.syntax == Syntax::Proto2 {
        for ((module, name), value) in msg.extensions() {
            let ext = registry
                .extension(module, name)
                .ok_or_else(|| EncodeError::UnknownExtension {
                    module: module.clone(),
                    field: name.clone(),
                })?;
            encode_field(props, ext, Some(value), false, registry, buf)?;
        }
    }

    Ok(())
}

/// Encode a message value into a fresh buffer.
///
/// On error the partial buffer is discarded; callers never observe a
/// half-encoded message.
pub fn encode_to_vec(
    msg: &MessageValue,
    props: &MessageProps,
    registry: &TypeRegistry,
) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    encode_message(msg, props, registry, &mut buf)?;
    Ok(buf)
}

fn encode_field<B: bytes::BufMut>(
    props: &MessageProps,
    field: &FieldProps,
    value: Option<&Value>,
    oneof_set: bool,
    registry: &TypeRegistry,
    buf: &mut B,
) -> Result<(), EncodeError> {
    if value.is_none() && field.required {
        return Err(EncodeError::MissingRequired {
            message: props.name.clone(),
            field: field.name.clone(),
        });
    }
    if default_check::should_skip(field, props.syntax, value, oneof_set, registry) {
        return Ok(());
    }
    let value = match value {
        Some(value) => value,
        None => return Ok(()),
    };

    match field.classify() {
        FieldClass::Normal => encode_normal(props, field, value, registry, buf),
        FieldClass::Packed => {
            let elements = expect_list(props, field, value)?;
            let codec = element_codec(field, registry)?;
            packed::encode_packed(field, &codec, elements, buf)
                .map_err(|source| EncodeError::field(&props.name, &field.name, source))
        }
        FieldClass::Embedded => encode_embedded(props, field, value, registry, buf),
    }
}

fn encode_normal<B: bytes::BufMut>(
    props: &MessageProps,
    field: &FieldProps,
    value: &Value,
    registry: &TypeRegistry,
    buf: &mut B,
) -> Result<(), EncodeError> {
    let codec = element_codec(field, registry)?;
    let with_context = |source| EncodeError::field(&props.name, &field.name, source);

    if field.repeated {
        // One independently tagged record per element.
        for element in expect_list(props, field, value)? {
            buf.put_slice(&field.encoded_fnum);
            codec.encode(element, buf).map_err(with_context)?;
        }
    } else {
        buf.put_slice(&field.encoded_fnum);
        codec.encode(value, buf).map_err(with_context)?;
    }
    Ok(())
}

fn encode_embedded<B: bytes::BufMut>(
    props: &MessageProps,
    field: &FieldProps,
    value: &Value,
    registry: &TypeRegistry,
    buf: &mut B,
) -> Result<(), EncodeError> {
    let type_name = match &field.ty {
        FieldType::Message(name) => name,
        // The classifier only yields Embedded for message types.
        _ => {
            return Err(EncodeError::field(
                &props.name,
                &field.name,
                TypeEncodeError::WrongShape {
                    scalar: "message",
                    found: value.kind_name(),
                },
            ))
        }
    };
    let child_props = registry
        .message(type_name)
        .ok_or_else(|| EncodeError::UnknownType {
            name: type_name.clone(),
        })?;

    if field.map {
        let entries = match value {
            Value::Map(entries) => entries,
            other => {
                return Err(EncodeError::field(
                    &props.name,
                    &field.name,
                    TypeEncodeError::WrongShape {
                        scalar: "map",
                        found: other.kind_name(),
                    },
                ))
            }
        };
        return map::encode_map(field, child_props, entries, registry, buf);
    }

    if field.repeated {
        for element in expect_list(props, field, value)? {
            encode_embedded_value(props, field, child_props, element, registry, buf)?;
        }
        Ok(())
    } else {
        encode_embedded_value(props, field, child_props, value, registry, buf)
    }
}

/// Emit one embedded record, inlining raw payloads into `{value: payload}`
/// when the declared type is a value wrapper.
fn encode_embedded_value<B: bytes::BufMut>(
    props: &MessageProps,
    field: &FieldProps,
    child_props: &MessageProps,
    value: &Value,
    registry: &TypeRegistry,
    buf: &mut B,
) -> Result<(), EncodeError> {
    let wrapped;
    let message = match value {
        Value::Message(message) => message,
        other if child_props.wrapper => {
            let mut inner = MessageValue::new();
            inner.set("value", other.clone());
            wrapped = inner;
            &wrapped
        }
        other => {
            return Err(EncodeError::field(
                &props.name,
                &field.name,
                TypeEncodeError::WrongShape {
                    scalar: "message",
                    found: other.kind_name(),
                },
            ))
        }
    };
    encode_embedded_record(field, child_props, message, registry, buf)
}

/// Emit the field key, the byte length of the recursively encoded message,
/// then its body.
pub(crate) fn encode_embedded_record<B: bytes::BufMut>(
    field: &FieldProps,
    child_props: &MessageProps,
    message: &MessageValue,
    registry: &TypeRegistry,
    buf: &mut B,
) -> Result<(), EncodeError> {
    let mut body = Vec::new();
    encode_message(message, child_props, registry, &mut body)?;

    buf.put_slice(&field.encoded_fnum);
    (body.len() as u64).encode_leb128(buf);
    buf.put_slice(&body);
    Ok(())
}

fn expect_list<'v>(
    props: &MessageProps,
    field: &FieldProps,
    value: &'v Value,
) -> Result<&'v [Value], EncodeError> {
    match value {
        Value::List(elements) => Ok(elements),
        other => Err(EncodeError::field(
            &props.name,
            &field.name,
            TypeEncodeError::WrongShape {
                scalar: "repeated",
                found: other.kind_name(),
            },
        )),
    }
}

fn element_codec<'a>(
    field: &'a FieldProps,
    registry: &'a TypeRegistry,
) -> Result<ElementCodec<'a>, EncodeError> {
    match &field.ty {
        FieldType::Scalar(kind) => Ok(ElementCodec::Scalar(*kind)),
        FieldType::Enum(name) => registry
            .enumeration(name)
            .map(ElementCodec::Enum)
            .ok_or_else(|| EncodeError::UnknownType { name: name.clone() }),
        FieldType::Message(name) => Err(EncodeError::UnknownType { name: name.clone() }),
    }
}

/// Decode a message body against its compiled properties.
///
/// Accepts any field order; unknown fields are skipped and not preserved.
/// Scalars follow last-value-wins, repeated fields append, map entries merge,
/// and oneof members land as branches under their group name.
pub fn decode_message(
    buf: &mut &[u8],
    props: &MessageProps,
    registry: &TypeRegistry,
) -> Result<MessageValue, DecodeErrorKind> {
    let mut msg = MessageValue::new();

    while buf.has_remaining() {
        let (wire_type, tag) = wire::decode_key(buf)?;
        let field = match props.field_by_tag(tag) {
            Some(field) => field,
            None => {
                wire::skip_field(wire_type, buf)?;
                continue;
            }
        };
        decode_field(&mut msg, props, field, wire_type, registry, buf)?;
    }

    Ok(msg)
}

fn decode_field(
    msg: &mut MessageValue,
    props: &MessageProps,
    field: &FieldProps,
    wire_type: WireType,
    registry: &TypeRegistry,
    buf: &mut &[u8],
) -> Result<(), DecodeErrorKind> {
    if field.embedded {
        let body = take_delimited(buf)?;
        let type_name = match &field.ty {
            FieldType::Message(name) => name,
            _ => {
                return Err(DecodeErrorKind::InvalidKey {
                    reason: "embedded field without a message type",
                })
            }
        };
        let child_props =
            registry
                .message(type_name)
                .ok_or_else(|| DecodeErrorKind::UnknownType {
                    name: type_name.clone(),
                })?;

        if field.map {
            let (key, value) = map::decode_entry(child_props, registry, &mut &body[..])?;
            msg.insert_map_entry(&field.name, key, value);
        } else {
            let value = Value::Message(decode_message(&mut &body[..], child_props, registry)?);
            store(msg, props, field, value);
        }
        return Ok(());
    }

    let codec = match decode_element_codec(field, registry) {
        Some(codec) => codec,
        None => {
            return Err(DecodeErrorKind::UnknownType {
                name: match &field.ty {
                    FieldType::Enum(name) | FieldType::Message(name) => name.clone(),
                    FieldType::Scalar(kind) => String::from(kind.proto_name()),
                },
            })
        }
    };

    // A Len record on a field whose elements are not length-delimited is the
    // packed representation; accept it whether or not the field was declared
    // packed.
    if field.repeated && wire_type == WireType::Len && field.ty.wire_type() != WireType::Len {
        let body = take_delimited(buf)?;
        let mut slice = &body[..];
        while slice.has_remaining() {
            let value = codec.decode(&mut slice)?;
            msg.push_repeated(&field.name, value);
        }
        return Ok(());
    }

    let value = codec.decode(buf)?;
    store(msg, props, field, value);
    Ok(())
}

fn decode_element_codec<'a>(
    field: &'a FieldProps,
    registry: &'a TypeRegistry,
) -> Option<ElementCodec<'a>> {
    match &field.ty {
        FieldType::Scalar(kind) => Some(ElementCodec::Scalar(*kind)),
        FieldType::Enum(name) => registry.enumeration(name).map(ElementCodec::Enum),
        FieldType::Message(_) => None,
    }
}

fn store(msg: &mut MessageValue, props: &MessageProps, field: &FieldProps, value: Value) {
    if let Some(group) = field.oneof.and_then(|index| props.oneofs().get(index)) {
        msg.set(group.clone(), Value::branch(field.name.clone(), value));
    } else if field.repeated {
        msg.push_repeated(&field.name, value);
    } else {
        msg.set(field.name.clone(), value);
    }
}

fn take_delimited(buf: &mut &[u8]) -> Result<Vec<u8>, DecodeErrorKind> {
    let len = wire::decode_len(buf)?;
    if buf.remaining() < len {
        return Err(DecodeErrorKind::UnexpectedEndOfBuffer);
    }
    let mut body = alloc::vec![0u8; len];
    buf.copy_to_slice(&mut body);
    Ok(body)
}
