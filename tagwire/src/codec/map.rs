//! Map field emission and decode.
//!
//! A map field is repeated embedded under the hood: each entry is a synthetic
//! `{key, value}` submessage registered alongside ordinary nested messages.

use alloc::collections::BTreeMap;

use crate::codec::message::{decode_message, encode_embedded_record};
use crate::codec::scalar::scalar_default;
use crate::error::{DecodeErrorKind, EncodeError};
use crate::props::{FieldProps, FieldType, MessageProps, TypeRegistry};
use crate::value::{MapKey, MessageValue, Value};

/// Emit one embedded record per map entry, in key order.
pub(crate) fn encode_map<B: bytes::BufMut>(
    field: &FieldProps,
    entry_props: &MessageProps,
    entries: &BTreeMap<MapKey, Value>,
    registry: &TypeRegistry,
    buf: &mut B,
) -> Result<(), EncodeError> {
    for (key, value) in entries {
        let mut entry = MessageValue::new();
        entry.set("key", key.to_value());
        entry.set("value", value.clone());
        encode_embedded_record(field, entry_props, &entry, registry, buf)?;
    }
    Ok(())
}

/// Decode a single map entry body into its key/value pair.
///
/// Entries omitting the key or value fall back to the declared type's
/// default, matching upstream decoder behavior.
pub(crate) fn decode_entry(
    entry_props: &MessageProps,
    registry: &TypeRegistry,
    buf: &mut &[u8],
) -> Result<(MapKey, Value), DecodeErrorKind> {
    let entry = decode_message(buf, entry_props, registry)?;

    let key = match entry.get("key") {
        Some(value) => MapKey::from_value(value.clone()).ok_or(DecodeErrorKind::InvalidKey {
            reason: "map key must be an integral, bool or string scalar",
        })?,
        None => default_key(entry_props)?,
    };
    let value = match entry.get("value") {
        Some(value) => value.clone(),
        None => default_entry_value(entry_props, registry),
    };
    Ok((key, value))
}

fn default_key(entry_props: &MessageProps) -> Result<MapKey, DecodeErrorKind> {
    let kind = entry_props
        .field_by_name("key")
        .and_then(|f| match &f.ty {
            FieldType::Scalar(kind) => Some(*kind),
            _ => None,
        })
        .ok_or(DecodeErrorKind::InvalidKey {
            reason: "map entry has no scalar key field",
        })?;
    MapKey::from_value(scalar_default(kind)).ok_or(DecodeErrorKind::InvalidKey {
        reason: "map key must be an integral, bool or string scalar",
    })
}

fn default_entry_value(entry_props: &MessageProps, registry: &TypeRegistry) -> Value {
    match entry_props.field_by_name("value").map(|f| &f.ty) {
        Some(FieldType::Scalar(kind)) => scalar_default(*kind),
        Some(FieldType::Enum(name)) => registry
            .enumeration(name)
            .and_then(|props| props.number_symbol(0))
            .map(|symbol| Value::Sym(symbol.into()))
            .unwrap_or(Value::Int(0)),
        Some(FieldType::Message(_)) => Value::Message(MessageValue::new()),
        None => Value::Message(MessageValue::new()),
    }
}
