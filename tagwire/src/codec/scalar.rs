//! Per-scalar byte emission and the symmetric scalar decode.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;

use crate::error::{DecodeErrorKind, TypeEncodeError};
use crate::leb128::{
    zigzag_decode_32, zigzag_decode_64, zigzag_encode_32, zigzag_encode_64, LebCodec,
};
use crate::props::{EnumProps, ScalarKind};
use crate::value::Value;
use crate::wire::decode_len;

/// Bit pattern emitted for `float` NaN: `00 00 C0 7F` on the wire.
const FLOAT_NAN_BITS: u32 = 0x7fc0_0000;

/// Bit pattern emitted for `double` NaN: `01 00 .. 00 F8 7F` on the wire,
/// kept to match the output existing consumers were built against.
const DOUBLE_NAN_BITS: u64 = 0x7ff8_0000_0000_0001;

fn out_of_range(kind: ScalarKind, value: &Value) -> TypeEncodeError {
    TypeEncodeError::OutOfRange {
        scalar: kind.proto_name(),
        value: render(value),
    }
}

fn wrong_shape(scalar: &'static str, value: &Value) -> TypeEncodeError {
    TypeEncodeError::WrongShape {
        scalar,
        found: value.kind_name(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        other => format!("{other:?}"),
    }
}

/// Read a signed integer out of the dynamic value, range unchecked.
fn int_value(kind: ScalarKind, value: &Value) -> Result<i64, TypeEncodeError> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::UInt(v) => i64::try_from(*v).map_err(|_| out_of_range(kind, value)),
        other => Err(wrong_shape(kind.proto_name(), other)),
    }
}

/// Read an unsigned integer out of the dynamic value, range unchecked.
fn uint_value(kind: ScalarKind, value: &Value) -> Result<u64, TypeEncodeError> {
    match value {
        Value::UInt(v) => Ok(*v),
        Value::Int(v) => u64::try_from(*v).map_err(|_| out_of_range(kind, value)),
        other => Err(wrong_shape(kind.proto_name(), other)),
    }
}

fn double_value(kind: ScalarKind, value: &Value) -> Result<f64, TypeEncodeError> {
    match value {
        Value::Double(v) => Ok(*v),
        other => Err(wrong_shape(kind.proto_name(), other)),
    }
}

/// Encode a single scalar payload (no field key) for the declared kind.
///
/// Range violations and shape mismatches fail with [`TypeEncodeError`].
pub fn encode_scalar<B: bytes::BufMut>(
    kind: ScalarKind,
    value: &Value,
    buf: &mut B,
) -> Result<(), TypeEncodeError> {
    match kind {
        ScalarKind::Int32 => {
            let v = int_value(kind, value)?;
            let v = i32::try_from(v).map_err(|_| out_of_range(kind, value))?;
            // Sign extended to 64 bits: negatives always take ten bytes.
            (i64::from(v) as u64).encode_leb128(buf);
        }
        ScalarKind::Int64 => {
            let v = int_value(kind, value)?;
            (v as u64).encode_leb128(buf);
        }
        ScalarKind::UInt32 => {
            let v = uint_value(kind, value)?;
            let v = u32::try_from(v).map_err(|_| out_of_range(kind, value))?;
            v.encode_leb128(buf);
        }
        ScalarKind::UInt64 => {
            let v = uint_value(kind, value)?;
            v.encode_leb128(buf);
        }
        ScalarKind::Sint32 => {
            let v = int_value(kind, value)?;
            let v = i32::try_from(v).map_err(|_| out_of_range(kind, value))?;
            zigzag_encode_32(v).encode_leb128(buf);
        }
        ScalarKind::Sint64 => {
            let v = int_value(kind, value)?;
            zigzag_encode_64(v).encode_leb128(buf);
        }
        ScalarKind::Bool => match value {
            Value::Bool(v) => buf.put_u8(u8::from(*v)),
            other => return Err(wrong_shape(kind.proto_name(), other)),
        },
        ScalarKind::Fixed32 => {
            let v = uint_value(kind, value)?;
            let v = u32::try_from(v).map_err(|_| out_of_range(kind, value))?;
            buf.put_u32_le(v);
        }
        ScalarKind::Fixed64 => {
            let v = uint_value(kind, value)?;
            buf.put_u64_le(v);
        }
        ScalarKind::Sfixed32 => {
            let v = int_value(kind, value)?;
            let v = i32::try_from(v).map_err(|_| out_of_range(kind, value))?;
            buf.put_i32_le(v);
        }
        ScalarKind::Sfixed64 => {
            let v = int_value(kind, value)?;
            buf.put_i64_le(v);
        }
        ScalarKind::Float => {
            let v = double_value(kind, value)?;
            if v.is_nan() {
                buf.put_u32_le(FLOAT_NAN_BITS);
            } else {
                buf.put_f32_le(v as f32);
            }
        }
        ScalarKind::Double => {
            let v = double_value(kind, value)?;
            if v.is_nan() {
                buf.put_u64_le(DOUBLE_NAN_BITS);
            } else {
                buf.put_f64_le(v);
            }
        }
        ScalarKind::String => match value {
            Value::Str(s) => {
                (s.len() as u64).encode_leb128(buf);
                buf.put_slice(s.as_bytes());
            }
            other => return Err(wrong_shape(kind.proto_name(), other)),
        },
        ScalarKind::Bytes => match value {
            Value::Bytes(b) => {
                (b.len() as u64).encode_leb128(buf);
                buf.put_slice(b);
            }
            other => return Err(wrong_shape(kind.proto_name(), other)),
        },
    }
    Ok(())
}

/// Resolve an enum value to its integer through the symbol table.
pub(crate) fn enum_number(props: &EnumProps, value: &Value) -> Result<i32, TypeEncodeError> {
    match value {
        Value::Sym(symbol) => {
            props
                .symbol_number(symbol)
                .ok_or_else(|| TypeEncodeError::UnknownEnumSymbol {
                    enum_name: props.name.clone(),
                    symbol: symbol.clone(),
                })
        }
        Value::Int(v) => i32::try_from(*v).map_err(|_| TypeEncodeError::OutOfRange {
            scalar: "enum",
            value: render(value),
        }),
        Value::UInt(v) => i32::try_from(*v).map_err(|_| TypeEncodeError::OutOfRange {
            scalar: "enum",
            value: render(value),
        }),
        other => Err(wrong_shape("enum", other)),
    }
}

/// Encode an enum payload (no field key), resolving symbols through `props`.
pub fn encode_enum<B: bytes::BufMut>(
    props: &EnumProps,
    value: &Value,
    buf: &mut B,
) -> Result<(), TypeEncodeError> {
    let number = enum_number(props, value)?;
    // Enums are int32 on the wire, sign extended like every varint int.
    (i64::from(number) as u64).encode_leb128(buf);
    Ok(())
}

/// Decode a single scalar payload for the declared kind.
pub fn decode_scalar<B: bytes::Buf>(
    kind: ScalarKind,
    buf: &mut B,
) -> Result<Value, DecodeErrorKind> {
    Ok(match kind {
        ScalarKind::Int32 => {
            let raw = u64::decode_leb128(buf)?;
            Value::Int(i64::from(raw as i64 as i32))
        }
        ScalarKind::Int64 => Value::Int(u64::decode_leb128(buf)? as i64),
        ScalarKind::UInt32 => Value::UInt(u64::from(u64::decode_leb128(buf)? as u32)),
        ScalarKind::UInt64 => Value::UInt(u64::decode_leb128(buf)?),
        ScalarKind::Sint32 => {
            let raw = u64::decode_leb128(buf)?;
            Value::Int(i64::from(zigzag_decode_32(raw as u32)))
        }
        ScalarKind::Sint64 => Value::Int(zigzag_decode_64(u64::decode_leb128(buf)?)),
        ScalarKind::Bool => Value::Bool(u64::decode_leb128(buf)? != 0),
        ScalarKind::Fixed32 => {
            check_remaining(buf, 4)?;
            Value::UInt(u64::from(buf.get_u32_le()))
        }
        ScalarKind::Fixed64 => {
            check_remaining(buf, 8)?;
            Value::UInt(buf.get_u64_le())
        }
        ScalarKind::Sfixed32 => {
            check_remaining(buf, 4)?;
            Value::Int(i64::from(buf.get_i32_le()))
        }
        ScalarKind::Sfixed64 => {
            check_remaining(buf, 8)?;
            Value::Int(buf.get_i64_le())
        }
        ScalarKind::Float => {
            check_remaining(buf, 4)?;
            Value::Double(f64::from(buf.get_f32_le()))
        }
        ScalarKind::Double => {
            check_remaining(buf, 8)?;
            Value::Double(buf.get_f64_le())
        }
        ScalarKind::String => {
            let bytes = take_delimited(buf)?;
            Value::Str(String::from_utf8(bytes).map_err(|_| DecodeErrorKind::InvalidUtf8)?)
        }
        ScalarKind::Bytes => Value::Bytes(take_delimited(buf)?),
    })
}

fn check_remaining<B: bytes::Buf>(buf: &B, needed: usize) -> Result<(), DecodeErrorKind> {
    if buf.remaining() < needed {
        return Err(DecodeErrorKind::UnexpectedEndOfBuffer);
    }
    Ok(())
}

fn take_delimited<B: bytes::Buf>(buf: &mut B) -> Result<alloc::vec::Vec<u8>, DecodeErrorKind> {
    let len = decode_len(buf)?;
    check_remaining(buf, len)?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(bytes)
}

/// The proto3 scalar default for a kind, used when decoded map entries omit
/// their key or value.
pub(crate) fn scalar_default(kind: ScalarKind) -> Value {
    match kind {
        ScalarKind::Int32
        | ScalarKind::Int64
        | ScalarKind::Sint32
        | ScalarKind::Sint64
        | ScalarKind::Sfixed32
        | ScalarKind::Sfixed64 => Value::Int(0),
        ScalarKind::UInt32 | ScalarKind::UInt64 | ScalarKind::Fixed32 | ScalarKind::Fixed64 => {
            Value::UInt(0)
        }
        ScalarKind::Float | ScalarKind::Double => Value::Double(0.0),
        ScalarKind::Bool => Value::Bool(false),
        ScalarKind::String => Value::Str(String::new()),
        ScalarKind::Bytes => Value::Bytes(alloc::vec::Vec::new()),
    }
}

/// Encoder/decoder for a single non-message element, with enum symbol tables
/// already resolved from the registry.
pub(crate) enum ElementCodec<'a> {
    Scalar(ScalarKind),
    Enum(&'a EnumProps),
}

impl ElementCodec<'_> {
    pub(crate) fn encode<B: bytes::BufMut>(
        &self,
        value: &Value,
        buf: &mut B,
    ) -> Result<(), TypeEncodeError> {
        match self {
            ElementCodec::Scalar(kind) => encode_scalar(*kind, value, buf),
            ElementCodec::Enum(props) => encode_enum(props, value, buf),
        }
    }

    pub(crate) fn decode<B: bytes::Buf>(&self, buf: &mut B) -> Result<Value, DecodeErrorKind> {
        match self {
            ElementCodec::Scalar(kind) => decode_scalar(*kind, buf),
            ElementCodec::Enum(props) => {
                let number = u64::decode_leb128(buf)? as i64 as i32;
                Ok(match props.number_symbol(number) {
                    Some(symbol) => Value::Sym(String::from(symbol)),
                    None => Value::Int(i64::from(number)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::error::TypeEncodeError;

    #[track_caller]
    fn encoded(kind: ScalarKind, value: Value) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_scalar(kind, &value, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_varint_encoding() {
        assert_eq!(encoded(ScalarKind::Int32, Value::Int(150)), [0x96, 0x01]);
        assert_eq!(encoded(ScalarKind::UInt64, Value::UInt(0)), [0x00]);
        assert_eq!(encoded(ScalarKind::Bool, Value::Bool(true)), [0x01]);

        // Negative int32/int64 sign extend to the full ten byte varint.
        assert_eq!(
            encoded(ScalarKind::Int32, Value::Int(-1)),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
        assert_eq!(
            encoded(ScalarKind::Int64, Value::Int(-1)),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn test_zigzag_encoding() {
        assert_eq!(encoded(ScalarKind::Sint32, Value::Int(-1)), [0x02]);
        assert_eq!(
            encoded(ScalarKind::Sint32, Value::Int(2147483647)),
            [0xfe, 0xff, 0xff, 0xff, 0x0f]
        );
        assert_eq!(encoded(ScalarKind::Sint64, Value::Int(1)), [0x02]);
    }

    #[test]
    fn test_fixed_encoding() {
        assert_eq!(
            encoded(ScalarKind::Fixed32, Value::UInt(1)),
            [0x01, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            encoded(ScalarKind::Sfixed64, Value::Int(-2)),
            [0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn test_float_specials() {
        assert_eq!(
            encoded(ScalarKind::Float, Value::Double(f64::NAN)),
            [0x00, 0x00, 0xc0, 0x7f]
        );
        assert_eq!(
            encoded(ScalarKind::Float, Value::Double(f64::INFINITY)),
            [0x00, 0x00, 0x80, 0x7f]
        );
        assert_eq!(
            encoded(ScalarKind::Float, Value::Double(f64::NEG_INFINITY)),
            [0x00, 0x00, 0x80, 0xff]
        );

        assert_eq!(
            encoded(ScalarKind::Double, Value::Double(f64::NAN)),
            [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf8, 0x7f]
        );
        assert_eq!(
            encoded(ScalarKind::Double, Value::Double(f64::INFINITY)),
            [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf0, 0x7f]
        );
        assert_eq!(
            encoded(ScalarKind::Double, Value::Double(f64::NEG_INFINITY)),
            [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf0, 0xff]
        );
    }

    #[test]
    fn test_length_delimited() {
        assert_eq!(
            encoded(ScalarKind::String, Value::from("abc")),
            [0x03, b'a', b'b', b'c']
        );
        assert_eq!(encoded(ScalarKind::Bytes, Value::Bytes(Vec::new())), [0x00]);
    }

    #[test]
    fn test_range_violations() {
        let mut buf = Vec::new();
        let err = encode_scalar(ScalarKind::Int32, &Value::Int(1 << 31), &mut buf).unwrap_err();
        assert!(matches!(err, TypeEncodeError::OutOfRange { scalar: "int32", .. }));

        let err = encode_scalar(ScalarKind::UInt32, &Value::Int(-1), &mut buf).unwrap_err();
        assert!(matches!(err, TypeEncodeError::OutOfRange { .. }));

        let err = encode_scalar(ScalarKind::Int32, &Value::from("nope"), &mut buf).unwrap_err();
        assert!(matches!(err, TypeEncodeError::WrongShape { .. }));
    }

    #[test]
    fn test_enum_resolution() {
        let props = EnumProps::new("Month")
            .with_symbol("UNKNOWN", 0)
            .with_symbol("JANUARY", 2);

        let mut buf = Vec::new();
        encode_enum(&props, &Value::Sym("JANUARY".into()), &mut buf).unwrap();
        assert_eq!(buf, [0x02]);

        // Raw integers pass through without a table hit.
        buf.clear();
        encode_enum(&props, &Value::Int(7), &mut buf).unwrap();
        assert_eq!(buf, [0x07]);

        let err = encode_enum(&props, &Value::Sym("SMARCH".into()), &mut buf).unwrap_err();
        assert!(matches!(err, TypeEncodeError::UnknownEnumSymbol { .. }));
    }

    #[test]
    fn test_scalar_roundtrip() {
        #[track_caller]
        fn roundtrip(kind: ScalarKind, value: Value) {
            let bytes = encoded(kind, value.clone());
            let decoded = decode_scalar(kind, &mut &bytes[..]).unwrap();
            assert_eq!(decoded, value);
        }

        roundtrip(ScalarKind::Int32, Value::Int(-150));
        roundtrip(ScalarKind::Int64, Value::Int(i64::MIN));
        roundtrip(ScalarKind::UInt64, Value::UInt(u64::MAX));
        roundtrip(ScalarKind::Sint32, Value::Int(-2147483648));
        roundtrip(ScalarKind::Sint64, Value::Int(i64::MAX));
        roundtrip(ScalarKind::Bool, Value::Bool(true));
        roundtrip(ScalarKind::Fixed32, Value::UInt(u64::from(u32::MAX)));
        roundtrip(ScalarKind::Sfixed64, Value::Int(-1));
        roundtrip(ScalarKind::Float, Value::Double(1.5));
        roundtrip(ScalarKind::Double, Value::Double(-2.25));
        roundtrip(ScalarKind::String, Value::from("héllo"));
        roundtrip(ScalarKind::Bytes, Value::Bytes(alloc::vec![0, 1, 2]));
    }
}
