//! Wire format framing for Google's Protocol Buffers, aka
//! [protobuf](https://protobuf.dev).

use crate::error::DecodeErrorKind;
use crate::leb128::LebCodec;

/// Minimum value of a protobuf tag.
pub const MINIMUM_TAG_VAL: u32 = 1;
/// Maximum value of a protobuf tag.
pub const MAXIMUM_TAG_VAL: u32 = (1 << 29) - 1;

/// Denotes the framing of a field in an encoded protobuf message.
///
/// Protobuf messages are a series of key-value records. Each record starts
/// with a key combining a field number and a [`WireType`]; the wire type
/// indicates how large the following payload is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable length integer.
    ///
    /// Used for: `int32`, `int64`, `uint32`, `uint64`, `sint32`, `sint64`,
    /// `bool`, `enum`.
    Varint = 0,
    /// 64-bit integer.
    ///
    /// Used for: `fixed64`, `sfixed64`, `double`.
    I64 = 1,
    /// Variable length field.
    ///
    /// Used for: `string`, `bytes`, embedded messages, packed `repeated`
    /// fields.
    Len = 2,
    /// Group start (deprecated).
    SGroup = 3,
    /// Group end (deprecated).
    EGroup = 4,
    /// 32-bit integer.
    ///
    /// Used for: `fixed32`, `sfixed32`, `float`.
    I32 = 5,
}

impl WireType {
    /// Try to decode a [`WireType`] from the provided raw value.
    pub fn try_from_val(value: u8) -> Result<Self, DecodeErrorKind> {
        Ok(match value {
            0 => WireType::Varint,
            1 => WireType::I64,
            2 => WireType::Len,
            3 => WireType::SGroup,
            4 => WireType::EGroup,
            5 => WireType::I32,
            other => return Err(DecodeErrorKind::InvalidWireType { value: other }),
        })
    }

    /// Return the raw value for this [`WireType`].
    #[inline(always)]
    pub const fn into_val(self) -> u8 {
        self as u8
    }
}

/// Encodes the provided tag and wire type as a protobuf field key.
///
/// Follows the specification from <https://protobuf.dev/programming-guides/encoding>
/// under the "Message Structure" section.
#[inline(always)]
pub fn encode_key<B: bytes::BufMut>(wire_type: WireType, tag: u32, buf: &mut B) {
    let key = (tag << 3) | u32::from(wire_type.into_val());
    key.encode_leb128(buf);
}

/// Decodes the key from a protobuf encoded message.
///
/// Keys always fit in a `u32`: the max tag is `2^29 - 1`, so the max key is
/// `(2^29 - 1) << 3 | 7` which is exactly `u32::MAX`.
#[inline]
pub fn decode_key<B: bytes::Buf>(buf: &mut B) -> Result<(WireType, u32), DecodeErrorKind> {
    let raw = u32::decode_leb128(buf)?;
    let wire_type = WireType::try_from_val((raw & 0b111) as u8)?;
    let tag = raw >> 3;
    if tag < MINIMUM_TAG_VAL {
        return Err(DecodeErrorKind::InvalidKey {
            reason: "tag out of range",
        });
    }
    Ok((wire_type, tag))
}

/// Decodes the length prefix for a length-delimited field.
#[inline]
pub fn decode_len<B: bytes::Buf>(buf: &mut B) -> Result<usize, DecodeErrorKind> {
    let len = u64::decode_leb128(buf)?;
    usize::try_from(len).map_err(|_| DecodeErrorKind::LengthOverflow { value: len })
}

/// Skips over a field value based on its wire type.
///
/// Protobuf supports backwards and forwards compatibility by skipping fields
/// we don't know about. We "skip" a field by advancing our buffer past it.
pub fn skip_field<B: bytes::Buf>(wire_type: WireType, buf: &mut B) -> Result<(), DecodeErrorKind> {
    let skip_len = match wire_type {
        WireType::Varint => {
            u64::decode_leb128(buf)?;
            return Ok(());
        }
        WireType::I64 => 8,
        WireType::Len => decode_len(buf)?,
        WireType::I32 => 4,
        WireType::SGroup | WireType::EGroup => {
            return Err(DecodeErrorKind::DeprecatedGroupEncoding);
        }
    };

    if buf.remaining() < skip_len {
        return Err(DecodeErrorKind::UnexpectedEndOfBuffer);
    }
    buf.advance(skip_len);
    Ok(())
}
