//! Packed repeated field emission.
//!
//! A packed field is a single `Len` record: the field key, a varint byte
//! length, then the concatenated element payloads with no per-element keys.

use alloc::vec::Vec;

use crate::codec::ElementCodec;
use crate::error::TypeEncodeError;
use crate::leb128::LebCodec;
use crate::props::FieldProps;
use crate::value::Value;

/// Emit `field`'s key followed by the length-prefixed concatenation of all
/// element payloads. Element order is preserved.
pub(crate) fn encode_packed<B: bytes::BufMut>(
    field: &FieldProps,
    codec: &ElementCodec<'_>,
    elements: &[Value],
    buf: &mut B,
) -> Result<(), TypeEncodeError> {
    let mut payload = Vec::new();
    for element in elements {
        codec.encode(element, &mut payload)?;
    }

    buf.put_slice(&field.encoded_fnum);
    (payload.len() as u64).encode_leb128(buf);
    buf.put_slice(&payload);
    Ok(())
}
