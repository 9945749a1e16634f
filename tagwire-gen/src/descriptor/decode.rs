//! Hand-rolled decoder for the descriptor subset and the plugin request.

use bytes::Buf;

use tagwire::error::DecodeErrorKind;
use tagwire::leb128::LebCodec;
use tagwire::wire::{decode_key, decode_len, skip_field, WireType};

use super::*;
use crate::plugin::CodeGeneratorRequest;
use crate::Error;

// Tagwire extension field numbers (50001-50099 reserved for tagwire).

/// Extension field number for the `module_prefix` file option.
const EXT_FILE_MODULE_PREFIX: u32 = 50021;

/// Extension field number for the `typespec` message option.
const EXT_MESSAGE_TYPESPEC: u32 = 50022;

fn decode_varint(buf: &mut &[u8]) -> Result<u64, Error> {
    Ok(u64::decode_leb128(buf)?)
}

fn decode_string(buf: &mut &[u8]) -> Result<String, Error> {
    let bytes = take_delimited(buf)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| Error::Decode(DecodeErrorKind::InvalidUtf8))
}

/// Split off a length-delimited payload, advancing past it.
fn take_delimited<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], Error> {
    let len = decode_len(buf)?;
    if buf.remaining() < len {
        return Err(Error::Decode(DecodeErrorKind::UnexpectedEndOfBuffer));
    }
    let (payload, rest) = buf.split_at(len);
    *buf = rest;
    Ok(payload)
}

/// Decode a `CodeGeneratorRequest` from protobuf binary data.
pub fn decode_code_generator_request(data: &[u8]) -> Result<CodeGeneratorRequest, Error> {
    let mut buf = data;
    let mut request = CodeGeneratorRequest::default();

    while buf.has_remaining() {
        let (wire_type, tag) = decode_key(&mut buf)?;
        match tag {
            1 => request.file_to_generate.push(decode_string(&mut buf)?),
            2 => request.parameter = Some(decode_string(&mut buf)?),
            15 => {
                let msg_data = take_delimited(&mut buf)?;
                let mut file = decode_file_descriptor_proto(msg_data)?;
                file.raw = msg_data.to_vec();
                request.proto_file.push(file);
            }
            _ => skip_field(wire_type, &mut buf)?,
        }
    }

    Ok(request)
}

/// Decode a FileDescriptorProto.
fn decode_file_descriptor_proto(data: &[u8]) -> Result<FileDescriptorProto, Error> {
    let mut buf = data;
    let mut fdp = FileDescriptorProto::default();

    while buf.has_remaining() {
        let (wire_type, tag) = decode_key(&mut buf)?;
        match tag {
            1 => fdp.name = Some(decode_string(&mut buf)?),
            2 => fdp.package = Some(decode_string(&mut buf)?),
            3 => fdp.dependency.push(decode_string(&mut buf)?),
            4 => {
                let msg_data = take_delimited(&mut buf)?;
                fdp.message_type.push(decode_descriptor_proto(msg_data)?);
            }
            5 => {
                let msg_data = take_delimited(&mut buf)?;
                fdp.enum_type.push(decode_enum_descriptor_proto(msg_data)?);
            }
            7 => {
                let msg_data = take_delimited(&mut buf)?;
                fdp.extension.push(decode_field_descriptor_proto(msg_data)?);
            }
            8 => {
                let msg_data = take_delimited(&mut buf)?;
                fdp.options = Some(decode_file_options(msg_data)?);
            }
            12 => fdp.syntax = Some(decode_string(&mut buf)?),
            _ => skip_field(wire_type, &mut buf)?,
        }
    }

    Ok(fdp)
}

/// Decode a DescriptorProto (message type).
fn decode_descriptor_proto(data: &[u8]) -> Result<DescriptorProto, Error> {
    let mut buf = data;
    let mut dp = DescriptorProto::default();

    while buf.has_remaining() {
        let (wire_type, tag) = decode_key(&mut buf)?;
        match tag {
            1 => dp.name = Some(decode_string(&mut buf)?),
            2 => {
                let msg_data = take_delimited(&mut buf)?;
                dp.field.push(decode_field_descriptor_proto(msg_data)?);
            }
            3 => {
                let msg_data = take_delimited(&mut buf)?;
                dp.nested_type.push(decode_descriptor_proto(msg_data)?);
            }
            4 => {
                let msg_data = take_delimited(&mut buf)?;
                dp.enum_type.push(decode_enum_descriptor_proto(msg_data)?);
            }
            6 => {
                let msg_data = take_delimited(&mut buf)?;
                dp.extension.push(decode_field_descriptor_proto(msg_data)?);
            }
            7 => {
                let msg_data = take_delimited(&mut buf)?;
                dp.options = Some(decode_message_options(msg_data)?);
            }
            8 => {
                let msg_data = take_delimited(&mut buf)?;
                dp.oneof_decl.push(decode_oneof_descriptor_proto(msg_data)?);
            }
            _ => skip_field(wire_type, &mut buf)?,
        }
    }

    Ok(dp)
}

/// Decode a FieldDescriptorProto.
fn decode_field_descriptor_proto(data: &[u8]) -> Result<FieldDescriptorProto, Error> {
    let mut buf = data;
    let mut fdp = FieldDescriptorProto::default();

    while buf.has_remaining() {
        let (wire_type, tag) = decode_key(&mut buf)?;
        match tag {
            1 => fdp.name = Some(decode_string(&mut buf)?),
            2 => fdp.extendee = Some(decode_string(&mut buf)?),
            3 => fdp.number = Some(decode_varint(&mut buf)? as i32),
            4 => fdp.label = Some(decode_varint(&mut buf)? as i32),
            5 => fdp.r#type = Some(decode_varint(&mut buf)? as i32),
            6 => fdp.type_name = Some(decode_string(&mut buf)?),
            7 => fdp.default_value = Some(decode_string(&mut buf)?),
            8 => {
                let msg_data = take_delimited(&mut buf)?;
                fdp.options = Some(decode_field_options(msg_data)?);
            }
            9 => fdp.oneof_index = Some(decode_varint(&mut buf)? as i32),
            10 => fdp.json_name = Some(decode_string(&mut buf)?),
            _ => skip_field(wire_type, &mut buf)?,
        }
    }

    Ok(fdp)
}

/// Decode FileOptions with tagwire extensions.
fn decode_file_options(data: &[u8]) -> Result<FileOptions, Error> {
    let mut buf = data;
    let mut opts = FileOptions::default();

    while buf.has_remaining() {
        let (wire_type, tag) = decode_key(&mut buf)?;
        match tag {
            EXT_FILE_MODULE_PREFIX => opts.module_prefix = Some(decode_string(&mut buf)?),
            // Skip all standard FileOptions fields.
            _ => skip_field(wire_type, &mut buf)?,
        }
    }

    Ok(opts)
}

/// Decode MessageOptions with tagwire extensions.
fn decode_message_options(data: &[u8]) -> Result<MessageOptions, Error> {
    let mut buf = data;
    let mut opts = MessageOptions::default();

    while buf.has_remaining() {
        let (wire_type, tag) = decode_key(&mut buf)?;
        match tag {
            7 => opts.map_entry = Some(decode_varint(&mut buf)? != 0),
            EXT_MESSAGE_TYPESPEC => opts.typespec = Some(decode_string(&mut buf)?),
            _ => skip_field(wire_type, &mut buf)?,
        }
    }

    Ok(opts)
}

/// Decode FieldOptions.
fn decode_field_options(data: &[u8]) -> Result<FieldOptions, Error> {
    let mut buf = data;
    let mut opts = FieldOptions::default();

    while buf.has_remaining() {
        let (wire_type, tag) = decode_key(&mut buf)?;
        match tag {
            2 => opts.packed = Some(decode_varint(&mut buf)? != 0),
            _ => skip_field(wire_type, &mut buf)?,
        }
    }

    Ok(opts)
}

/// Decode an EnumDescriptorProto.
fn decode_enum_descriptor_proto(data: &[u8]) -> Result<EnumDescriptorProto, Error> {
    let mut buf = data;
    let mut edp = EnumDescriptorProto::default();

    while buf.has_remaining() {
        let (wire_type, tag) = decode_key(&mut buf)?;
        match tag {
            1 => edp.name = Some(decode_string(&mut buf)?),
            2 => {
                let msg_data = take_delimited(&mut buf)?;
                edp.value.push(decode_enum_value_descriptor_proto(msg_data)?);
            }
            _ => skip_field(wire_type, &mut buf)?,
        }
    }

    Ok(edp)
}

/// Decode an EnumValueDescriptorProto.
fn decode_enum_value_descriptor_proto(data: &[u8]) -> Result<EnumValueDescriptorProto, Error> {
    let mut buf = data;
    let mut evdp = EnumValueDescriptorProto::default();

    while buf.has_remaining() {
        let (wire_type, tag) = decode_key(&mut buf)?;
        match tag {
            1 => evdp.name = Some(decode_string(&mut buf)?),
            2 => evdp.number = Some(decode_varint(&mut buf)? as i32),
            _ => skip_field(wire_type, &mut buf)?,
        }
    }

    Ok(evdp)
}

/// Decode a OneofDescriptorProto.
fn decode_oneof_descriptor_proto(data: &[u8]) -> Result<OneofDescriptorProto, Error> {
    let mut buf = data;
    let mut odp = OneofDescriptorProto::default();

    while buf.has_remaining() {
        let (wire_type, tag) = decode_key(&mut buf)?;
        match tag {
            1 => odp.name = Some(decode_string(&mut buf)?),
            _ => skip_field(wire_type, &mut buf)?,
        }
    }

    Ok(odp)
}
