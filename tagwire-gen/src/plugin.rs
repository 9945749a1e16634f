//! The `protoc` plugin protocol.
//!
//! `protoc` writes a binary `CodeGeneratorRequest` to the plugin's stdin and
//! expects a binary `CodeGeneratorResponse` on stdout. Both streams are 8-bit
//! transparent. The response is encoded through the tagwire codec itself,
//! against hand-compiled property tables for the two compiler messages.

use std::io::{Read, Write};

use tagwire::codec::encode_to_vec;
use tagwire::props::{FieldProps, FieldType, MessageProps, ScalarKind, Syntax, TypeRegistry};
use tagwire::value::{MessageValue, Value};

use crate::descriptor::{decode_code_generator_request, FileDescriptorProto};
use crate::Error;

/// The request `protoc` hands to a plugin.
/// Corresponds to `google.protobuf.compiler.CodeGeneratorRequest`.
#[derive(Debug, Clone, Default)]
pub struct CodeGeneratorRequest {
    /// The files to generate, relative to the source tree root.
    pub file_to_generate: Vec<String>, // field 1
    /// The generator parameter passed with `--tagwire_opt` or inline.
    pub parameter: Option<String>, // field 2
    /// Every `.proto` file needed to generate, imports included.
    pub proto_file: Vec<FileDescriptorProto>, // field 15
}

impl CodeGeneratorRequest {
    /// Decode a request from protobuf binary data.
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        decode_code_generator_request(data)
    }

    /// Find the descriptor for a requested file name.
    pub fn file(&self, name: &str) -> Option<&FileDescriptorProto> {
        self.proto_file
            .iter()
            .find(|file| file.name.as_deref() == Some(name))
    }
}

/// The response a plugin hands back to `protoc`.
/// Corresponds to `google.protobuf.compiler.CodeGeneratorResponse`.
#[derive(Debug, Clone, Default)]
pub struct CodeGeneratorResponse {
    /// A generator-level error, reported instead of generated files.
    pub error: Option<String>, // field 1
    /// One entry per generated file.
    pub file: Vec<ResponseFile>, // field 15
}

/// A single generated file.
/// Corresponds to `google.protobuf.compiler.CodeGeneratorResponse.File`.
#[derive(Debug, Clone, Default)]
pub struct ResponseFile {
    pub name: String, // field 1
    pub content: String, // field 15
}

const RESPONSE_FILE_TYPE: &str = "google.protobuf.compiler.CodeGeneratorResponse.File";

/// Compiled properties for the response messages, used to encode the reply
/// with the same codec the generated modules drive.
fn response_props() -> (MessageProps, TypeRegistry) {
    let file_props = MessageProps::new("CodeGeneratorResponse::File", Syntax::Proto2)
        .with_field(FieldProps::new(1, "name", FieldType::Scalar(ScalarKind::String)))
        .with_field(FieldProps::new(15, "content", FieldType::Scalar(ScalarKind::String)));

    let props = MessageProps::new("CodeGeneratorResponse", Syntax::Proto2)
        .with_field(FieldProps::new(1, "error", FieldType::Scalar(ScalarKind::String)))
        .with_field(
            FieldProps::new(15, "file", FieldType::Message(RESPONSE_FILE_TYPE.into())).repeated(),
        );

    let mut registry = TypeRegistry::new();
    registry.register_message(RESPONSE_FILE_TYPE, file_props);
    (props, registry)
}

impl CodeGeneratorResponse {
    /// Encode the response to protobuf binary data.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let (props, registry) = response_props();

        let mut value = MessageValue::new();
        if let Some(error) = &self.error {
            value.set("error", error.clone());
        }
        let files: Vec<Value> = self
            .file
            .iter()
            .map(|file| {
                Value::Message(
                    MessageValue::new()
                        .with("name", file.name.clone())
                        .with("content", file.content.clone()),
                )
            })
            .collect();
        if !files.is_empty() {
            value.set("file", Value::List(files));
        }

        Ok(encode_to_vec(&value, &props, &registry)?)
    }
}

/// Drive one plugin invocation: read the request to EOF, generate, write the
/// response.
pub fn run(input: &mut impl Read, output: &mut impl Write) -> Result<(), Error> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;

    let request = CodeGeneratorRequest::decode(&data)?;
    let response = crate::codegen::generate(&request)?;

    output.write_all(&response.encode()?)?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagwire::codec::decode_message;

    #[test]
    fn test_response_encoding_roundtrips() {
        let response = CodeGeneratorResponse {
            error: None,
            file: vec![
                ResponseFile {
                    name: "a.rs".into(),
                    content: "pub fn registry() {}".into(),
                },
                ResponseFile {
                    name: "b.rs".into(),
                    content: String::new(),
                },
            ],
        };

        let bytes = response.encode().unwrap();
        let (props, registry) = response_props();
        let decoded = decode_message(&mut &bytes[..], &props, &registry).unwrap();

        let Some(Value::List(files)) = decoded.get("file") else {
            panic!("expected a file list")
        };
        assert_eq!(files.len(), 2);
        let Value::Message(first) = &files[0] else {
            panic!("expected a message")
        };
        assert_eq!(first.get("name"), Some(&Value::Str("a.rs".into())));
    }

    #[test]
    fn test_error_response() {
        let response = CodeGeneratorResponse {
            error: Some("boom".into()),
            file: Vec::new(),
        };
        let bytes = response.encode().unwrap();
        // field 1, Len, "boom"
        assert_eq!(bytes, [0x0a, 0x04, b'b', b'o', b'o', b'm']);
    }
}
