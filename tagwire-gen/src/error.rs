//! Error types for tagwire-gen.

use std::io;

use tagwire::error::{DecodeErrorKind, EncodeError};

/// Errors that can occur while driving code generation.
#[derive(Debug)]
pub enum Error {
    /// IO error on stdin/stdout.
    Io(io::Error),
    /// Malformed request or descriptor byte stream.
    Decode(DecodeErrorKind),
    /// The response failed to encode.
    Encode(EncodeError),
    /// Missing name field in a descriptor.
    MissingName,
    /// Missing field number.
    MissingFieldNumber,
    /// Invalid field type.
    InvalidFieldType(i32),
    /// Invalid label.
    InvalidLabel(i32),
    /// A file in `file_to_generate` without a matching descriptor.
    UnknownFile(String),
    /// Generated tokens failed to parse for formatting.
    Render(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Decode(e) => write!(f, "failed to decode request: {}", e),
            Self::Encode(e) => write!(f, "failed to encode response: {}", e),
            Self::MissingName => write!(f, "missing name in descriptor"),
            Self::MissingFieldNumber => write!(f, "missing field number in descriptor"),
            Self::InvalidFieldType(t) => write!(f, "invalid field type: {} (expected 1-18)", t),
            Self::InvalidLabel(l) => write!(f, "invalid field label: {} (expected 1-3)", l),
            Self::UnknownFile(name) => {
                write!(f, "file '{}' was requested but carries no descriptor", name)
            }
            Self::Render(msg) => write!(f, "failed to parse generated code: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<DecodeErrorKind> for Error {
    fn from(e: DecodeErrorKind) -> Self {
        Self::Decode(e)
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

impl From<syn::Error> for Error {
    fn from(e: syn::Error) -> Self {
        Self::Render(e.to_string())
    }
}
