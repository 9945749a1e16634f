//! Error types for the tagwire codec.

use alloc::string::String;
use core::fmt;

/// A scalar or enum value that cannot be represented in its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeEncodeError {
    /// The value does not fit the declared scalar's range.
    OutOfRange { scalar: &'static str, value: String },
    /// The dynamic value has the wrong shape for the declared type.
    WrongShape {
        scalar: &'static str,
        found: &'static str,
    },
    /// An enum symbol with no integer mapping.
    UnknownEnumSymbol { enum_name: String, symbol: String },
}

impl fmt::Display for TypeEncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeEncodeError::OutOfRange { scalar, value } => {
                write!(f, "value {value} is out of range for '{scalar}'")
            }
            TypeEncodeError::WrongShape { scalar, found } => {
                write!(f, "cannot encode {found} value as '{scalar}'")
            }
            TypeEncodeError::UnknownEnumSymbol { enum_name, symbol } => {
                write!(f, "enum '{enum_name}' has no symbol '{symbol}'")
            }
        }
    }
}

/// A structural failure while encoding a message value.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// A field's value failed to encode; carries the struct and field names.
    Field {
        message: String,
        field: String,
        source: TypeEncodeError,
    },
    /// A oneof branch that does not belong to the group it was set on.
    OneofMismatch {
        message: String,
        group: String,
        branch: String,
    },
    /// A oneof group whose value is not a `(field, payload)` branch.
    OneofShape { message: String, group: String },
    /// A proto2 required field with no value.
    MissingRequired { message: String, field: String },
    /// An extension value with no registered properties.
    UnknownExtension { module: String, field: String },
    /// A referenced type missing from the registry.
    UnknownType { name: String },
}

impl EncodeError {
    /// Attach message/field context to a scalar-level failure.
    pub(crate) fn field(message: &str, field: &str, source: TypeEncodeError) -> Self {
        EncodeError::Field {
            message: String::from(message),
            field: String::from(field),
            source,
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Field {
                message,
                field,
                source,
            } => {
                write!(f, "failed to encode {message}.{field}: {source}")
            }
            EncodeError::OneofMismatch {
                message,
                group,
                branch,
            } => {
                write!(
                    f,
                    "oneof branch '{branch}' does not belong to group '{group}' of {message}"
                )
            }
            EncodeError::OneofShape { message, group } => {
                write!(
                    f,
                    "oneof group '{group}' of {message} must hold a (field, payload) branch"
                )
            }
            EncodeError::MissingRequired { message, field } => {
                write!(f, "required field {message}.{field} is not set")
            }
            EncodeError::UnknownExtension { module, field } => {
                write!(f, "no properties registered for extension ({module}, {field})")
            }
            EncodeError::UnknownType { name } => {
                write!(f, "no compiled properties registered for '{name}'")
            }
        }
    }
}

/// Failures while decoding wire-format bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeErrorKind {
    InvalidWireType { value: u8 },
    InvalidKey { reason: &'static str },
    InvalidVarInt,
    UnexpectedEndOfBuffer,
    DeprecatedGroupEncoding,
    InvalidUtf8,
    LengthOverflow { value: u64 },
    /// A referenced type missing from the registry.
    UnknownType { name: String },
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::InvalidWireType { value } => {
                write!(f, "invalid 'wire type' value: {value}")
            }
            DecodeErrorKind::InvalidKey { reason } => {
                write!(f, "invalid key: '{reason}'")
            }
            DecodeErrorKind::InvalidVarInt => {
                write!(f, "invalid leb128 varint")
            }
            DecodeErrorKind::UnexpectedEndOfBuffer => {
                write!(f, "unexpected end of buffer")
            }
            DecodeErrorKind::DeprecatedGroupEncoding => {
                write!(f, "deprecated group encoding not supported")
            }
            DecodeErrorKind::InvalidUtf8 => {
                write!(f, "invalid UTF-8 in string field")
            }
            DecodeErrorKind::LengthOverflow { value } => {
                write!(
                    f,
                    "length prefix {value} exceeds platform addressable memory"
                )
            }
            DecodeErrorKind::UnknownType { name } => {
                write!(f, "no compiled properties registered for '{name}'")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TypeEncodeError {}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

#[cfg(feature = "std")]
impl std::error::Error for DecodeErrorKind {}
