//! Encoding and decoding of dynamic message values.

mod default_check;
mod map;
mod message;
mod oneof;
mod packed;
mod scalar;

pub use message::{decode_message, encode_message, encode_to_vec};
pub use scalar::{decode_scalar, encode_enum, encode_scalar};

pub(crate) use scalar::ElementCodec;
