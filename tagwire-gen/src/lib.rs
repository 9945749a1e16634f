//! `tagwire-gen` is a `protoc` plugin that compiles `.proto` descriptors into
//! Rust modules building [`tagwire`] property tables.
//!
//! `protoc` invokes the `protoc-gen-tagwire` binary with a binary
//! [`CodeGeneratorRequest`](plugin::CodeGeneratorRequest) on stdin; the
//! plugin answers with a `CodeGeneratorResponse` carrying one generated
//! module per requested file. A generated module exposes:
//!
//! * `registry()`: a [`tagwire::props::TypeRegistry`] holding the compiled
//!   `MessageProps`/`EnumProps` for every type declared in the file,
//! * `TYPES`: the mapping from proto-qualified names to target type names
//!   (value wrappers appear under their unwrapped alias),
//! * `FILE_DESCRIPTOR`: the raw descriptor bytes, when requested with
//!   `gen_descriptors=true`.
//!
//! # Parameters
//!
//! The `protoc` parameter string is a comma separated option list:
//! `plugins=grpc`, `gen_descriptors=true`, `using_value_wrappers=true`.
//! Unknown options are ignored.

pub mod codegen;
pub mod config;
pub mod context;
pub mod descriptor;
mod error;
pub mod plugin;

pub use codegen::generate;
pub use config::Config;
pub use error::Error;
