#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod codec;
pub mod error;
pub mod leb128;
pub mod props;
pub mod value;
pub mod wire;
