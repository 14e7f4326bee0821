//! tandem-core: Core types and traits for the tandem two-party RPC transport.
//!
//! This crate defines:
//! - The endpoint role enum ([`Side`])
//! - Receive limits ([`ReceiveOptions`])
//! - The message codec seam ([`MessageCodec`])
//! - Error types ([`RecvError`], [`FrameError`], [`SendError`])

#![deny(unsafe_code)]

mod codec;
mod error;
mod options;
mod side;

pub use codec::*;
pub use error::*;
pub use options::*;
pub use side::*;
