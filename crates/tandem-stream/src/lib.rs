//! Stream transport layer for tandem RPC.
//!
//! This crate turns any async byte stream (TCP, Unix sockets, in-memory
//! pipes) into an ordered sequence of framed RPC messages between
//! exactly two parties, and manages the single logical connection that
//! topology implies:
//!
//! - Length-prefixed framing for message boundaries
//! - A write driver that serializes concurrent submissions
//! - An on-demand read pump with clean end-of-stream detection
//! - One shared disconnect signal for all failure paths
//!
//! # Usage
//!
//! Each endpoint wraps its half of an established stream in a
//! [`TwoPartyNetwork`] and spawns the returned [`WriteDriver`]:
//!
//! ```ignore
//! use tandem_stream::{ReceiveOptions, Side, TwoPartyNetwork};
//!
//! let (network, driver) = TwoPartyNetwork::new(stream, Side::Server, ReceiveOptions::default());
//! tokio::spawn(driver.run());
//!
//! let connection = network.accept_connection().await;
//! while let Some(message) = connection.recv().await? {
//!     // hand message.body() to the dispatch layer
//! }
//! ```
//!
//! The client side obtains its handle with
//! [`TwoPartyNetwork::connect_to_peer`] instead; everything else is
//! symmetric. Outgoing messages are built with
//! [`Connection::new_outgoing_message`] and submitted with
//! [`OutgoingMessage::send`], which guarantees wire order matches
//! submission order across any number of concurrent tasks.

#![deny(unsafe_code)]

mod framing;
mod message;
mod network;
mod signal;

pub use framing::LengthPrefixed;
pub use message::{IncomingMessage, OutgoingMessage, SUGGESTED_MESSAGE_CAPACITY};
pub use network::{Accept, Connection, TwoPartyNetwork, WriteDriver};
pub use signal::Signal;

// Re-export core types for convenience
pub use tandem_core::{
    FrameError, MessageCodec, ReceiveOptions, RecvError, SendError, Side,
};

// Re-export tokio IO traits for convenience
pub use tokio::io::{AsyncRead, AsyncWrite};
