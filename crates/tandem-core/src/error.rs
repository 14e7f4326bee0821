//! Error types for the two-party transport.
//!
//! The taxonomy follows the disconnect design: a failed physical write
//! is absorbed by the write driver and surfaced only through the
//! network's disconnect signal, so [`SendError`] has no IO variant. A
//! failed read is surfaced to the specific `recv()` caller (and raises
//! the disconnect signal for everyone else).

use std::io;

/// Malformed-frame taxonomy for the length-prefixed codec.
#[derive(Debug)]
pub enum FrameError {
    /// The declared frame length exceeds the configured receive limit.
    TooLarge {
        /// Declared body length.
        len: usize,
        /// Configured `max_message_bytes`.
        limit: usize,
    },
    /// The stream ended in the middle of a frame.
    TruncatedFrame {
        /// Bytes still expected when EOF was hit.
        missing: usize,
    },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::TooLarge { len, limit } => {
                write!(f, "frame of {len} bytes exceeds receive limit of {limit} bytes")
            }
            FrameError::TruncatedFrame { missing } => {
                write!(f, "stream ended mid-frame ({missing} bytes missing)")
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// Error returned to a `recv()` caller.
///
/// Orderly end-of-stream is not an error; it is reported as `Ok(None)`
/// by the read pump.
#[derive(Debug)]
pub enum RecvError {
    /// The underlying stream failed.
    Io(io::Error),
    /// The peer sent a malformed frame.
    Frame(FrameError),
}

impl std::fmt::Display for RecvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecvError::Io(e) => write!(f, "read failed: {e}"),
            RecvError::Frame(e) => write!(f, "malformed frame: {e}"),
        }
    }
}

impl std::error::Error for RecvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecvError::Io(e) => Some(e),
            RecvError::Frame(e) => Some(e),
        }
    }
}

impl From<io::Error> for RecvError {
    fn from(e: io::Error) -> Self {
        RecvError::Io(e)
    }
}

impl From<FrameError> for RecvError {
    fn from(e: FrameError) -> Self {
        RecvError::Frame(e)
    }
}

/// Error submitting an outgoing message.
#[derive(Debug, PartialEq, Eq)]
pub enum SendError {
    /// The write driver is gone; the network has been torn down.
    Disconnected,
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendError::Disconnected => write!(f, "network torn down"),
        }
    }
}

impl std::error::Error for SendError {}
