//! Message codec seam.
//!
//! The framing/serialization codec is an external collaborator of the
//! two-party network. It is consumed through exactly two primitives:
//! parse the next message off the stream, and serialize one message
//! onto it. Abstracting it as a trait lets tests substitute codecs and
//! keeps the network logic independent of the wire shape.

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::{ReceiveOptions, RecvError};

/// A codec that can read and write framed message bodies on a byte
/// stream.
///
/// Implementations must be cheap to clone: the network holds one copy
/// for the read pump and hands one to the write driver.
///
/// # Contract
///
/// `read_message` returns:
/// - `Ok(Some(body))` for the next complete message
/// - `Ok(None)` on orderly end-of-stream at a frame boundary
/// - `Err(_)` on IO failure or a malformed frame (including EOF
///   mid-frame)
pub trait MessageCodec: Clone + Send + Sync + 'static {
    /// Parse the next message body off the stream.
    fn read_message<R>(
        &self,
        reader: &mut R,
        options: &ReceiveOptions,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, RecvError>> + Send
    where
        R: AsyncRead + Unpin + Send;

    /// Serialize one message body onto the stream, flushing it.
    fn write_message<W>(
        &self,
        writer: &mut W,
        body: &[u8],
    ) -> impl Future<Output = io::Result<()>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}
