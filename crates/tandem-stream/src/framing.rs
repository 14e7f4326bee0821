//! Length-prefixed framing for async streams.
//!
//! Messages are prefixed by a 4-byte little-endian body length. Each
//! frame carries exactly one message body; the body bytes are opaque to
//! this layer.
//!
//! This module is generic over the transport type: it works with any
//! `AsyncRead + AsyncWrite + Unpin` stream, including `TcpStream`,
//! `UnixStream`, or an in-memory duplex pipe.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use tandem_core::{FrameError, MessageCodec, ReceiveOptions, RecvError};

const FRAME_LEN_PREFIX_SIZE: usize = 4;

/// The default `[u32 LE length][body]` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthPrefixed;

/// Fill `buf` completely, distinguishing EOF-before-anything from
/// EOF-mid-read.
///
/// Returns `Ok(false)` when the stream ended cleanly before the first
/// byte, `Ok(true)` when the buffer was filled.
async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> Result<bool, RecvError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(false);
            }
            return Err(FrameError::TruncatedFrame {
                missing: buf.len() - filled,
            }
            .into());
        }
        filled += n;
    }
    Ok(true)
}

impl MessageCodec for LengthPrefixed {
    async fn read_message<R>(
        &self,
        reader: &mut R,
        options: &ReceiveOptions,
    ) -> Result<Option<Vec<u8>>, RecvError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut header = [0u8; FRAME_LEN_PREFIX_SIZE];
        if !read_full(reader, &mut header).await? {
            // Orderly close at a frame boundary.
            return Ok(None);
        }

        let len = u32::from_le_bytes(header) as usize;
        if len > options.max_message_bytes {
            // Enforced before allocating the body buffer.
            return Err(FrameError::TooLarge {
                len,
                limit: options.max_message_bytes,
            }
            .into());
        }

        let mut body = vec![0u8; len];
        if !read_full(reader, &mut body).await? {
            // EOF after the prefix but before any body byte.
            return Err(FrameError::TruncatedFrame { missing: len }.into());
        }
        Ok(Some(body))
    }

    async fn write_message<W>(&self, writer: &mut W, body: &[u8]) -> io::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let len = u32::try_from(body.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "message too large for u32 length prefix",
            )
        })?;

        writer.write_all(&len.to_le_bytes()).await?;
        writer.write_all(body).await?;
        writer.flush().await?;
        Ok(())
    }
}
