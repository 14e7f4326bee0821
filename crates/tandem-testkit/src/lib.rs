//! tandem-testkit: shared test plumbing for the two-party transport.
//!
//! Provides connected in-memory network pairs and fault-injecting
//! streams. The cross-crate scenarios live in this crate's `tests/`
//! directory to avoid circular dev-dependencies between `tandem-core`
//! and `tandem-stream`.
//!
//! # Usage
//!
//! ```ignore
//! let (client, server) = tandem_testkit::network_pair(ReceiveOptions::default());
//!
//! let conn = client.network.connect_to_peer(Side::Server).unwrap();
//! let mut msg = conn.new_outgoing_message(0);
//! msg.write_body(b"ping");
//! msg.send().unwrap();
//! ```

#![deny(unsafe_code)]

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadBuf};
use tokio::task::JoinHandle;

use tandem_core::{ReceiveOptions, Side};
use tandem_stream::TwoPartyNetwork;

/// Buffer size for in-memory duplex pipes.
pub const DUPLEX_BUF_SIZE: usize = 64 * 1024;

/// One endpoint of an in-memory network pair.
pub struct TestPeer {
    /// The endpoint's network.
    pub network: TwoPartyNetwork<DuplexStream>,
    /// The spawned write driver. Completes once the network and all
    /// outstanding outgoing messages have been dropped.
    pub driver: JoinHandle<()>,
}

/// Build a connected (client, server) pair over an in-memory duplex
/// pipe, with both write drivers already spawned.
///
/// Must be called from within a tokio runtime.
pub fn network_pair(options: ReceiveOptions) -> (TestPeer, TestPeer) {
    let (client_stream, server_stream) = tokio::io::duplex(DUPLEX_BUF_SIZE);

    let (client, client_driver) = TwoPartyNetwork::new(client_stream, Side::Client, options);
    let (server, server_driver) = TwoPartyNetwork::new(server_stream, Side::Server, options);

    (
        TestPeer {
            network: client,
            driver: tokio::spawn(client_driver.run()),
        },
        TestPeer {
            network: server,
            driver: tokio::spawn(server_driver.run()),
        },
    )
}

/// A stream whose writes always fail and whose reads never complete.
///
/// Used to force the write-failure path deterministically: the first
/// write through a network built on this stream fails mid-driver and
/// must raise the disconnect signal.
#[derive(Debug, Default)]
pub struct BrokenStream;

impl AsyncRead for BrokenStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Pending
    }
}

impl AsyncWrite for BrokenStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "broken test stream",
        )))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
