//! The two-party network: connection lifecycle, write driver, read pump.
//!
//! A [`TwoPartyNetwork`] wraps one established byte stream and is the
//! whole connection state for its endpoint. The stream is split once at
//! construction:
//!
//! - the write half goes to a [`WriteDriver`] task that consumes an
//!   append-only queue of submitted message bodies, so wire order is
//!   submission order and no two writes overlap;
//! - the read half stays behind a mutex and is pulled on demand by
//!   [`Connection::recv`].
//!
//! Every terminal condition (write failure, read EOF, read error) is
//! funneled into one shared disconnect [`Signal`].
//!
//! # Key invariant
//!
//! Only the `WriteDriver` writes to the stream, and only `recv()` reads
//! from it. At most one driver and one read pump exist per network for
//! its entire lifetime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::mpsc;

use tandem_core::{MessageCodec, ReceiveOptions, RecvError, Side};

use crate::framing::LengthPrefixed;
use crate::message::{IncomingMessage, OutgoingMessage};
use crate::signal::Signal;

/// State shared by the network and every connection view of it.
struct Shared<S, C> {
    side: Side,
    options: ReceiveOptions,
    codec: C,
    /// Read half of the stream. Locked for the duration of each read;
    /// the dispatch layer reads sequentially by construction.
    reader: tokio::sync::Mutex<ReadHalf<S>>,
    /// Sender side of the write driver's queue.
    outgoing: mpsc::UnboundedSender<Vec<u8>>,
    disconnect: Signal,
    drained: Signal,
    /// The one drain guard shared by every live peer handle. Upgraded
    /// on each `connect_to_peer` so the drain signal waits for the
    /// last handle, across all calls.
    drain_guard: Mutex<Weak<DrainGuard>>,
    /// Set exactly once, when the server hands out its one connection.
    accepted: AtomicBool,
}

/// Raises the drain signal when the last handle from
/// `connect_to_peer` is dropped.
struct DrainGuard {
    drained: Signal,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        self.drained.raise();
    }
}

/// A network endpoint speaking to exactly one peer over one stream.
///
/// Created with [`TwoPartyNetwork::new`], which also returns the
/// [`WriteDriver`] that must be spawned. Cloning is cheap; all clones
/// are views of the same connection state.
pub struct TwoPartyNetwork<S, C = LengthPrefixed> {
    shared: Arc<Shared<S, C>>,
}

impl<S, C> Clone for TwoPartyNetwork<S, C> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<S, C> std::fmt::Debug for TwoPartyNetwork<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoPartyNetwork")
            .field("side", &self.shared.side)
            .field("disconnected", &self.shared.disconnect.is_raised())
            .finish()
    }
}

/// Result of [`TwoPartyNetwork::try_accept_connection`].
pub enum Accept<S, C = LengthPrefixed> {
    /// The server's one connection.
    Granted(Connection<S, C>),
    /// No connection will ever arrive: either it was already handed
    /// out, or this is the client side.
    Pending,
}

impl<S> TwoPartyNetwork<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Wrap an established stream with the default length-prefixed
    /// codec.
    ///
    /// The returned driver owns the write half of the stream and must
    /// be spawned (`tokio::spawn(driver.run())`) for submitted messages
    /// to reach the wire.
    pub fn new(
        stream: S,
        side: Side,
        options: ReceiveOptions,
    ) -> (Self, WriteDriver<S, LengthPrefixed>) {
        Self::with_codec(stream, side, options, LengthPrefixed)
    }
}

impl<S, C> TwoPartyNetwork<S, C>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
    C: MessageCodec,
{
    /// Wrap an established stream with a custom codec.
    pub fn with_codec(
        stream: S,
        side: Side,
        options: ReceiveOptions,
        codec: C,
    ) -> (Self, WriteDriver<S, C>) {
        let (read_half, write_half) = tokio::io::split(stream);
        let (outgoing, queue) = mpsc::unbounded_channel();
        let disconnect = Signal::new();

        let shared = Arc::new(Shared {
            side,
            options,
            codec: codec.clone(),
            reader: tokio::sync::Mutex::new(read_half),
            outgoing,
            disconnect: disconnect.clone(),
            drained: Signal::new(),
            drain_guard: Mutex::new(Weak::new()),
            accepted: AtomicBool::new(false),
        });

        let driver = WriteDriver {
            writer: write_half,
            codec,
            queue,
            disconnect,
        };

        (Self { shared }, driver)
    }

    /// This endpoint's side.
    pub fn side(&self) -> Side {
        self.shared.side
    }

    /// The receive limits fixed at construction.
    pub fn options(&self) -> &ReceiveOptions {
        &self.shared.options
    }

    /// Get a handle to the peer.
    ///
    /// Returns `None` when `target` is this endpoint's own side: you
    /// cannot connect to yourself. Otherwise always returns a handle to
    /// the one peer connection, no matter how often it is called.
    ///
    /// The network's drain signal is raised once every handle obtained
    /// this way has been dropped.
    pub fn connect_to_peer(&self, target: Side) -> Option<Connection<S, C>> {
        if target == self.shared.side {
            return None;
        }
        let guard = {
            let mut slot = self.shared.drain_guard.lock();
            match slot.upgrade() {
                Some(guard) => guard,
                None => {
                    let guard = Arc::new(DrainGuard {
                        drained: self.shared.drained.clone(),
                    });
                    *slot = Arc::downgrade(&guard);
                    guard
                }
            }
        };
        Some(Connection {
            shared: self.shared.clone(),
            _drain: Some(guard),
        })
    }

    /// Accept the one inbound connection.
    ///
    /// On a server-side network this resolves immediately the first
    /// time, with a view handle whose disposal does not tear the
    /// network down. Every later call, and any call on a client-side
    /// network, never resolves: no further connections can arrive on a
    /// two-party network, and waiters are expected to be cancelled by
    /// outer teardown rather than handed an error.
    pub async fn accept_connection(&self) -> Connection<S, C> {
        match self.try_accept_connection() {
            Accept::Granted(connection) => connection,
            Accept::Pending => std::future::pending().await,
        }
    }

    /// Non-blocking form of [`accept_connection`].
    ///
    /// Returns [`Accept::Pending`] for every case in which
    /// `accept_connection` would never resolve.
    ///
    /// [`accept_connection`]: TwoPartyNetwork::accept_connection
    pub fn try_accept_connection(&self) -> Accept<S, C> {
        if self.shared.side == Side::Server && !self.shared.accepted.swap(true, Ordering::SeqCst) {
            Accept::Granted(Connection {
                shared: self.shared.clone(),
                _drain: None,
            })
        } else {
            Accept::Pending
        }
    }

    /// Resolves once the connection is dead, whichever of write
    /// failure, read error, or orderly end-of-stream happens first.
    pub async fn disconnected(&self) {
        self.shared.disconnect.wait().await
    }

    /// Whether the disconnect signal has been raised.
    pub fn is_disconnected(&self) -> bool {
        self.shared.disconnect.is_raised()
    }

    /// Resolves once every peer handle from [`connect_to_peer`] has
    /// been dropped, for teardown ordering.
    ///
    /// [`connect_to_peer`]: TwoPartyNetwork::connect_to_peer
    pub async fn drained(&self) {
        self.shared.drained.wait().await
    }

    /// Introduce the peer to a third party.
    ///
    /// Three-party introductions are a programming error on a two-party
    /// network; this never returns.
    pub fn introduce_to(&self, _recipient: &Connection<S, C>) -> ! {
        panic!("three-party introductions can never occur on a two-party network");
    }

    /// Connect to a third party we were introduced to. Never returns.
    pub fn connect_to_introduced(&self) -> ! {
        panic!("three-party introductions can never occur on a two-party network");
    }

    /// Accept a connection from an introduced third party. Never
    /// returns.
    pub fn accept_introduced_connection(&self) -> ! {
        panic!("three-party introductions can never occur on a two-party network");
    }
}

/// A view of the single peer relationship.
///
/// Obtained from [`TwoPartyNetwork::connect_to_peer`] or
/// [`TwoPartyNetwork::accept_connection`]. Conceptually this *is* the
/// network; cloning and dropping handles never tears the stream down.
pub struct Connection<S, C = LengthPrefixed> {
    shared: Arc<Shared<S, C>>,
    /// Present on handles from `connect_to_peer`; dropping the last
    /// clone raises the drain signal.
    _drain: Option<Arc<DrainGuard>>,
}

impl<S, C> Clone for Connection<S, C> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            _drain: self._drain.clone(),
        }
    }
}

impl<S, C> std::fmt::Debug for Connection<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("side", &self.shared.side)
            .finish()
    }
}

impl<S, C> Connection<S, C>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
    C: MessageCodec,
{
    /// This endpoint's side.
    pub fn side(&self) -> Side {
        self.shared.side
    }

    /// Allocate a fresh outgoing message.
    ///
    /// `capacity_hint` pre-sizes the body buffer; pass 0 for the
    /// suggested default.
    pub fn new_outgoing_message(&self, capacity_hint: usize) -> OutgoingMessage {
        OutgoingMessage::new(self.shared.outgoing.clone(), capacity_hint)
    }

    /// Pull the next incoming message off the stream.
    ///
    /// - `Ok(Some(message))`: the next parsed message.
    /// - `Ok(None)`: the peer closed the stream in an orderly way. The
    ///   disconnect signal is raised; this is not an error.
    /// - `Err(_)`: IO failure or malformed frame. The disconnect signal
    ///   is raised and the error goes to this caller alone.
    ///
    /// Dropping the returned future is harmless. Callers are expected
    /// not to issue overlapping reads; the dispatch layer above
    /// processes messages sequentially by construction.
    pub async fn recv(&self) -> Result<Option<IncomingMessage>, RecvError> {
        let mut reader = self.shared.reader.lock().await;
        match self
            .shared
            .codec
            .read_message(&mut *reader, &self.shared.options)
            .await
        {
            Ok(Some(body)) => Ok(Some(IncomingMessage::new(body))),
            Ok(None) => {
                self.shared.disconnect.raise();
                Ok(None)
            }
            Err(e) => {
                tracing::debug!(side = %self.shared.side, error = %e, "read failed");
                self.shared.disconnect.raise();
                Err(e)
            }
        }
    }

    /// Resolves once the connection is dead.
    pub async fn disconnected(&self) {
        self.shared.disconnect.wait().await
    }

    /// Whether the disconnect signal has been raised.
    pub fn is_disconnected(&self) -> bool {
        self.shared.disconnect.is_raised()
    }
}

/// The dedicated writer task for one network.
///
/// Consumes submitted message bodies in queue order and writes them one
/// at a time, so no two writes interleave. Must be spawned by the
/// caller; dropping it instead makes every later submission return
/// [`SendError::Disconnected`](tandem_core::SendError).
pub struct WriteDriver<S, C = LengthPrefixed> {
    writer: WriteHalf<S>,
    codec: C,
    queue: mpsc::UnboundedReceiver<Vec<u8>>,
    disconnect: Signal,
}

impl<S, C> WriteDriver<S, C>
where
    S: AsyncWrite + Send + 'static,
    C: MessageCodec,
{
    /// Run until the network and all outstanding outgoing messages are
    /// dropped.
    ///
    /// A failed write is absorbed here: it raises the disconnect signal
    /// (first failure only) and the driver keeps consuming the queue.
    /// Later writes fail against the same broken stream without firing
    /// a second disconnect, and no submitter ever sees the error
    /// directly.
    pub async fn run(mut self) {
        while let Some(body) = self.queue.recv().await {
            if let Err(e) = self.codec.write_message(&mut self.writer, &body).await {
                tracing::debug!(error = %e, "write failed");
                self.disconnect.raise();
            }
        }
    }
}

impl<S, C> std::fmt::Debug for WriteDriver<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteDriver")
            .field("disconnected", &self.disconnect.is_raised())
            .finish()
    }
}
