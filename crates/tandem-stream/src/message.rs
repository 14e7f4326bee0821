//! Message envelopes for the two directions of the stream.

use tokio::sync::mpsc;

use tandem_core::SendError;

/// Default capacity reserved for a new outgoing message body (8 KiB).
pub const SUGGESTED_MESSAGE_CAPACITY: usize = 8 * 1024;

/// A mutable outgoing message, owned by its creator until submitted.
///
/// Created by [`Connection::new_outgoing_message`]. The body is built
/// in place, then [`send`](OutgoingMessage::send) moves it into the
/// network's write queue, where it lives until the physical write
/// completes regardless of what the caller does afterwards. Dropping an
/// unsent message has no observable effect.
///
/// [`Connection::new_outgoing_message`]: crate::Connection::new_outgoing_message
pub struct OutgoingMessage {
    body: Vec<u8>,
    queue: mpsc::UnboundedSender<Vec<u8>>,
}

impl OutgoingMessage {
    pub(crate) fn new(queue: mpsc::UnboundedSender<Vec<u8>>, capacity_hint: usize) -> Self {
        let capacity = if capacity_hint == 0 {
            SUGGESTED_MESSAGE_CAPACITY
        } else {
            capacity_hint
        };
        Self {
            body: Vec::with_capacity(capacity),
            queue,
        }
    }

    /// The body built so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Mutable access to the body buffer.
    pub fn body_mut(&mut self) -> &mut Vec<u8> {
        &mut self.body
    }

    /// Replace the body with the given bytes.
    pub fn write_body(&mut self, bytes: &[u8]) {
        self.body.clear();
        self.body.extend_from_slice(bytes);
    }

    /// Submit the message for writing.
    ///
    /// Messages hit the wire in the order `send` was called, across any
    /// number of concurrent submitters. Never blocks: the write itself
    /// happens later on the network's [`WriteDriver`]. A write that
    /// subsequently fails is absorbed there and surfaced through the
    /// network's disconnect signal, not here.
    ///
    /// [`WriteDriver`]: crate::WriteDriver
    pub fn send(self) -> Result<(), SendError> {
        self.queue
            .send(self.body)
            .map_err(|_| SendError::Disconnected)
    }
}

impl std::fmt::Debug for OutgoingMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutgoingMessage")
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// An immutable incoming message, owning its backing buffer.
#[derive(Debug)]
pub struct IncomingMessage {
    body: Vec<u8>,
}

impl IncomingMessage {
    pub(crate) fn new(body: Vec<u8>) -> Self {
        Self { body }
    }

    /// The parsed message body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Take ownership of the body.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}
