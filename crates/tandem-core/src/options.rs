//! Per-network receive limits.

/// Default cap on a single parsed message (64 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

/// Resource limits applied when parsing incoming messages.
///
/// Fixed per network at construction. A peer that declares a frame
/// larger than `max_message_bytes` is treated as sending malformed
/// data; the limit is enforced before any allocation happens.
#[derive(Debug, Clone, Copy)]
pub struct ReceiveOptions {
    /// Maximum body size of a single incoming message, in bytes.
    pub max_message_bytes: usize,
}

impl Default for ReceiveOptions {
    fn default() -> Self {
        Self {
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl ReceiveOptions {
    /// Set the maximum incoming message body size.
    pub fn max_message_bytes(mut self, limit: usize) -> Self {
        self.max_message_bytes = limit;
        self
    }
}
