//! One-shot, multi-waiter signals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// A set-once signal that any number of tasks can wait on.
///
/// [`raise`](Signal::raise) is idempotent: the first call fulfills the
/// signal, every later call is a no-op. This makes "fulfill at most
/// once" hold even when multiple failure paths race, with no lock
/// around the fulfiller.
///
/// Cloning is cheap; all clones observe the same signal.
#[derive(Debug, Clone, Default)]
pub struct Signal {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    raised: AtomicBool,
    notify: Notify,
}

impl Signal {
    /// Create an unraised signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal, waking all waiters.
    ///
    /// Only the first call has any effect.
    pub fn raise(&self) {
        if !self.inner.raised.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Whether the signal has been raised.
    pub fn is_raised(&self) -> bool {
        self.inner.raised.load(Ordering::SeqCst)
    }

    /// Wait until the signal is raised.
    ///
    /// Resolves immediately if it already was. Dropping the returned
    /// future has no effect on the signal or on other waiters.
    pub async fn wait(&self) {
        loop {
            if self.is_raised() {
                return;
            }
            let notified = self.inner.notify.notified();
            // Re-check after registering, so a raise() between the
            // check above and notified() cannot be missed.
            if self.is_raised() {
                return;
            }
            notified.await;
        }
    }
}
