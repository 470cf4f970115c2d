//! Cancellation primitives
//!
//! An [`AbortController`] owns the right to cancel, an [`AbortSignal`] only
//! observes it. Cancellation is cooperative: aborting flips the signal, and
//! whoever holds the signal is expected to stop at its next suspension point.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Requests cancellation of the operations observing its signal.
#[derive(Debug, Default)]
pub struct AbortController {
    token: CancellationToken,
}

impl AbortController {
    /// Create a new controller in the active state
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Signal paired with this controller
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            token: self.token.clone(),
        }
    }

    /// Abort. Returns `true` only for the call that performed the transition.
    pub fn abort(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.token.cancel();
        true
    }

    /// Check if abort was requested
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Read-only view of an [`AbortController`].
#[derive(Debug, Clone)]
pub struct AbortSignal {
    token: CancellationToken,
}

impl AbortSignal {
    /// Check if abort was requested
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves once the signal is aborted.
    pub fn aborted(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

/// Token-based cancellation handle.
///
/// Kept for callers migrating from token-based cancellation. The client
/// ignores it (and says so); unsubscribe from the observable instead.
#[derive(Debug, Clone)]
pub struct CancelToken {
    token: CancellationToken,
    reason: Arc<Mutex<Option<String>>>,
}

impl CancelToken {
    /// Create a token together with the function that cancels it
    pub fn source() -> CancelTokenSource {
        CancelTokenSource {
            token: CancelToken {
                token: CancellationToken::new(),
                reason: Arc::new(Mutex::new(None)),
            },
        }
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Message passed to [`CancelTokenSource::cancel`], if any
    pub fn reason(&self) -> Option<String> {
        self.reason.lock().clone()
    }
}

/// Pair of a [`CancelToken`] and its cancel operation
#[derive(Debug)]
pub struct CancelTokenSource {
    pub token: CancelToken,
}

impl CancelTokenSource {
    /// Cancel the token with an optional message
    pub fn cancel(&self, reason: Option<String>) {
        if self.token.token.is_cancelled() {
            return;
        }
        *self.token.reason.lock() = reason;
        self.token.token.cancel();
    }
}
