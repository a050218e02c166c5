//! Cooperative cancellation shared by capture and playback.
//!
//! One token abstraction with two trigger sources: an explicit stop call
//! (playback's `Stop`, or aborting a capture programmatically), and a
//! distinguished captured input (the Escape release that ends a recording
//! session). Both set the same flag; the owning loop observes it at its
//! next checkpoint.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cloneable cancellation token.
///
/// Clones share the underlying flag, so any holder can cancel and every
/// holder observes it. Cancellation is cooperative: setting the flag does
/// not interrupt an in-flight sleep or dispatch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
