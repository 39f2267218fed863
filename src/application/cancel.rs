//! Cooperative cancellation
//!
//! The CLI wires Ctrl+C to a `CancelToken`. The deploy pipeline only looks
//! at it before the apply starts; once host changes begin the run is allowed
//! to finish (or end as a partial sync).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
