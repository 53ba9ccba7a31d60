//! Cooperative cancellation and depth progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable cancellation flag shared between a caller and a running parse.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Receives the recursion depth each time the parser descends.
///
/// Called from worker threads, possibly concurrently.
pub trait DepthObserver: Send + Sync {
    fn on_depth(&self, depth: usize);
}

impl<F> DepthObserver for F
where
    F: Fn(usize) + Send + Sync,
{
    fn on_depth(&self, depth: usize) {
        self(depth)
    }
}
