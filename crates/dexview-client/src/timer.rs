//! Timer seam for the batch window.

use std::time::Duration;

use futures_util::future::BoxFuture;

/// Source of delays for time-windowed dispatch.
///
/// The production implementation defers to tokio's clock; tests drive the
/// same implementation on a paused runtime so no wall-clock time passes.
pub trait Timer: Send + Sync + 'static {
    /// Future that completes after `duration`.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Timer backed by `tokio::time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
