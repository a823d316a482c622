//! The real timer.

use std::time::Duration;

/// A [`monitoring_core::Timer`] backed by the tokio clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl monitoring_core::Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
