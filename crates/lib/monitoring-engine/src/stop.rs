//! Stop signal.

use std::sync::Arc;
use std::time::Duration;

use monitoring_core::Timer;
use tokio::sync::watch;

/// Stops a running engine.
///
/// Stopping is permanent; every wait inside the engine wakes up and exits.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<watch::Sender<bool>>);

impl StopHandle {
    /// Request the engine to stop.
    pub fn stop(&self) {
        self.0.send_replace(true);
    }
}

/// How a wait ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Wake {
    /// The full duration passed.
    Elapsed,

    /// Stop was requested.
    Stopped,
}

impl Wake {
    pub(crate) fn is_stopped(self) -> bool {
        self == Self::Stopped
    }
}

/// The receiving side of the stop signal.
#[derive(Debug, Clone)]
pub(crate) struct StopSignal(watch::Receiver<bool>);

/// Create a connected stop handle and signal.
pub(crate) fn channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle(Arc::new(tx)), StopSignal(rx))
}

impl StopSignal {
    pub(crate) fn is_stopped(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolve once stop is requested.
    pub(crate) async fn stopped(&mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                // The engine is gone, nobody can request a stop anymore.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Sleep on the timer unless stop is requested first.
    pub(crate) async fn sleep<T: Timer>(&mut self, timer: &T, duration: Duration) -> Wake {
        tokio::select! {
            biased;
            () = self.stopped() => Wake::Stopped,
            () = timer.sleep(duration) => Wake::Elapsed,
        }
    }
}
