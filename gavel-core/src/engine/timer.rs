//! Cancellable countdown

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::{CancellationToken, DropGuard};

/// A countdown task that runs a callback once unless cancelled first.
///
/// Dropping the timer cancels it, so a discarded handle can never fire.
/// Each timer carries the generation it was armed with; the owner compares
/// generations to recognise expiries that raced with a re-arm.
#[derive(Debug)]
pub struct CancellableTimer {
    generation: u64,
    _guard: DropGuard,
}

impl CancellableTimer {
    /// Arm a countdown that calls `on_expiry` after `duration`
    pub fn start<F, Fut>(generation: u64, duration: Duration, on_expiry: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    tracing::trace!(generation, "Countdown cancelled");
                }
                _ = tokio::time::sleep(duration) => on_expiry().await,
            }
        });

        Self {
            generation,
            _guard: token.drop_guard(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancel the countdown. Has no effect once it has fired.
    pub fn cancel(self) {
        drop(self);
    }
}
