//! Cancellable fixed-interval refresh tasks.
//!
//! A [`RefreshTask`] owns a spawned tokio task that runs a tick closure once
//! per period. The first tick fires one full period after start. Stopping
//! (or dropping) the handle cancels the task; a tick already awaiting the
//! network is abandoned at its next suspension point.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Handle to a running refresh loop.
#[derive(Debug)]
pub struct RefreshTask {
    name: &'static str,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RefreshTask {
    /// Spawn a loop calling `tick` every `period` until it returns
    /// `ControlFlow::Break` or the handle is stopped.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer.tick().await; // Skip first immediate tick

            loop {
                tokio::select! {
                    () = token.cancelled() => {
                        debug!(task = name, "Refresh task cancelled");
                        return;
                    }
                    _ = timer.tick() => {
                        debug!(task = name, "Refresh tick");
                        let flow = tokio::select! {
                            () = token.cancelled() => return,
                            flow = tick() => flow,
                        };
                        if flow.is_break() {
                            info!(task = name, "Refresh task finished");
                            return;
                        }
                    }
                }
            }
        });
        debug!(task = name, period_ms = period.as_millis(), "Refresh task started");
        Self {
            name,
            cancel,
            handle,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the loop is still scheduled.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }

    #[cfg(test)]
    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the loop.
    pub fn stop(self) {
        self.cancel.cancel();
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
