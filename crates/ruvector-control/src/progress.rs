//! Periodic progress reporting.
//!
//! [`ProgressReporter::run_while`] runs a unit of work on the calling thread
//! while a scoped background thread samples progress immediately and then once
//! per interval. The sampler only reads atomics, so it never stalls the
//! workers; a sample can be up to one interval stale.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::events::ControlEvent;
use crate::traits::ControlObserver;

/// Default time between progress samples.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(30);

/// Emits progress samples while work is running.
#[derive(Debug, Clone, Copy)]
pub struct ProgressReporter {
    interval: Duration,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}

impl ProgressReporter {
    /// A zero interval reports once at start and never again.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Run `work` to completion while reporting `sample()` to `observer`.
    ///
    /// The reporter thread is stopped and joined before this returns, also
    /// when `work` panics.
    pub fn run_while<R>(
        &self,
        observer: &dyn ControlObserver,
        sample: &(dyn Fn() -> ControlEvent + Sync),
        work: impl FnOnce() -> R,
    ) -> R {
        if self.interval.is_zero() {
            observer.on_event(&sample());
            return work();
        }

        let interval = self.interval;
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        thread::scope(|scope| {
            scope.spawn(move || {
                let mut reports = 0u64;
                loop {
                    observer.on_event(&sample());
                    reports += 1;
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!(reports, "progress reporter stopped");
            });
            let out = work();
            drop(stop_tx);
            out
        })
    }
}
