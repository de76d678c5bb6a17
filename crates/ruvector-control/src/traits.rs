//! Observer trait for run reporting.
//!
//! The search never writes anywhere itself; it hands every [`ControlEvent`]
//! to a caller-supplied [`ControlObserver`]. Observers are shared with the
//! progress reporter thread, hence `Send + Sync`.

use tracing::{debug, error, info, warn};

use crate::events::ControlEvent;

/// Receives events from a controllability run.
pub trait ControlObserver: Send + Sync {
    /// Handle one event. Called from the run thread and the progress thread.
    fn on_event(&self, event: &ControlEvent);
}

/// Forwards events to `tracing` at a level matching their importance.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ControlObserver for TracingObserver {
    fn on_event(&self, event: &ControlEvent) {
        match event {
            ControlEvent::ValidationFailed { .. } => error!("{event}"),
            ControlEvent::SearchCancelled { .. } => warn!("{event}"),
            ControlEvent::SolutionImproved { .. } => debug!("{event}"),
            _ => info!("{event}"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ControlObserver for NoopObserver {
    fn on_event(&self, _event: &ControlEvent) {}
}

impl<T: ControlObserver + ?Sized> ControlObserver for &T {
    fn on_event(&self, event: &ControlEvent) {
        (**self).on_event(event)
    }
}

impl<T: ControlObserver + ?Sized> ControlObserver for std::sync::Arc<T> {
    fn on_event(&self, event: &ControlEvent) {
        (**self).on_event(event)
    }
}
