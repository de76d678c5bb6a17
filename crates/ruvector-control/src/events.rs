//! Events emitted during a controllability run.
//!
//! The run reports everything it wants a caller to see as a [`ControlEvent`]
//! through a [`ControlObserver`](crate::traits::ControlObserver): validation
//! failures, the achievable rank, live progress, improvements of the best
//! solution, cancellation, and completion. [`EventLog`] records them in
//! memory for inspection.

use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::traits::ControlObserver;
use crate::types::Parameters;

/// Events emitted during a run.
///
/// Tagged with `#[serde(tag = "type")]` so they serialise as
/// `{ "type": "SearchProgress", ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlEvent {
    /// Inputs were accepted and the run is starting.
    RunStarted {
        nodes: usize,
        edges: usize,
        targets: usize,
        sources: usize,
        parameters: Parameters,
    },

    /// One precondition failed. Emitted once per violation.
    ValidationFailed {
        /// Human-readable reason.
        reason: String,
    },

    /// The rank of the full source set and the search window derived from it.
    MaximumRankComputed {
        maximum_rank: usize,
        minimum_subset_size: usize,
        maximum_subset_size: usize,
        total_subsets: u64,
    },

    /// Periodic progress sample.
    SearchProgress {
        /// Candidates dispatched so far.
        checked: u64,
        /// Candidates in the size window.
        total: u64,
        /// Wall time since the search began.
        elapsed: Duration,
        /// Size of the best solution known at sampling time.
        best_size: usize,
    },

    /// A strictly smaller subset reaching the maximum rank was found.
    SolutionImproved { size: usize, nodes: Vec<String> },

    /// The search stopped on a cancellation request.
    SearchCancelled { checked: u64, elapsed: Duration },

    /// The run produced its result.
    RunFinished {
        solution_size: usize,
        elapsed: Duration,
    },
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted {
                nodes,
                edges,
                targets,
                sources,
                ..
            } => write!(
                f,
                "starting search over {nodes} node(s), {edges} edge(s), {targets} target(s) and {sources} source(s)"
            ),
            Self::ValidationFailed { reason } => write!(f, "{reason}"),
            Self::MaximumRankComputed {
                maximum_rank,
                minimum_subset_size,
                maximum_subset_size,
                total_subsets,
            } => write!(
                f,
                "maximum rank {maximum_rank}; checking {total_subsets} subset(s) of size {minimum_subset_size} to {maximum_subset_size}"
            ),
            Self::SearchProgress {
                checked,
                total,
                elapsed,
                best_size,
            } => write!(
                f,
                "{checked} / {total} subset(s) checked in {elapsed:.1?} with a best solution size of {best_size}."
            ),
            Self::SolutionImproved { size, nodes } => {
                write!(f, "found a solution of size {size}: {}", nodes.join(", "))
            }
            Self::SearchCancelled { checked, elapsed } => write!(
                f,
                "search cancelled after {checked} subset(s) in {elapsed:.1?}"
            ),
            Self::RunFinished {
                solution_size,
                elapsed,
            } => write!(
                f,
                "finished in {elapsed:.1?} with a solution of size {solution_size}"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Observer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ControlEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events recorded so far, in emission order.
    pub fn snapshot(&self) -> Vec<ControlEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl ControlObserver for EventLog {
    fn on_event(&self, event: &ControlEvent) {
        self.events.lock().push(event.clone());
    }
}
