//! End-to-end controllability run.
//!
//! ```text
//! validate ─▶ index nodes ─▶ CA-series trials ─▶ rank(full sources)
//!                                                     │
//!              result ◀── subset search ◀── window ◀──┘
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::cancel::CancellationToken;
use crate::error::ControlError;
use crate::events::ControlEvent;
use crate::index::NodeIndex;
use crate::matrix::build_source;
use crate::progress::ProgressReporter;
use crate::rank::{StructuralRankEstimator, TrialSet};
use crate::result::{ControlResult, ProblemCounts, ResultAssembler};
use crate::search::{SearchWindow, SubsetSearchEngine};
use crate::traits::ControlObserver;
use crate::types::{Parameters, Solution};
use crate::validation::collect_violations;

/// In-memory problem description.
///
/// Labels in `edges`, `targets` and `sources` must name entries of `nodes`;
/// this is checked before the run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlProblem {
    pub nodes: Vec<String>,
    /// Directed `(source, target)` pairs.
    pub edges: Vec<(String, String)>,
    pub targets: Vec<String>,
    pub sources: Vec<String>,
    pub parameters: Parameters,
}

impl ControlProblem {
    pub fn counts(&self) -> ProblemCounts {
        ProblemCounts {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            targets: self.targets.len(),
            sources: self.sources.len(),
        }
    }
}

/// Finds a minimum set of source nodes that structurally controls the targets.
#[derive(Debug, Clone)]
pub struct ControlAlgorithm<'a> {
    problem: &'a ControlProblem,
}

impl<'a> ControlAlgorithm<'a> {
    pub fn new(problem: &'a ControlProblem) -> Self {
        Self { problem }
    }

    /// Run the search.
    ///
    /// Returns [`ControlError::InvalidInput`] without computing anything when
    /// a precondition fails; each violation is reported to `observer` first.
    /// A cancelled run is still `Ok`, with `cancelled` set on the result.
    #[instrument(
        skip_all,
        fields(
            nodes = self.problem.nodes.len(),
            sources = self.problem.sources.len(),
            targets = self.problem.targets.len(),
        )
    )]
    pub fn run(
        &self,
        observer: &dyn ControlObserver,
        cancel: &CancellationToken,
    ) -> Result<ControlResult, ControlError> {
        let started = Instant::now();
        let p = self.problem;
        let params = &p.parameters;

        let violations = collect_violations(&p.nodes, &p.edges, &p.targets, &p.sources, params);
        if let Some(first) = violations.first().cloned() {
            for violation in &violations {
                error!(%violation, "rejecting run");
                observer.on_event(&ControlEvent::ValidationFailed {
                    reason: violation.to_string(),
                });
            }
            return Err(first.into());
        }

        observer.on_event(&ControlEvent::RunStarted {
            nodes: p.nodes.len(),
            edges: p.edges.len(),
            targets: p.targets.len(),
            sources: p.sources.len(),
            parameters: params.clone(),
        });

        let index = NodeIndex::new(&p.nodes)?;
        let trials = TrialSet::generate(
            &index,
            &p.edges,
            &p.targets,
            params.path_length(),
            params.trials(),
            params.seed(),
        )?;

        let full = build_source(&index, &p.sources)?;
        let maximum_rank = StructuralRankEstimator::new(&trials).estimate(&full)?;
        let window = SearchWindow::new(
            params.subset_bounds,
            maximum_rank,
            params.path_length(),
            p.sources.len(),
        );
        info!(
            maximum_rank,
            minimum = window.minimum,
            maximum = window.maximum,
            "maximum rank computed"
        );
        observer.on_event(&ControlEvent::MaximumRankComputed {
            maximum_rank,
            minimum_subset_size: window.minimum,
            maximum_subset_size: window.maximum,
            total_subsets: window.total,
        });

        let engine = SubsetSearchEngine::new(&index, &p.sources, &trials, maximum_rank, window)?
            .with_order(params.enumeration_order)
            .with_parallelism(params.parallelism())
            .with_progress(ProgressReporter::new(Duration::from_secs(
                params.progress_interval_seconds,
            )));
        let outcome = engine.run(observer, cancel)?;

        let nodes = engine.labels(outcome.best);
        let solution = Solution {
            size: nodes.len(),
            nodes,
            rank: maximum_rank,
        };
        let result = ResultAssembler::assemble(
            p.counts(),
            &window,
            &outcome,
            solution,
            started.elapsed(),
        );

        info!(
            size = result.solution_node_count,
            checked = result.checked_subsets,
            cancelled = result.cancelled,
            "run finished"
        );
        observer.on_event(&ControlEvent::RunFinished {
            solution_size: result.solution_node_count,
            elapsed: result.time_elapsed,
        });
        Ok(result)
    }
}

/// Run `problem` with the given observer and cancellation token.
pub fn run(
    problem: &ControlProblem,
    observer: &dyn ControlObserver,
    cancel: &CancellationToken,
) -> Result<ControlResult, ControlError> {
    ControlAlgorithm::new(problem).run(observer, cancel)
}
