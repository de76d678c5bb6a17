//! Minimum driver-set search over subsets of the source nodes.
//!
//! Given the rank `r*` reached by the full source set, the engine looks for
//! the smallest subset whose structural rank is also `r*`. Candidates are
//! subset masks (see [`crate::subset`]) and are pruned before any matrix is
//! built:
//!
//! | Rule | Skip when |
//! |------|-----------|
//! | Window | size outside `[minimum, maximum]` |
//! | Empty | size is 0 |
//! | Best | size >= size of the best solution known so far |
//!
//! The best solution is a single [`AtomicU64`] mask updated by
//! compare-and-swap, so its size is always the popcount of the stored mask
//! and readers never block. It starts as the full source set, which also
//! serves as the answer when nothing smaller qualifies.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::cancel::CancellationToken;
use crate::error::{ControlError, ValidationError};
use crate::events::ControlEvent;
use crate::index::NodeIndex;
use crate::matrix::source_from_indices;
use crate::progress::ProgressReporter;
use crate::rank::{StructuralRankEstimator, TrialSet};
use crate::subset::{self, SubsetMask};
use crate::traits::ControlObserver;
use crate::types::{EnumerationOrder, SubsetBounds};

// ---------------------------------------------------------------------------
// SearchWindow
// ---------------------------------------------------------------------------

/// Admissible subset sizes and the number of candidates they contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    /// Smallest subset size worth evaluating.
    pub minimum: usize,
    /// Largest subset size worth evaluating.
    pub maximum: usize,
    /// Number of subsets with a size in `[minimum, maximum]`.
    pub total: u64,
}

impl SearchWindow {
    /// Derive the window for `source_count` sources.
    ///
    /// With [`SubsetBounds::Window`] the lower bound is
    /// `ceil(maximum_rank / (path_length + 1))`: one source contributes at
    /// most `L + 1` independent columns to the controllability matrix.
    pub fn new(
        bounds: SubsetBounds,
        maximum_rank: usize,
        path_length: usize,
        source_count: usize,
    ) -> Self {
        let minimum = match bounds {
            SubsetBounds::Window => maximum_rank.div_ceil(path_length + 1),
            SubsetBounds::Unbounded => 0,
        };
        let maximum = source_count;
        Self {
            minimum,
            maximum,
            total: subset::count_in_window(source_count, minimum, maximum),
        }
    }

    #[inline]
    pub fn contains(&self, size: usize) -> bool {
        (self.minimum..=self.maximum).contains(&size)
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Counters shared by all workers and read by the progress reporter.
#[derive(Debug)]
struct SearchState {
    best: AtomicU64,
    checked: AtomicU64,
}

impl SearchState {
    fn new(initial: SubsetMask) -> Self {
        Self {
            best: AtomicU64::new(initial),
            checked: AtomicU64::new(0),
        }
    }

    #[inline]
    fn best(&self) -> SubsetMask {
        self.best.load(Ordering::Acquire)
    }

    #[inline]
    fn best_size(&self) -> usize {
        subset::size(self.best())
    }

    #[inline]
    fn checked(&self) -> u64 {
        self.checked.load(Ordering::Relaxed)
    }

    /// Replace the best mask with `candidate` if it is strictly smaller.
    ///
    /// Returns `true` if this call installed `candidate`.
    fn try_promote(&self, candidate: SubsetMask) -> bool {
        let size = subset::size(candidate);
        let mut current = self.best.load(Ordering::Acquire);
        loop {
            if size >= subset::size(current) {
                return false;
            }
            match self.best.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SearchOutcome
// ---------------------------------------------------------------------------

/// Result of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Smallest qualifying subset found (the full set if none was smaller).
    pub best: SubsetMask,
    /// Candidates in the window that were dispatched (evaluated or pruned).
    pub checked: u64,
    /// Candidates in the window.
    pub total: u64,
    /// Whether the search stopped on a cancellation request.
    pub cancelled: bool,
    /// Wall time spent searching.
    pub elapsed: Duration,
}

impl SearchOutcome {
    /// Number of sources in the best subset.
    pub fn best_size(&self) -> usize {
        subset::size(self.best)
    }
}

/// Why a parallel dispatch stopped early.
#[cfg(feature = "parallel")]
enum Halt {
    Cancelled,
    Failed(ControlError),
}

/// How candidates are dispatched.
enum Executor {
    Sequential,
    #[cfg(feature = "parallel")]
    Pool(rayon::ThreadPool),
}

// ---------------------------------------------------------------------------
// SubsetSearchEngine
// ---------------------------------------------------------------------------

/// Brute-force admissible search for a minimum controlling subset.
pub struct SubsetSearchEngine<'a> {
    trials: &'a TrialSet,
    sources: &'a [String],
    source_nodes: Vec<usize>,
    node_count: usize,
    maximum_rank: usize,
    window: SearchWindow,
    order: EnumerationOrder,
    parallelism: usize,
    progress: ProgressReporter,
}

impl<'a> SubsetSearchEngine<'a> {
    /// Create an engine over `sources`, evaluated against `trials`.
    ///
    /// Defaults: natural enumeration order, sequential execution, progress
    /// every 30 seconds.
    pub fn new(
        index: &NodeIndex,
        sources: &'a [String],
        trials: &'a TrialSet,
        maximum_rank: usize,
        window: SearchWindow,
    ) -> Result<Self, ValidationError> {
        if sources.len() > subset::MAX_SOURCE_NODES {
            return Err(ValidationError::TooManySourceNodes {
                count: sources.len(),
                max: subset::MAX_SOURCE_NODES,
            });
        }
        let source_nodes = sources
            .iter()
            .map(|s| index.resolve(s, "source"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            trials,
            sources,
            source_nodes,
            node_count: index.len(),
            maximum_rank,
            window,
            order: EnumerationOrder::default(),
            parallelism: 1,
            progress: ProgressReporter::default(),
        })
    }

    pub fn with_order(mut self, order: EnumerationOrder) -> Self {
        self.order = order;
        self
    }

    /// Number of workers; `1` runs a plain sequential loop.
    pub fn with_parallelism(mut self, workers: usize) -> Self {
        self.parallelism = workers.max(1);
        self
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Labels of the sources selected by `mask`, in source-list order.
    pub fn labels(&self, mask: SubsetMask) -> Vec<String> {
        subset::members(mask)
            .map(|i| self.sources[i].clone())
            .collect()
    }

    /// Structural rank of the subset selected by `mask`.
    pub fn rank_of(&self, mask: SubsetMask) -> Result<usize, ControlError> {
        let nodes: Vec<usize> = subset::members(mask)
            .map(|i| self.source_nodes[i])
            .collect();
        let b = source_from_indices(self.node_count, &nodes);
        StructuralRankEstimator::new(self.trials).estimate(&b)
    }

    /// Run the search to completion or until `cancel` fires.
    ///
    /// Cancellation is not an error: the outcome carries the best subset
    /// found so far with `cancelled = true`.
    #[instrument(
        skip_all,
        fields(
            sources = self.sources.len(),
            order = %self.order,
            parallelism = self.parallelism,
        )
    )]
    pub fn run(
        &self,
        observer: &dyn ControlObserver,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, ControlError> {
        let k = self.sources.len();
        let state = SearchState::new(subset::full(k));
        let executor = self.executor()?;
        let started = Instant::now();

        info!(
            minimum = self.window.minimum,
            maximum = self.window.maximum,
            total = self.window.total,
            "searching for a minimum controlling subset"
        );

        let sample = || ControlEvent::SearchProgress {
            checked: state.checked(),
            total: self.window.total,
            elapsed: started.elapsed(),
            best_size: state.best_size(),
        };
        let cancelled = self.progress.run_while(observer, &sample, || match self.order {
            EnumerationOrder::Natural => {
                self.dispatch(&executor, 0..=subset::full(k), &state, observer, cancel)
            }
            EnumerationOrder::SizeAscending => {
                self.run_by_size(&executor, &state, observer, cancel)
            }
        })?;

        let outcome = SearchOutcome {
            best: state.best(),
            checked: state.checked(),
            total: self.window.total,
            cancelled,
            elapsed: started.elapsed(),
        };
        if cancelled {
            warn!(checked = outcome.checked, "search cancelled");
            observer.on_event(&ControlEvent::SearchCancelled {
                checked: outcome.checked,
                elapsed: outcome.elapsed,
            });
        }
        Ok(outcome)
    }

    /// Visit size levels smallest first, stopping once a level cannot
    /// improve on the best solution.
    fn run_by_size(
        &self,
        executor: &Executor,
        state: &SearchState,
        observer: &dyn ControlObserver,
        cancel: &CancellationToken,
    ) -> Result<bool, ControlError> {
        let k = self.sources.len();
        let last = self.window.maximum.min(k);
        for s in self.window.minimum..=last {
            if s > 0 && s >= state.best_size() {
                // Every remaining level is pruned wholesale.
                let skipped = subset::count_in_window(k, s, last);
                state.checked.fetch_add(skipped, Ordering::Relaxed);
                debug!(size = s, skipped, "remaining size levels pruned");
                break;
            }
            if self.dispatch(executor, subset::masks_of_size(k, s), state, observer, cancel)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Feed `masks` to the executor. Returns `true` if cancelled.
    fn dispatch<I>(
        &self,
        executor: &Executor,
        masks: I,
        state: &SearchState,
        observer: &dyn ControlObserver,
        cancel: &CancellationToken,
    ) -> Result<bool, ControlError>
    where
        I: Iterator<Item = SubsetMask> + Send,
    {
        match executor {
            Executor::Sequential => {
                for mask in masks {
                    if cancel.is_cancelled() {
                        return Ok(true);
                    }
                    self.visit(mask, state, observer)?;
                }
                Ok(false)
            }
            #[cfg(feature = "parallel")]
            Executor::Pool(pool) => {
                use rayon::prelude::*;

                let result = pool.install(|| {
                    masks.par_bridge().try_for_each(|mask| {
                        if cancel.is_cancelled() {
                            return Err(Halt::Cancelled);
                        }
                        self.visit(mask, state, observer).map_err(Halt::Failed)
                    })
                });
                match result {
                    Ok(()) => Ok(false),
                    Err(Halt::Cancelled) => Ok(true),
                    Err(Halt::Failed(e)) => Err(e),
                }
            }
        }
    }

    /// Process one candidate.
    fn visit(
        &self,
        mask: SubsetMask,
        state: &SearchState,
        observer: &dyn ControlObserver,
    ) -> Result<(), ControlError> {
        let size = subset::size(mask);
        if !self.window.contains(size) {
            return Ok(());
        }
        let outcome = if size > 0 && size < state.best_size() {
            self.evaluate(mask, state, observer)
        } else {
            Ok(())
        };
        state.checked.fetch_add(1, Ordering::Relaxed);
        outcome
    }

    fn evaluate(
        &self,
        mask: SubsetMask,
        state: &SearchState,
        observer: &dyn ControlObserver,
    ) -> Result<(), ControlError> {
        let rank = self.rank_of(mask)?;
        if rank == self.maximum_rank && state.try_promote(mask) {
            let nodes = self.labels(mask);
            debug!(size = nodes.len(), rank, "best solution improved");
            observer.on_event(&ControlEvent::SolutionImproved {
                size: nodes.len(),
                nodes,
            });
        }
        Ok(())
    }

    fn executor(&self) -> Result<Executor, ControlError> {
        if self.parallelism <= 1 {
            return Ok(Executor::Sequential);
        }
        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.parallelism)
                .thread_name(|i| format!("control-search-{i}"))
                .build()
                .map_err(|e| ControlError::ThreadPool(e.to_string()))?;
            Ok(Executor::Pool(pool))
        }
        #[cfg(not(feature = "parallel"))]
        {
            warn!(
                requested = self.parallelism,
                "built without the `parallel` feature; searching sequentially"
            );
            Ok(Executor::Sequential)
        }
    }
}
