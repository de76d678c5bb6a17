//! Final result record.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::search::{SearchOutcome, SearchWindow};
use crate::types::Solution;

/// Outcome of a controllability run.
///
/// Serialized keys are PascalCase (`NodeCount`, `SolutionNodes`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ControlResult {
    pub node_count: usize,
    pub edge_count: usize,
    pub target_node_count: usize,
    pub source_node_count: usize,
    /// Structural rank reached by the full source set.
    pub maximum_rank: usize,
    /// Lower bound on the solution size used by the search.
    pub minimum_subset_size: usize,
    pub solution_node_count: usize,
    /// Members of the winning subset, in source-list order.
    pub solution_nodes: Vec<String>,
    pub checked_subsets: u64,
    pub total_subsets: u64,
    /// Whether the search stopped early on request.
    pub cancelled: bool,
    /// Wall time from the start of the run.
    pub time_elapsed: Duration,
}

impl ControlResult {
    /// The winning subset as a [`Solution`].
    pub fn solution(&self) -> Solution {
        Solution {
            nodes: self.solution_nodes.clone(),
            size: self.solution_node_count,
            rank: self.maximum_rank,
        }
    }
}

/// Input sizes carried into the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProblemCounts {
    pub nodes: usize,
    pub edges: usize,
    pub targets: usize,
    pub sources: usize,
}

/// Packages counts, the winning subset and timing into a [`ControlResult`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler;

impl ResultAssembler {
    pub fn assemble(
        counts: ProblemCounts,
        window: &SearchWindow,
        outcome: &SearchOutcome,
        solution: Solution,
        elapsed: Duration,
    ) -> ControlResult {
        ControlResult {
            node_count: counts.nodes,
            edge_count: counts.edges,
            target_node_count: counts.targets,
            source_node_count: counts.sources,
            maximum_rank: solution.rank,
            minimum_subset_size: window.minimum,
            solution_node_count: solution.size,
            solution_nodes: solution.nodes,
            checked_subsets: outcome.checked,
            total_subsets: outcome.total,
            cancelled: outcome.cancelled,
            time_elapsed: elapsed,
        }
    }
}
