//! End-to-end scenarios for the controllability run.
//!
//! Covers the hand-checkable networks (a chain, two feeders into a hub, an
//! empty edge list, a full path), sequential determinism, agreement between
//! sequential and parallel execution, and cooperative cancellation.

mod helpers;

use helpers::{edges, labels, path_graph, problem, random_digraph};
use ruvector_control::algorithm::run;
use ruvector_control::cancel::CancellationToken;
use ruvector_control::error::{ControlError, ValidationError};
use ruvector_control::events::{ControlEvent, EventLog};
use ruvector_control::traits::{ControlObserver, NoopObserver};
use ruvector_control::types::{EnumerationOrder, SubsetBounds};
use ruvector_control::ControlProblem;

fn solve(problem: &ControlProblem) -> ruvector_control::ControlResult {
    run(problem, &NoopObserver, &CancellationToken::new()).unwrap()
}

/// Rank reached by `nodes` alone, computed by a fresh run restricted to them.
fn rank_of(problem: &ControlProblem, nodes: &[String]) -> usize {
    let mut restricted = problem.clone();
    restricted.sources = nodes.to_vec();
    solve(&restricted).maximum_rank
}

// ---------------------------------------------------------------------------
// Hand-checkable scenarios
// ---------------------------------------------------------------------------

#[test]
fn chain_is_controlled_by_its_head() {
    let p = problem(
        labels(&["A", "B", "C"]),
        edges(&[("A", "B"), ("B", "C")]),
        labels(&["C"]),
        labels(&["A"]),
        2,
    );
    let result = solve(&p);
    assert_eq!(result.maximum_rank, 1);
    assert_eq!(result.solution_nodes, labels(&["A"]));
    assert_eq!(result.solution_node_count, 1);
    assert_eq!(result.node_count, 3);
    assert_eq!(result.edge_count, 2);
    assert_eq!(result.target_node_count, 1);
    assert_eq!(result.source_node_count, 1);
}

#[test]
fn either_feeder_controls_the_sink() {
    let p = problem(
        labels(&["A", "B", "C", "D"]),
        edges(&[("A", "C"), ("B", "C"), ("C", "D")]),
        labels(&["D"]),
        labels(&["A", "B"]),
        3,
    );
    let result = solve(&p);
    assert_eq!(result.maximum_rank, 1);
    assert_eq!(result.solution_node_count, 1);
    assert!(
        result.solution_nodes == labels(&["A"]) || result.solution_nodes == labels(&["B"]),
        "unexpected solution {:?}",
        result.solution_nodes
    );
}

#[test]
fn empty_edge_list_is_rejected() {
    let p = problem(
        labels(&["A", "B"]),
        Vec::new(),
        labels(&["B"]),
        labels(&["A"]),
        2,
    );
    let log = EventLog::new();
    let err = run(&p, &log, &CancellationToken::new()).unwrap_err();
    assert!(matches!(
        err,
        ControlError::InvalidInput(ValidationError::EmptyInput(ref what)) if what == "edges"
    ));
    let events = log.snapshot();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].to_string(), "the list of edges is empty");
}

#[test]
fn path_head_controls_the_whole_path() {
    let n = 5;
    let (nodes, edges) = path_graph(n);
    let p = problem(nodes.clone(), edges, nodes.clone(), nodes, (n - 1) as i64);
    let result = solve(&p);
    assert_eq!(result.maximum_rank, n);
    // ceil(n / (L + 1)) with L = n - 1.
    assert_eq!(result.minimum_subset_size, 1);
    assert!(result.solution_node_count >= result.minimum_subset_size);
    assert_eq!(result.solution_nodes, labels(&["v0"]));
}

#[test]
fn short_paths_need_more_drivers() {
    // With L = 1 each driver reaches itself and its successor only.
    let (nodes, edges) = path_graph(6);
    let p = problem(nodes.clone(), edges, nodes.clone(), nodes, 1);
    let result = solve(&p);
    assert_eq!(result.maximum_rank, 6);
    assert_eq!(result.minimum_subset_size, 3);
    assert_eq!(result.solution_nodes, labels(&["v0", "v2", "v4"]));
}

// ---------------------------------------------------------------------------
// Search invariants on random networks
// ---------------------------------------------------------------------------

fn random_problem(seed: u64) -> ControlProblem {
    let (nodes, edges) = random_digraph(8, 0.25, seed);
    let targets = nodes[4..].to_vec();
    let sources = nodes[..6].to_vec();
    let mut p = problem(nodes, edges, targets, sources, 3);
    p.parameters.random_seed = seed as i64;
    p
}

#[test]
fn sequential_runs_are_deterministic() {
    for seed in 0..5 {
        let p = random_problem(seed);
        let first = solve(&p);
        let second = solve(&p);
        assert_eq!(first.solution_nodes, second.solution_nodes, "seed {seed}");
        assert_eq!(first.maximum_rank, second.maximum_rank);
        assert_eq!(first.checked_subsets, second.checked_subsets);
    }
}

#[test]
fn solution_reaches_maximum_rank_and_respects_lower_bound() {
    for seed in 0..5 {
        let p = random_problem(seed);
        let result = solve(&p);
        assert!(result.solution_node_count >= result.minimum_subset_size);
        assert!(result.solution_node_count <= result.source_node_count);
        assert_eq!(rank_of(&p, &result.solution_nodes), result.maximum_rank, "seed {seed}");
        assert_eq!(result.checked_subsets, result.total_subsets);
    }
}

#[test]
fn parallel_matches_sequential_solution_size() {
    for seed in 0..5 {
        let p = random_problem(seed);
        let sequential = solve(&p);

        let mut parallel_problem = p.clone();
        parallel_problem.parameters.maximum_degree_of_parallelism = 4;
        let parallel = solve(&parallel_problem);

        assert_eq!(parallel.maximum_rank, sequential.maximum_rank);
        assert_eq!(
            parallel.solution_node_count, sequential.solution_node_count,
            "seed {seed}"
        );
        assert_eq!(rank_of(&p, &parallel.solution_nodes), parallel.maximum_rank);
    }
}

#[test]
fn search_policies_agree_on_solution_size() {
    for seed in 0..5 {
        let p = random_problem(seed);
        let baseline = solve(&p);

        let mut by_size = p.clone();
        by_size.parameters.enumeration_order = EnumerationOrder::SizeAscending;
        let by_size = solve(&by_size);

        let mut unbounded = p.clone();
        unbounded.parameters.subset_bounds = SubsetBounds::Unbounded;
        let unbounded = solve(&unbounded);

        assert_eq!(by_size.solution_node_count, baseline.solution_node_count);
        assert_eq!(unbounded.solution_node_count, baseline.solution_node_count);
        assert_eq!(unbounded.minimum_subset_size, 0);
        assert_eq!(by_size.checked_subsets, by_size.total_subsets);
    }
}

#[test]
fn improvements_strictly_shrink() {
    for seed in 0..5 {
        let p = random_problem(seed);
        let log = EventLog::new();
        let result = run(&p, &log, &CancellationToken::new()).unwrap();
        let sizes: Vec<usize> = log
            .snapshot()
            .into_iter()
            .filter_map(|e| match e {
                ControlEvent::SolutionImproved { size, .. } => Some(size),
                _ => None,
            })
            .collect();
        assert!(sizes.windows(2).all(|w| w[1] < w[0]), "{sizes:?}");
        assert!(sizes.iter().all(|&s| s < result.source_node_count));
        if let Some(&last) = sizes.last() {
            assert_eq!(last, result.solution_node_count);
        }
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cancels the run as soon as the first improvement is reported.
struct CancelOnImprovement {
    token: CancellationToken,
    log: EventLog,
}

impl ControlObserver for CancelOnImprovement {
    fn on_event(&self, event: &ControlEvent) {
        if matches!(event, ControlEvent::SolutionImproved { .. }) {
            self.token.cancel();
        }
        self.log.on_event(event);
    }
}

#[test]
fn cancellation_keeps_the_best_solution_so_far() {
    let (nodes, edges) = path_graph(6);
    let p = problem(nodes.clone(), edges, nodes.clone(), nodes, 5);
    let observer = CancelOnImprovement {
        token: CancellationToken::new(),
        log: EventLog::new(),
    };
    let result = run(&p, &observer, &observer.token).unwrap();
    assert!(result.cancelled);
    // Natural order visits {v0} first, which already controls the path.
    assert_eq!(result.solution_nodes, labels(&["v0"]));
    assert!(result.checked_subsets < result.total_subsets);
    assert!(observer
        .log
        .snapshot()
        .iter()
        .any(|e| matches!(e, ControlEvent::SearchCancelled { .. })));
}

#[test]
fn cancelled_before_start_falls_back_to_all_sources() {
    let p = random_problem(1);
    let token = CancellationToken::new();
    token.cancel();
    let result = run(&p, &NoopObserver, &token).unwrap();
    assert!(result.cancelled);
    assert_eq!(result.checked_subsets, 0);
    assert_eq!(result.solution_nodes, p.sources);
}

#[test]
fn parallel_cancellation_keeps_a_qualifying_solution() {
    let (nodes, edges) = path_graph(14);
    let mut p = problem(nodes.clone(), edges, nodes.clone(), nodes, 13);
    p.parameters.maximum_degree_of_parallelism = 4;
    let observer = CancelOnImprovement {
        token: CancellationToken::new(),
        log: EventLog::new(),
    };
    let result = run(&p, &observer, &observer.token).unwrap();
    assert!(result.cancelled);
    assert!(result.checked_subsets < result.total_subsets);
    assert!(result.solution_node_count < p.sources.len());
    assert_eq!(rank_of(&p, &result.solution_nodes), result.maximum_rank);
    assert!(observer
        .log
        .snapshot()
        .iter()
        .any(|e| matches!(e, ControlEvent::SearchCancelled { .. })));
}

#[test]
fn parallel_cancelled_before_start_falls_back_to_all_sources() {
    let mut p = random_problem(2);
    p.parameters.maximum_degree_of_parallelism = 4;
    let token = CancellationToken::new();
    token.cancel();
    let result = run(&p, &NoopObserver, &token).unwrap();
    assert!(result.cancelled);
    assert_eq!(result.checked_subsets, 0);
    assert_eq!(result.solution_nodes, p.sources);
}

#[test]
fn repeated_source_label_is_rejected() {
    let (nodes, edges) = path_graph(3);
    let sources = labels(&["v0", "v1", "v0"]);
    let p = problem(nodes.clone(), edges, nodes, sources, 2);
    let err = run(&p, &NoopObserver, &CancellationToken::new()).unwrap_err();
    assert!(matches!(
        err,
        ControlError::InvalidInput(ValidationError::DuplicateLabel { ref role, ref label })
            if role == "source" && label == "v0"
    ));
}
