//! Property-based tests using proptest
//!
//! These tests check invariants of the rank estimator and the subset search
//! on small random networks.

mod helpers;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use helpers::numbered;
use ruvector_control::algorithm::{run, ControlProblem};
use ruvector_control::cancel::CancellationToken;
use ruvector_control::index::NodeIndex;
use ruvector_control::matrix::{build_adjacency, build_source, build_target};
use ruvector_control::rank::{StructuralRankEstimator, TrialSet};
use ruvector_control::subset;
use ruvector_control::traits::NoopObserver;
use ruvector_control::types::Parameters;

// ============================================================================
// Strategies
// ============================================================================

/// A small network: node count, edge list over indices, target mask, seed,
/// path length.
fn network_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, u64, u64, usize)> {
    (3usize..7).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n), 1..14),
            1u64..(1u64 << n),
            0u64..1_000,
            1usize..4,
        )
    })
}

fn to_edges(nodes: &[String], pairs: &[(usize, usize)]) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for &(a, b) in pairs {
        let e = (nodes[a].clone(), nodes[b].clone());
        if !out.contains(&e) {
            out.push(e);
        }
    }
    out
}

fn select(nodes: &[String], mask: u64) -> Vec<String> {
    subset::members(mask).map(|i| nodes[i].clone()).collect()
}

fn structural_rank(
    index: &NodeIndex,
    trials: &TrialSet,
    sources: &[String],
) -> usize {
    let b = build_source(index, sources).unwrap();
    StructuralRankEstimator::new(trials).estimate(&b).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Property: a superset of sources never reaches a lower rank.
    #[test]
    fn rank_is_monotone_in_the_source_set(
        (n, pairs, target_mask, seed, l) in network_strategy(),
        small in 0u64..64,
        extra in 0u64..64,
    ) {
        let nodes = numbered(n);
        let edges = to_edges(&nodes, &pairs);
        let index = NodeIndex::new(&nodes).unwrap();
        let targets = select(&nodes, target_mask);
        let trials = TrialSet::generate(&index, &edges, &targets, l, 3, seed).unwrap();

        let full = subset::full(n);
        let s1 = small & full;
        let s2 = (small | extra) & full;
        let r1 = structural_rank(&index, &trials, &select(&nodes, s1));
        let r2 = structural_rank(&index, &trials, &select(&nodes, s2));
        prop_assert!(r1 <= r2, "rank({:b}) = {} > rank({:b}) = {}", s1, r1, s2, r2);
        prop_assert!(r2 <= targets.len());
    }

    // Property: the reported solution reaches the maximum rank, is no larger
    // than the source set, and respects the window lower bound.
    #[test]
    fn solution_is_admissible(
        (n, pairs, target_mask, seed, l) in network_strategy(),
        source_mask in 1u64..64,
    ) {
        let nodes = numbered(n);
        let edges = to_edges(&nodes, &pairs);
        let mut sources = select(&nodes, source_mask & subset::full(n));
        if sources.is_empty() {
            sources.push(nodes[0].clone());
        }
        let targets = select(&nodes, target_mask);
        let problem = ControlProblem {
            nodes: nodes.clone(),
            edges: edges.clone(),
            targets: targets.clone(),
            sources: sources.clone(),
            parameters: Parameters {
                random_seed: seed as i64,
                maximum_path_length: l as i64,
                ..Parameters::default()
            },
        };
        let result = run(&problem, &NoopObserver, &CancellationToken::new()).unwrap();

        let index = NodeIndex::new(&nodes).unwrap();
        let trials = TrialSet::generate(&index, &edges, &targets, l, 3, seed).unwrap();
        prop_assert_eq!(structural_rank(&index, &trials, &sources), result.maximum_rank);
        prop_assert_eq!(
            structural_rank(&index, &trials, &result.solution_nodes),
            result.maximum_rank
        );
        prop_assert!(result.solution_node_count >= result.minimum_subset_size);
        prop_assert!(result.solution_node_count <= sources.len());
        prop_assert!(result.solution_node_count >= 1);
    }

    // Property: identical draws give bit-identical matrices.
    #[test]
    fn builders_are_idempotent(
        (n, pairs, target_mask, seed, _l) in network_strategy(),
    ) {
        let nodes = numbered(n);
        let edges = to_edges(&nodes, &pairs);
        let index = NodeIndex::new(&nodes).unwrap();

        let mut r1 = StdRng::seed_from_u64(seed);
        let mut r2 = StdRng::seed_from_u64(seed);
        let a1 = build_adjacency(&index, &edges, Some(&mut r1)).unwrap();
        let a2 = build_adjacency(&index, &edges, Some(&mut r2)).unwrap();
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        prop_assert_eq!(bits(&a1.values), bits(&a2.values));
        prop_assert_eq!(&a1.col_indices, &a2.col_indices);
        prop_assert_eq!(&a1.row_ptr, &a2.row_ptr);

        let targets = select(&nodes, target_mask);
        prop_assert_eq!(
            build_target(&index, &targets).unwrap(),
            build_target(&index, &targets).unwrap()
        );
        prop_assert_eq!(
            build_source(&index, &targets).unwrap(),
            build_source(&index, &targets).unwrap()
        );
    }
}
