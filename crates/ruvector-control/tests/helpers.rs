//! Shared test helpers for the ruvector-control integration test suite.
//!
//! Provides deterministic graph generators and a compact way to assemble a
//! [`ControlProblem`].

#![allow(dead_code)]

use ruvector_control::algorithm::ControlProblem;
use ruvector_control::types::Parameters;

// ---------------------------------------------------------------------------
// Random number generator (simple LCG for deterministic reproducibility)
// ---------------------------------------------------------------------------

/// A minimal linear congruential generator for deterministic test graphs.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

// ---------------------------------------------------------------------------
// Graph generators
// ---------------------------------------------------------------------------

pub fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn edges(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

/// Node labels `v0 .. v{n-1}`.
pub fn numbered(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("v{i}")).collect()
}

/// Directed path `v0 -> v1 -> ... -> v{n-1}`.
pub fn path_graph(n: usize) -> (Vec<String>, Vec<(String, String)>) {
    let nodes = numbered(n);
    let edges = nodes
        .windows(2)
        .map(|w| (w[0].clone(), w[1].clone()))
        .collect();
    (nodes, edges)
}

/// Random simple digraph without self-loops; every ordered pair is an edge
/// with probability `density`. Always has at least one edge.
pub fn random_digraph(n: usize, density: f64, seed: u64) -> (Vec<String>, Vec<(String, String)>) {
    let nodes = numbered(n);
    let mut rng = Lcg::new(seed);
    let mut out = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if i != j && rng.next_f64() < density {
                out.push((nodes[i].clone(), nodes[j].clone()));
            }
        }
    }
    if out.is_empty() && n > 1 {
        out.push((nodes[0].clone(), nodes[1].clone()));
    }
    (nodes, out)
}

/// Assemble a problem with default parameters and the given path length.
pub fn problem(
    nodes: Vec<String>,
    edges: Vec<(String, String)>,
    targets: Vec<String>,
    sources: Vec<String>,
    maximum_path_length: i64,
) -> ControlProblem {
    ControlProblem {
        nodes,
        edges,
        targets,
        sources,
        parameters: Parameters {
            maximum_path_length,
            ..Parameters::default()
        },
    }
}
