//! Eager input validation.
//!
//! Every check runs before any matrix is built. [`collect_violations`]
//! returns one [`ValidationError`] per violated precondition, in a fixed
//! order: empty lists first, then parameters, then cross-references.

use std::collections::HashSet;

use tracing::warn;

use crate::error::ValidationError;
use crate::subset::MAX_SOURCE_NODES;
use crate::types::Parameters;

/// Node count above which the dense power series gets expensive.
pub const LARGE_NETWORK_NODES: usize = 2_000;

/// Check the four run parameters.
pub fn validate_parameters(params: &Parameters) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if params.random_seed < 0 {
        errors.push(ValidationError::out_of_range(
            "random_seed",
            params.random_seed,
            ">= 0",
        ));
    }
    if params.maximum_path_length <= 0 {
        errors.push(ValidationError::out_of_range(
            "maximum_path_length",
            params.maximum_path_length,
            "> 0",
        ));
    }
    if params.rank_computations <= 0 {
        errors.push(ValidationError::out_of_range(
            "rank_computations",
            params.rank_computations,
            "> 0",
        ));
    }
    if params.maximum_degree_of_parallelism <= 0 {
        errors.push(ValidationError::out_of_range(
            "maximum_degree_of_parallelism",
            params.maximum_degree_of_parallelism,
            "> 0",
        ));
    }
    errors
}

/// Check the network and the target/source selections.
pub fn validate_network(
    nodes: &[String],
    edges: &[(String, String)],
    targets: &[String],
    sources: &[String],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (name, empty) in [
        ("nodes", nodes.is_empty()),
        ("edges", edges.is_empty()),
        ("target nodes", targets.is_empty()),
        ("source nodes", sources.is_empty()),
    ] {
        if empty {
            errors.push(ValidationError::EmptyInput(name.to_string()));
        }
    }

    let mut known: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !known.insert(node.as_str()) {
            errors.push(ValidationError::DuplicateNode(node.clone()));
        }
    }

    let mut unknown = |role: &str, label: &String| {
        if !known.contains(label.as_str()) {
            errors.push(ValidationError::UnknownNode {
                role: role.to_string(),
                label: label.clone(),
            });
        }
    };
    for (source, target) in edges {
        unknown("edge", source);
        unknown("edge", target);
    }
    for target in targets {
        unknown("target", target);
    }
    for source in sources {
        unknown("source", source);
    }

    for (role, labels) in [("target", targets), ("source", sources)] {
        let mut seen = HashSet::with_capacity(labels.len());
        for label in labels {
            if !seen.insert(label.as_str()) {
                errors.push(ValidationError::DuplicateLabel {
                    role: role.to_string(),
                    label: label.clone(),
                });
            }
        }
    }

    if sources.len() > MAX_SOURCE_NODES {
        errors.push(ValidationError::TooManySourceNodes {
            count: sources.len(),
            max: MAX_SOURCE_NODES,
        });
    }

    if nodes.len() > LARGE_NETWORK_NODES {
        let mib = nodes.len() * nodes.len() * std::mem::size_of::<f64>() / (1024 * 1024);
        warn!(
            nodes = nodes.len(),
            mib_per_power = mib,
            "large network; every adjacency power is stored densely"
        );
    }
    errors
}

/// All violations for a complete problem, network checks first.
pub fn collect_violations(
    nodes: &[String],
    edges: &[(String, String)],
    targets: &[String],
    sources: &[String],
    params: &Parameters,
) -> Vec<ValidationError> {
    let mut errors = validate_network(nodes, edges, targets, sources);
    errors.extend(validate_parameters(params));
    errors
}
