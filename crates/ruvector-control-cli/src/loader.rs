//! Input files: edges, node lists and parameters.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ruvector_control::types::{Parameters, UNRESOLVED_SEED};
use ruvector_control::ControlProblem;
use tracing::{info, warn};

/// Parse `source;target` lines.
///
/// Lines with fewer than two fields or an empty field are ignored, and only
/// the first occurrence of a repeated edge is kept.
pub fn parse_edges(text: &str) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for line in text.lines() {
        let mut fields = line.split(';').map(str::trim);
        let (Some(source), Some(target)) = (fields.next(), fields.next()) else {
            continue;
        };
        if source.is_empty() || target.is_empty() {
            continue;
        }
        let edge = (source.to_string(), target.to_string());
        if seen.insert(edge.clone()) {
            edges.push(edge);
        }
    }
    edges
}

/// Parse one label per line, skipping blanks and repeats.
pub fn parse_labels(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| seen.insert(l.to_string()))
        .map(str::to_string)
        .collect()
}

/// Distinct edge endpoints: all edge sources, then all edge targets.
pub fn nodes_of(edges: &[(String, String)]) -> Vec<String> {
    let mut seen = HashSet::new();
    edges
        .iter()
        .map(|(s, _)| s)
        .chain(edges.iter().map(|(_, t)| t))
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect()
}

/// Keep the labels that are network nodes, in their file order.
pub fn restrict_to(labels: Vec<String>, nodes: &[String], role: &str) -> Vec<String> {
    let known: HashSet<&str> = nodes.iter().map(String::as_str).collect();
    let before = labels.len();
    let kept: Vec<String> = labels
        .into_iter()
        .filter(|l| known.contains(l.as_str()))
        .collect();
    if kept.len() < before {
        warn!(
            role,
            dropped = before - kept.len(),
            "ignoring labels that are not network nodes"
        );
    }
    kept
}

fn read(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {what} file {}", path.display()))
}

/// Read the parameter file (JSON with PascalCase keys).
pub fn read_parameters(path: &Path) -> Result<Parameters> {
    let text = read(path, "parameters")?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse parameters file {}", path.display()))
}

/// Replace an unresolved seed with a fresh random one.
pub fn resolve_seed(params: &mut Parameters) {
    if params.random_seed == UNRESOLVED_SEED {
        params.random_seed = i64::from(rand::random::<u32>());
        info!(seed = params.random_seed, "no random seed given; generated one");
    }
}

/// Assemble a problem from the four input files.
pub fn load_problem(
    edges_path: &Path,
    targets_path: &Path,
    sources_path: &Path,
    parameters_path: &Path,
) -> Result<ControlProblem> {
    let edges = parse_edges(&read(edges_path, "edges")?);
    let nodes = nodes_of(&edges);
    let targets = restrict_to(parse_labels(&read(targets_path, "targets")?), &nodes, "target");
    let sources = restrict_to(parse_labels(&read(sources_path, "sources")?), &nodes, "source");
    let parameters = read_parameters(parameters_path)?;

    info!(
        nodes = nodes.len(),
        edges = edges.len(),
        targets = targets.len(),
        sources = sources.len(),
        "inputs loaded"
    );
    Ok(ControlProblem {
        nodes,
        edges,
        targets,
        sources,
        parameters,
    })
}
