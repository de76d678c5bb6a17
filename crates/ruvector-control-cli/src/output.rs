//! Result file and console output.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::*;
use ruvector_control::types::Parameters;
use ruvector_control::ControlResult;
use serde::Serialize;

/// Document written to the output file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputDocument<'a> {
    /// Stem of the edges file.
    pub name: String,
    /// Stem of the targets file.
    pub targets: String,
    /// Stem of the sources file.
    pub sources: String,
    pub parameters: &'a Parameters,
    pub result: &'a ControlResult,
}

/// File stem of `path`, or the whole path if it has none.
pub fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `<dir>/<edges stem>_Output_<yyyyMMddHHmmss>.json`.
pub fn default_output_path(edges: &Path, now: DateTime<Local>) -> PathBuf {
    let name = format!("{}_Output_{}.json", stem(edges), now.format("%Y%m%d%H%M%S"));
    edges.with_file_name(name)
}

/// Fail early if `path` cannot be created or written.
///
/// A file created by the probe is removed again so an aborted run leaves
/// nothing behind.
pub fn ensure_writable(path: &Path) -> Result<()> {
    let existed = path.exists();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("output file {} is not writable", path.display()))?;
    if !existed {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove probe file {}", path.display()))?;
    }
    Ok(())
}

/// Pretty JSON for `doc`.
pub fn render(doc: &OutputDocument<'_>) -> Result<String> {
    serde_json::to_string_pretty(doc).context("failed to serialize result")
}

/// Write `doc` to `path` as pretty JSON.
pub fn write(path: &Path, doc: &OutputDocument<'_>) -> Result<()> {
    let json = render(doc)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Print a key-value pair with aligned formatting.
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<20} {}", key, value);
}

/// Console summary of a finished run.
pub fn print_summary(result: &ControlResult, output: &Path) {
    let status = if result.cancelled {
        "cancelled".yellow()
    } else {
        "complete".green()
    };
    println!("{} {}", "Search".bold(), status);
    print_kv("Nodes", &result.node_count.to_string());
    print_kv("Edges", &result.edge_count.to_string());
    print_kv("Targets", &result.target_node_count.to_string());
    print_kv("Sources", &result.source_node_count.to_string());
    print_kv("Maximum rank", &result.maximum_rank.to_string());
    print_kv(
        "Subsets checked",
        &format!("{} / {}", result.checked_subsets, result.total_subsets),
    );
    print_kv(
        "Solution size",
        &result.solution_node_count.to_string().cyan().to_string(),
    );
    print_kv("Solution", &result.solution_nodes.join(", "));
    print_kv("Elapsed", &format!("{:.2?}", result.time_elapsed));
    print_kv("Output", &output.display().to_string());
}
