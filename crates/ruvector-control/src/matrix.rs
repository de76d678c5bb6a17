//! Graph-to-matrix encoding.
//!
//! | Builder | Shape | Entry |
//! |---------|-------|-------|
//! | [`build_adjacency`] | n × n | `A[target][source] = 1 + U[0, 1)` per edge |
//! | [`build_source`] | n × k | `B[node(s_i)][i] = 1` |
//! | [`build_target`] | m × n | `C[i][node(t_i)] = 1` |
//!
//! All builders are pure. A label missing from the [`NodeIndex`] is reported
//! as [`ValidationError::UnknownNode`]; callers validate their inputs first, so
//! this only fires on a broken invariant.

use rand::{Rng, RngCore};

use crate::error::ValidationError;
use crate::index::NodeIndex;
use crate::types::CsrMatrix;

/// Build the weighted adjacency matrix `A`.
///
/// Each edge `(source, target)` sets `A[target][source]` to `1 + r` where `r`
/// is drawn from `rng` in `[0, 1)`, one draw per edge in edge order. Without a
/// random source every edge weight is exactly `1`. The diagonal is only
/// populated by explicit self-loop edges.
pub fn build_adjacency(
    index: &NodeIndex,
    edges: &[(String, String)],
    mut rng: Option<&mut dyn RngCore>,
) -> Result<CsrMatrix<f64>, ValidationError> {
    let n = index.len();
    let mut entries = Vec::with_capacity(edges.len());
    for (source, target) in edges {
        let col = index.resolve(source, "edge")?;
        let row = index.resolve(target, "edge")?;
        let perturbation = match rng.as_mut() {
            Some(r) => r.gen::<f64>(),
            None => 0.0,
        };
        entries.push((row, col, 1.0 + perturbation));
    }
    Ok(CsrMatrix::from_coo(n, n, entries))
}

/// Build the source indicator matrix `B` for an ordered subset of labels.
///
/// Column order follows `subset`; it does not affect any rank computed from
/// the result.
pub fn build_source<S: AsRef<str>>(
    index: &NodeIndex,
    subset: &[S],
) -> Result<CsrMatrix<f64>, ValidationError> {
    let rows = subset
        .iter()
        .map(|s| index.resolve(s.as_ref(), "source"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(source_from_indices(index.len(), &rows))
}

/// Build `B` directly from node indices.
pub(crate) fn source_from_indices(n: usize, node_indices: &[usize]) -> CsrMatrix<f64> {
    CsrMatrix::from_coo(
        n,
        node_indices.len(),
        node_indices.iter().enumerate().map(|(col, &row)| (row, col, 1.0)),
    )
}

/// Build the target indicator matrix `C`.
pub fn build_target<S: AsRef<str>>(
    index: &NodeIndex,
    targets: &[S],
) -> Result<CsrMatrix<f64>, ValidationError> {
    let cols = targets
        .iter()
        .map(|t| index.resolve(t.as_ref(), "target"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CsrMatrix::from_coo(
        targets.len(),
        index.len(),
        cols.into_iter().enumerate().map(|(row, col)| (row, col, 1.0)),
    ))
}
