//! Structural rank estimation.
//!
//! The controllability matrix of a source set `B` against the targets `C` is
//!
//! ```text
//! R = [ C·B | C·A·B | C·A^2·B | ... | C·A^L·B ]      (m x k(L+1))
//! ```
//!
//! Its numerical rank depends on the edge weights, so the estimator evaluates
//! it against several independently perturbed adjacency matrices (a
//! [`TrialSet`]) and keeps the running maximum. It stops as soon as a trial
//! repeats the running maximum, treating the value as stabilized. A sequence
//! that dips and later recovers to a higher value can therefore stop early;
//! that behaviour is part of the estimator's contract.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, instrument};

use crate::error::ControlError;
use crate::index::NodeIndex;
use crate::matrix::{build_adjacency, build_target};
use crate::power::{left_multiply_by_series, powers};
use crate::types::{CsrMatrix, DenseMatrix};

/// Pivots at or below `PIVOT_TOLERANCE * max(rows, cols)` count as zero.
///
/// Applied after the matrix has been scaled so that every non-zero column
/// and row has unit max-norm.
pub const PIVOT_TOLERANCE: f64 = 1e-10;

// ---------------------------------------------------------------------------
// Numerical rank
// ---------------------------------------------------------------------------

/// Column rank of `m` over the reals.
///
/// Gaussian elimination with complete pivoting on an equilibrated copy.
/// Returns [`ControlError::NumericalInstability`] if `m` holds NaN or
/// infinity.
pub fn numerical_rank(m: &DenseMatrix) -> Result<usize, ControlError> {
    if !m.is_finite() {
        let pos = m.data.iter().position(|v| !v.is_finite()).unwrap_or(0);
        return Err(ControlError::NumericalInstability {
            detail: format!(
                "non-finite entry at ({}, {}) of a {}x{} controllability matrix",
                pos / m.cols,
                pos % m.cols,
                m.rows,
                m.cols
            ),
        });
    }
    let (rows, cols) = (m.rows, m.cols);
    if rows == 0 || cols == 0 {
        return Ok(0);
    }

    let mut w = m.clone();
    equilibrate(&mut w);
    let tol = PIVOT_TOLERANCE * rows.max(cols) as f64;

    let mut rank = 0;
    for step in 0..rows.min(cols) {
        let (mut pr, mut pc, mut pmax) = (step, step, 0.0f64);
        for r in step..rows {
            for c in step..cols {
                let v = w.get(r, c).abs();
                if v > pmax {
                    (pr, pc, pmax) = (r, c, v);
                }
            }
        }
        if pmax <= tol {
            break;
        }
        swap_rows(&mut w, step, pr);
        swap_cols(&mut w, step, pc);

        let pivot = w.get(step, step);
        for r in (step + 1)..rows {
            let factor = w.get(r, step) / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in step..cols {
                let v = w.get(r, c) - factor * w.get(step, c);
                w.set(r, c, v);
            }
        }
        rank += 1;
    }
    Ok(rank)
}

/// Scale every non-zero column, then every non-zero row, to unit max-norm.
fn equilibrate(w: &mut DenseMatrix) {
    for c in 0..w.cols {
        let max = (0..w.rows).map(|r| w.get(r, c).abs()).fold(0.0, f64::max);
        if max > 0.0 {
            for r in 0..w.rows {
                let v = w.get(r, c) / max;
                w.set(r, c, v);
            }
        }
    }
    for r in 0..w.rows {
        let start = r * w.cols;
        let row = &mut w.data[start..start + w.cols];
        let max = row.iter().map(|v| v.abs()).fold(0.0, f64::max);
        if max > 0.0 {
            row.iter_mut().for_each(|v| *v /= max);
        }
    }
}

fn swap_rows(w: &mut DenseMatrix, a: usize, b: usize) {
    if a == b {
        return;
    }
    for c in 0..w.cols {
        w.data.swap(a * w.cols + c, b * w.cols + c);
    }
}

fn swap_cols(w: &mut DenseMatrix, a: usize, b: usize) {
    if a == b {
        return;
    }
    for r in 0..w.rows {
        w.data.swap(r * w.cols + a, r * w.cols + b);
    }
}

// ---------------------------------------------------------------------------
// TrialSet
// ---------------------------------------------------------------------------

/// Independently randomized CA-series, shared read-only by every rank
/// estimate of a run.
///
/// Trial `t` holds `[C·A_t^0, ..., C·A_t^L]` where `A_t` is the adjacency
/// matrix with its own perturbation draws. All trials come from a single RNG
/// seeded once, so a seed reproduces the whole set.
#[derive(Debug, Clone)]
pub struct TrialSet {
    series: Vec<Vec<DenseMatrix>>,
    targets: usize,
}

impl TrialSet {
    /// Build `trials` CA-series for the given graph and targets.
    #[instrument(skip_all, fields(trials = trials, path_length = max_path_length, seed = seed))]
    pub fn generate<S: AsRef<str>>(
        index: &NodeIndex,
        edges: &[(String, String)],
        targets: &[S],
        max_path_length: usize,
        trials: usize,
        seed: u64,
    ) -> Result<Self, ControlError> {
        let c = build_target(index, targets)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut series = Vec::with_capacity(trials);
        for trial in 0..trials {
            let a = build_adjacency(index, edges, Some(&mut rng))?;
            let ca = left_multiply_by_series(&c, &powers(&a, max_path_length));
            debug!(trial, nnz = a.nnz(), "generated CA-series");
            series.push(ca);
        }
        Ok(Self {
            series,
            targets: c.rows,
        })
    }

    /// Wrap precomputed CA-series (each a list of `m x n` matrices).
    pub fn from_series(series: Vec<Vec<DenseMatrix>>) -> Self {
        let targets = series
            .first()
            .and_then(|s| s.first())
            .map_or(0, |m| m.rows);
        Self { series, targets }
    }

    /// Number of trials.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of target rows `m`.
    pub fn targets(&self) -> usize {
        self.targets
    }

    /// CA-series of one trial.
    pub fn series(&self, trial: usize) -> &[DenseMatrix] {
        &self.series[trial]
    }
}

// ---------------------------------------------------------------------------
// StructuralRankEstimator
// ---------------------------------------------------------------------------

/// Estimates the structural rank reached by a source matrix `B`.
#[derive(Debug, Clone, Copy)]
pub struct StructuralRankEstimator<'a> {
    trials: &'a TrialSet,
}

impl<'a> StructuralRankEstimator<'a> {
    pub fn new(trials: &'a TrialSet) -> Self {
        Self { trials }
    }

    /// Controllability matrix `[C·A^0·B | ... | C·A^L·B]` for one CA-series.
    pub fn controllability_matrix(series: &[DenseMatrix], b: &CsrMatrix<f64>) -> DenseMatrix {
        let rows = series.first().map_or(0, |m| m.rows);
        let blocks: Vec<DenseMatrix> = series.iter().map(|ca| ca.mul_csr(b)).collect();
        DenseMatrix::hconcat(rows, &blocks)
    }

    /// Structural rank of `b`.
    ///
    /// Trials are processed in order. A rank above the running value raises
    /// it; a rank equal to it ends the estimate; a lower rank is ignored.
    pub fn estimate(&self, b: &CsrMatrix<f64>) -> Result<usize, ControlError> {
        let mut structural = 0usize;
        for trial in 0..self.trials.len() {
            let r = Self::controllability_matrix(self.trials.series(trial), b);
            let rank = numerical_rank(&r)?;
            if rank > structural {
                structural = rank;
            } else if rank == structural {
                debug!(trial, rank, "rank stabilized");
                break;
            }
        }
        Ok(structural)
    }
}
