//! Core types for the controllability search.
//!
//! Provides [`CsrMatrix`] for the sparse adjacency and indicator matrices,
//! [`DenseMatrix`] for the power series and controllability blocks, and the
//! run configuration ([`Parameters`]) and outcome ([`Solution`]) records.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CsrMatrix<T>
// ---------------------------------------------------------------------------

/// Compressed Sparse Row (CSR) matrix.
///
/// The adjacency matrix `A` and the indicator matrices `B` and `C` are all
/// very sparse (one entry per edge, one per selected node), so they are kept
/// in CSR form and only the power series is densified.
///
/// # Layout
///
/// For a matrix with `m` rows and `nnz` non-zeros:
/// - `row_ptr` has length `m + 1`
/// - `col_indices` and `values` each have length `nnz`
/// - Row `i` spans indices `row_ptr[i]..row_ptr[i+1]`
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T> {
    /// Row pointers: `row_ptr[i]` is the start index in `col_indices`/`values`
    /// for row `i`.
    pub row_ptr: Vec<usize>,
    /// Column indices for each non-zero entry.
    pub col_indices: Vec<usize>,
    /// Values for each non-zero entry.
    pub values: Vec<T>,
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl<T> CsrMatrix<T> {
    /// Number of non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterate over `(col_index, &value)` pairs for the given row.
    #[inline]
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, &T)> {
        let start = self.row_ptr[row];
        let end = self.row_ptr[row + 1];
        self.col_indices[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter())
    }
}

impl CsrMatrix<f64> {
    /// Build a CSR matrix from COO (coordinate) triplets.
    ///
    /// Entries are sorted by (row, col). When the same position appears more
    /// than once the last triplet wins, so re-inserting an edge overwrites its
    /// weight instead of accumulating it.
    pub fn from_coo(
        rows: usize,
        cols: usize,
        entries: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Self {
        let mut sorted: Vec<_> = entries.into_iter().collect();
        // Stable sort keeps insertion order among duplicates.
        sorted.sort_by_key(|(r, c, _)| (*r, *c));

        let mut row_ptr = vec![0usize; rows + 1];
        let mut col_indices: Vec<usize> = Vec::with_capacity(sorted.len());
        let mut values: Vec<f64> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;

        for (r, c, v) in sorted {
            assert!(r < rows, "row index {} out of bounds (rows={})", r, rows);
            assert!(c < cols, "col index {} out of bounds (cols={})", c, cols);
            if last == Some((r, c)) {
                if let Some(slot) = values.last_mut() {
                    *slot = v;
                }
                continue;
            }
            row_ptr[r + 1] += 1;
            col_indices.push(c);
            values.push(v);
            last = Some((r, c));
        }
        for i in 1..=rows {
            row_ptr[i] += row_ptr[i - 1];
        }

        Self {
            row_ptr,
            col_indices,
            values,
            rows,
            cols,
        }
    }

    /// Build a square identity matrix of dimension `n` in CSR format.
    pub fn identity(n: usize) -> Self {
        Self {
            row_ptr: (0..=n).collect(),
            col_indices: (0..n).collect(),
            values: vec![1.0; n],
            rows: n,
            cols: n,
        }
    }

    /// Expand into a dense row-major matrix.
    pub fn to_dense(&self) -> DenseMatrix {
        let mut out = DenseMatrix::zeros(self.rows, self.cols);
        for row in 0..self.rows {
            for (col, &v) in self.row_entries(row) {
                out.set(row, col, v);
            }
        }
        out
    }

    /// Sparse × dense product `self * rhs`.
    ///
    /// Costs O(nnz · rhs.cols). Used to advance the power series one step
    /// (`A^(l+1) = A · A^l`) and to select target rows (`C · A^l`).
    pub fn mul_dense(&self, rhs: &DenseMatrix) -> DenseMatrix {
        assert_eq!(
            self.cols, rhs.rows,
            "dimension mismatch: {}x{} * {}x{}",
            self.rows, self.cols, rhs.rows, rhs.cols
        );
        let mut out = DenseMatrix::zeros(self.rows, rhs.cols);
        for row in 0..self.rows {
            let start = row * rhs.cols;
            for (k, &a) in self.row_entries(row) {
                let src = rhs.row(k);
                for (dst, &b) in out.data[start..start + rhs.cols].iter_mut().zip(src) {
                    *dst += a * b;
                }
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// DenseMatrix
// ---------------------------------------------------------------------------

/// Dense row-major `f64` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    /// Row-major entries, `rows * cols` long.
    pub data: Vec<f64>,
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl DenseMatrix {
    /// All-zero matrix of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Square identity matrix of dimension `n`.
    pub fn identity(n: usize) -> Self {
        let mut out = Self::zeros(n, n);
        for i in 0..n {
            out.set(i, i, 1.0);
        }
        out
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow one row as a slice.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// `true` when every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Dense × sparse product `self * rhs`.
    ///
    /// Zero entries of `self` are skipped, which makes `C·A^l · B` cheap when
    /// B only selects a handful of columns.
    pub fn mul_csr(&self, rhs: &CsrMatrix<f64>) -> DenseMatrix {
        assert_eq!(
            self.cols, rhs.rows,
            "dimension mismatch: {}x{} * {}x{}",
            self.rows, self.cols, rhs.rows, rhs.cols
        );
        let mut out = DenseMatrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for (k, &a) in self.row(i).iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                for (j, &b) in rhs.row_entries(k) {
                    out.data[i * rhs.cols + j] += a * b;
                }
            }
        }
        out
    }

    /// Horizontal concatenation `[M0 | M1 | ... ]` of blocks sharing a row count.
    ///
    /// An empty block list yields a `rows x 0` matrix.
    pub fn hconcat(rows: usize, blocks: &[DenseMatrix]) -> DenseMatrix {
        let cols: usize = blocks.iter().map(|b| b.cols).sum();
        let mut out = DenseMatrix::zeros(rows, cols);
        let mut offset = 0;
        for block in blocks {
            assert_eq!(block.rows, rows, "hconcat: block has {} rows, expected {}", block.rows, rows);
            for r in 0..rows {
                let dst = r * cols + offset;
                out.data[dst..dst + block.cols].copy_from_slice(block.row(r));
            }
            offset += block.cols;
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Search policies
// ---------------------------------------------------------------------------

/// How the subset-size window is derived before the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubsetBounds {
    /// `[ceil(maximum_rank / (L + 1)), source_count]`.
    #[default]
    Window,
    /// `[0, source_count]`: no lower bound beyond excluding the empty set.
    Unbounded,
}

/// Order in which candidate subsets are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnumerationOrder {
    /// Bitmasks `0 .. 2^k` in numeric order.
    #[default]
    Natural,
    /// Grouped by subset size, smallest first. Whole size levels are skipped
    /// once a solution of that size or smaller is known.
    SizeAscending,
}

impl std::fmt::Display for EnumerationOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Natural => write!(f, "natural"),
            Self::SizeAscending => write!(f, "size-ascending"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Seed value meaning "not chosen yet"; hosts replace it before validation.
pub const UNRESOLVED_SEED: i64 = -1;

/// Run parameters.
///
/// Fields are signed so that out-of-range values read from a parameter file
/// survive deserialization and are rejected by validation with a clear reason.
/// Serialized keys are PascalCase (`RandomSeed`, `MaximumPathLength`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Parameters {
    /// Seed for the edge-weight perturbations; must be `>= 0` at run time.
    #[serde(default = "unresolved_seed")]
    pub random_seed: i64,
    /// Longest control path `L`; the power series is `[I, A, ..., A^L]`.
    pub maximum_path_length: i64,
    /// Number of independently randomized trials per rank estimate.
    pub rank_computations: i64,
    /// Worker count for the subset search; `1` runs sequentially.
    pub maximum_degree_of_parallelism: i64,
    /// Subset-size window policy.
    pub subset_bounds: SubsetBounds,
    /// Candidate visiting order.
    pub enumeration_order: EnumerationOrder,
    /// Seconds between progress reports.
    pub progress_interval_seconds: u64,
}

fn unresolved_seed() -> i64 {
    UNRESOLVED_SEED
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            random_seed: 0,
            maximum_path_length: 5,
            rank_computations: 3,
            maximum_degree_of_parallelism: 1,
            subset_bounds: SubsetBounds::default(),
            enumeration_order: EnumerationOrder::default(),
            progress_interval_seconds: 30,
        }
    }
}

impl Parameters {
    /// Maximum path length as an index bound. Only meaningful once validated.
    #[inline]
    pub fn path_length(&self) -> usize {
        self.maximum_path_length.max(0) as usize
    }

    /// Number of randomized trials. Only meaningful once validated.
    #[inline]
    pub fn trials(&self) -> usize {
        self.rank_computations.max(0) as usize
    }

    /// Worker count. Only meaningful once validated.
    #[inline]
    pub fn parallelism(&self) -> usize {
        self.maximum_degree_of_parallelism.max(1) as usize
    }

    /// Seed for the trial RNG. Only meaningful once validated.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.random_seed.max(0) as u64
    }
}

// ---------------------------------------------------------------------------
// Solution
// ---------------------------------------------------------------------------

/// A source subset together with the structural rank it achieves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Solution {
    /// Member labels, in source-list order.
    pub nodes: Vec<String>,
    /// Number of members.
    pub size: usize,
    /// Structural rank reached by the subset.
    pub rank: usize,
}
