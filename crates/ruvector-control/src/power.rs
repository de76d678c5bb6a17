//! Adjacency power series and its target projection.
//!
//! `powers(A, L)` returns `[I, A, A^2, ..., A^L]`. Each step is one sparse ×
//! dense product `A · A^(l-1)`, so the series costs O(L · nnz(A) · n) rather
//! than O(L · n^3).

use crate::types::{CsrMatrix, DenseMatrix};

/// Compute `[A^0 = I, A^1, ..., A^L]` (L + 1 dense `n x n` matrices).
pub fn powers(a: &CsrMatrix<f64>, max_path_length: usize) -> Vec<DenseMatrix> {
    let mut series = Vec::with_capacity(max_path_length + 1);
    series.push(DenseMatrix::identity(a.rows));
    for _ in 0..max_path_length {
        let next = match series.last() {
            Some(prev) => a.mul_dense(prev),
            None => break,
        };
        series.push(next);
    }
    series
}

/// Project each power onto the targets: `[C·I, C·A, ..., C·A^L]`.
pub fn left_multiply_by_series(c: &CsrMatrix<f64>, powers: &[DenseMatrix]) -> Vec<DenseMatrix> {
    powers.iter().map(|p| c.mul_dense(p)).collect()
}
