//! Types for sparse LU factorization
//!
//! Contains factorization results, options and metrics.

use crate::sparse::CscData;

// ============================================================================
// LU Factorization Types
// ============================================================================

/// Result of sparse LU factorization: P·A·Q = L·U
///
/// - L is unit lower triangular (ones on diagonal, stored implicitly)
/// - U is upper triangular (diagonal stored explicitly, last in each column)
/// - P is the row permutation from partial pivoting
/// - Q is the column permutation from the symbolic analysis
///
/// Both factors are indexed in permuted positions.
#[derive(Debug, Clone)]
pub struct LuFactors {
    /// Strictly lower part of the unit lower triangular factor
    pub l: CscData,

    /// Upper triangular factor (includes diagonal)
    pub u: CscData,

    /// Row permutation: `row_perm[k]` = original row pivoted to position k
    pub row_perm: Vec<usize>,

    /// Inverse row permutation: `row_perm_inv[row]` = position of original row
    pub row_perm_inv: Vec<usize>,

    /// Column permutation: `col_perm[k]` = original column at position k
    pub col_perm: Vec<usize>,
}

impl LuFactors {
    /// Matrix dimension
    pub fn n(&self) -> usize {
        self.row_perm.len()
    }
}

/// Configuration for sparse LU factorization
#[derive(Debug, Clone)]
pub struct LuOptions {
    /// Pivot tolerance for threshold partial pivoting (default: 1.0)
    ///
    /// Values in (0, 1]. With 1.0 the largest candidate is always taken.
    /// Smaller values keep the diagonal candidate whenever its magnitude is
    /// at least `pivot_tolerance` times the largest one.
    pub pivot_tolerance: f64,

    /// Relative singularity threshold (default: 1e-14)
    ///
    /// A column whose pivot has magnitude at most `pivot_threshold` times the
    /// largest magnitude in that column (its entries of A and of the
    /// eliminated column) is numerically singular, as is a non-finite pivot.
    /// An exactly zero pivot always fails. No regularization or diagonal
    /// shift is ever applied.
    pub pivot_threshold: f64,
}

impl Default for LuOptions {
    fn default() -> Self {
        Self {
            pivot_tolerance: 1.0,
            pivot_threshold: 1e-14,
        }
    }
}

impl LuOptions {
    /// Options preferring the diagonal (useful for diagonally dominant systems)
    pub fn diagonal_preference(tolerance: f64) -> Self {
        Self {
            pivot_tolerance: tolerance,
            ..Default::default()
        }
    }

    /// Set the relative singularity threshold
    pub fn with_pivot_threshold(mut self, threshold: f64) -> Self {
        self.pivot_threshold = threshold;
        self
    }
}

/// Metrics from LU factorization for diagnostics
#[derive(Debug, Clone)]
pub struct LuMetrics {
    /// Number of non-zeros in original matrix
    pub original_nnz: usize,

    /// Number of non-zeros in L factor (implicit unit diagonal excluded)
    pub l_nnz: usize,

    /// Number of non-zeros in U factor
    pub u_nnz: usize,

    /// Fill ratio: (l_nnz + u_nnz) / original_nnz
    pub fill_ratio: f64,

    /// Number of columns pivoted on a row other than the diagonal candidate
    pub row_swaps: usize,

    /// Pivot growth factor: max|U| / max|A|
    pub pivot_growth: f64,
}
