//! Sparse matrix column ordering.
//!
//! Column orderings to limit fill-in during sparse LU. These operate on the
//! sparsity structure only, so one ordering serves every matrix sharing a
//! pattern.
//!
//! # Algorithms
//!
//! - **COLAMD**: Column Approximate Minimum Degree ordering for LU/QR

pub mod colamd;

pub use colamd::{ColamdOptions, ColamdStats, colamd};

use crate::sparse::CscData;

/// Column permutation applied before numeric factorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnOrdering {
    /// Keep the columns in their original order
    Natural,
    /// Column approximate minimum degree
    #[default]
    Colamd,
}

impl ColumnOrdering {
    /// Compute the permutation for `a`: `perm[k]` is the original column
    /// placed at position `k`.
    pub fn permutation(self, a: &CscData, options: &ColamdOptions) -> Vec<usize> {
        match self {
            ColumnOrdering::Natural => (0..a.shape[1]).collect(),
            ColumnOrdering::Colamd => colamd(a, options).0,
        }
    }
}
