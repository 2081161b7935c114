//! Symbolic analysis for sparse LU
//!
//! Everything about a factorization that depends only on where the nonzeros
//! are: the structural rank check and the fill-reducing column ordering.
//! The result is reusable for every matrix with the same pattern.

use crate::error::{Error, Result};
use crate::sparse::{CscData, PatternKey, SparseStorage};

use super::matching::hopcroft_karp;
use super::ordering::{ColamdOptions, ColumnOrdering};

/// Pattern-level analysis of a square sparse matrix
///
/// Keeps a copy of the pattern it was computed for, so applying it to a
/// different matrix is detected instead of silently producing garbage.
#[derive(Debug, Clone)]
pub struct LuSymbolic {
    /// Matrix dimension
    pub n: usize,

    /// Column permutation: `col_perm[k]` = original column at position k
    pub col_perm: Vec<usize>,

    /// Ordering the permutation was computed with
    pub ordering: ColumnOrdering,

    key: PatternKey,
    col_ptrs: Vec<usize>,
    row_indices: Vec<usize>,
}

impl LuSymbolic {
    /// Signature of the analyzed pattern
    pub fn pattern_key(&self) -> PatternKey {
        self.key
    }

    /// Whether `a` has exactly the analyzed pattern
    pub fn matches(&self, a: &CscData) -> bool {
        a.shape == [self.n, self.n]
            && a.col_ptrs == self.col_ptrs
            && a.row_indices == self.row_indices
    }

    /// Fail with `PatternMismatch` unless `a` has exactly the analyzed pattern
    pub fn verify(&self, a: &CscData) -> Result<()> {
        if self.matches(a) {
            return Ok(());
        }
        Err(Error::PatternMismatch {
            reason: format!(
                "analysis is for a {n}x{n} pattern with {} entries, got {:?} with {} entries",
                self.row_indices.len(),
                a.shape,
                a.nnz(),
                n = self.n,
            ),
        })
    }
}

/// Return `n` if `a` is an `n x n` matrix
pub fn validate_square(a: &CscData) -> Result<usize> {
    let [nrows, ncols] = a.shape;
    if nrows != ncols {
        return Err(Error::invalid_argument(
            "A",
            format!("expected a square matrix, got {nrows}x{ncols}"),
        ));
    }
    Ok(nrows)
}

/// Analyze the pattern of `a`
///
/// 1. Check squareness
/// 2. Structural rank via maximum matching; rank below `n` fails with
///    `StructurallySingular`, naming the first column left unmatched
/// 3. Column ordering
pub fn analyze(
    a: &CscData,
    ordering: ColumnOrdering,
    colamd_options: &ColamdOptions,
) -> Result<LuSymbolic> {
    let n = validate_square(a)?;

    let matching = hopcroft_karp(a);
    if matching.structural_rank < n {
        return Err(Error::StructurallySingular {
            column: matching.first_unmatched_col(),
            rank: matching.structural_rank,
        });
    }

    let col_perm = ordering.permutation(a, colamd_options);

    Ok(LuSymbolic {
        n,
        col_perm,
        ordering,
        key: a.pattern_key(),
        col_ptrs: a.col_ptrs.clone(),
        row_indices: a.row_indices.clone(),
    })
}
