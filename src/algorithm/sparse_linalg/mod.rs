//! Sparse direct solver
//!
//! # Pipeline
//!
//! 1. **Symbolic analysis** ([`analyze`]): squareness, structural rank by
//!    maximum matching, fill-reducing column ordering
//! 2. **Numeric factorization** ([`sparse_lu`]): P·A·Q = L·U
//! 3. **Triangular solves** ([`sparse_lu_solve`]): forward and back
//!    substitution per right-hand side column
//!
//! # Symbolic/Numeric Split
//!
//! The symbolic phase depends only on the sparsity pattern. For repeated
//! solves with one pattern (every element of a batch sharing a mask, or the
//! transposed systems of a backward pass) it can be computed once and
//! reused; [`LuSymbolic::verify`] guards against applying it to a matrix
//! with a different pattern.

pub mod lu;
pub mod matching;
pub mod ordering;
pub mod symbolic;

pub use lu::{
    LuFactors, LuMetrics, LuOptions, solve_csc, solve_csc_with, sparse_lu, sparse_lu_solve,
    sparse_lu_solve_into, sparse_lu_with_metrics,
};
pub use matching::{MatchingResult, hopcroft_karp, structural_rank};
pub use ordering::{ColamdOptions, ColamdStats, ColumnOrdering, colamd};
pub use symbolic::{LuSymbolic, analyze, validate_square};
