//! Numerical algorithms
//!
//! - [`sparse_linalg`] - sparse LU direct solver: structural analysis,
//!   column ordering, Gilbert-Peierls factorization, triangular solves

pub mod sparse_linalg;
