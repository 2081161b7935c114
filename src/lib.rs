//! # spsolve
//!
//! **Batched, differentiable sparse direct solver for Rust.**
//!
//! spsolve solves batches of sparse linear systems `A X = B` with a sparse
//! LU factorization and computes gradients of the solution with respect to
//! the stored entries of `A` and to `B`, so the solve can sit inside a
//! gradient-based optimization loop.
//!
//! ## Features
//!
//! - **COO→CSC conversion**: counting sort, duplicates summed or rejected
//! - **Sparse LU**: structural rank check, COLAMD ordering, Gilbert-Peierls
//!   factorization with threshold partial pivoting
//! - **Batching**: elements solved in parallel, symbolic analysis shared
//!   between elements with one sparsity pattern
//! - **Gradients**: adjoint solve on the transposed system, gradient for `A`
//!   restricted to its stored entries
//! - **Autograd**: a minimal reverse-mode graph wrapping the solve
//!
//! ## Quick Start
//!
//! ```rust
//! use spsolve::prelude::*;
//!
//! // Batch of one 2x2 system: [[4, 1], [0, 2]] x = [6, 4]
//! let a = SparseTensor::from_slices(
//!     &[0, 0, 0, 0, 0, 1, 0, 1, 1],
//!     &[4.0, 1.0, 2.0],
//!     &[1, 2, 2],
//! )?;
//! let b = Tensor::from_slice(&[6.0f64, 4.0], &[1, 2, 1]);
//!
//! let solver = BatchSolver::default();
//! let (x, saved) = sparse_solve_forward(&a, &b, &solver)?;
//! assert_eq!(x.to_vec::<f64>(), vec![1.0, 2.0]);
//!
//! let grads = sparse_solve_backward(&Tensor::full(&[1, 2, 1], 1.0), saved, &solver)?;
//! assert_eq!(grads.grad_a.nnz(), a.nnz());
//! # Ok::<(), spsolve::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Multi-threaded batch solving

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod algorithm;
pub mod autograd;
pub mod batch;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod sparse;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::autograd::{GradStore, Value, Var, backward, var_sparse_solve};
    pub use crate::batch::{BatchSolution, BatchSolver, FailurePolicy, SolveOptions};
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::ops::{
        GradientPair, SavedState, sparse_solve, sparse_solve_backward, sparse_solve_forward,
    };
    pub use crate::sparse::{CooData, CscData, DuplicatePolicy, SparseTensor};
    pub use crate::tensor::Tensor;
}
