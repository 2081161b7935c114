//! Sparse LU Factorization
//!
//! Gilbert-Peierls left-looking algorithm for sparse LU factorization with
//! threshold partial pivoting: P·A·Q = L·U
//!
//! # Algorithm
//!
//! The Gilbert-Peierls algorithm processes the matrix column by column:
//!
//! ```text
//! For each column k = 0 to n-1 (in the order Q):
//!   1. Reach: DFS over the graph of L from the rows of A[:, q[k]]
//!   2. Sparse triangular solve: x = L \ A[:, q[k]] over the reach only
//!   3. Pivoting: p = argmax |x[i]| over unpivoted rows i
//!   4. Store: U[:, k] = x[pivoted rows], L[:, k] = x[unpivoted rows] / x[p]
//! ```
//!
//! The work per column is proportional to the floating point operations it
//! performs, not to `n`.
//!
//! # Kernel Operations
//!
//! - **scatter_column**: Copy sparse column into dense work vector
//! - **sparse_axpy**: work[i] -= scale * values[i] for sparse indices
//! - **Reach**: topologically ordered nonzero pattern of the triangular solve
//!
//! # Usage
//!
//! ```
//! use spsolve::algorithm::sparse_linalg::{
//!     ColamdOptions, ColumnOrdering, LuOptions, analyze, sparse_lu, sparse_lu_solve,
//! };
//! use spsolve::sparse::CooData;
//!
//! let a = CooData::from_slices(&[0, 1, 0], &[0, 1, 1], &[2.0, 4.0, 1.0], [2, 2])?.to_csc()?;
//! let symbolic = analyze(&a, ColumnOrdering::Colamd, &ColamdOptions::default())?;
//! let factors = sparse_lu(&a, &symbolic, &LuOptions::default())?;
//! let x = sparse_lu_solve(&factors, &[3.0, 4.0], 1)?;
//! assert!((x[1] - 1.0).abs() < 1e-12);
//! # Ok::<(), spsolve::error::Error>(())
//! ```

pub mod factor;
pub mod kernels;
pub mod solve;
pub mod types;

pub use types::{LuFactors, LuMetrics, LuOptions};

pub use factor::{sparse_lu, sparse_lu_with_metrics};
pub use solve::{solve_csc, solve_csc_with, sparse_lu_solve, sparse_lu_solve_into};
