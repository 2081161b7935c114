//! Batch orchestration
//!
//! Runs the COO→CSC conversion and the sparse direct solver for every
//! element of a batch, assembling the dense `[B, m, n]` result.
//!
//! - [`BatchSolver`] - per-element solve, parallel over the batch
//! - [`SymbolicCache`] - reuse of symbolic analyses across equal patterns
//! - [`SolveOptions`], [`FailurePolicy`] - configuration

mod cache;
mod options;
mod solver;

pub use cache::{CacheStats, SymbolicCache};
pub use options::{FailurePolicy, SolveOptions};
pub use solver::{BatchSolution, BatchSolver};
