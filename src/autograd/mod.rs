//! Automatic differentiation (autograd)
//!
//! A minimal reverse-mode graph, enough to register the sparse solve as a
//! differentiable operation and to chain it with itself.
//!
//! - [`Var`] - a dense or sparse [`Value`] with an optional [`GradFn`]
//! - [`GradStore`] - gradients by id, accumulated across uses
//! - [`backward`] - reverse topological traversal from a seeded root
//! - [`var_sparse_solve`] - the solve as a graph node

mod backward;
mod grad_fn;
mod grad_store;
mod var;

pub mod ops;

pub use backward::backward;
pub use grad_fn::GradFn;
pub use grad_store::GradStore;
pub use ops::{SparseSolveBackward, var_sparse_solve};
pub use var::{Value, Var};
