//! Differentiable operations
//!
//! Forward/backward pairs written as free functions with explicit saved
//! state. The autograd layer wraps them as [`GradFn`](crate::autograd::GradFn)
//! nodes; they are equally usable on their own.

pub mod sparse_solve;

pub use sparse_solve::{
    GradientPair, SavedState, SolveParams, sparse_solve, sparse_solve_backward,
    sparse_solve_forward, validate_solve_shapes,
};
