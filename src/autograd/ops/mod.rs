//! Backward implementations for operations
//!
//! Each operation has a corresponding backward struct that implements
//! `GradFn` to compute gradients during the backward pass.
//!
//! # Structure
//!
//! - `sparse_solve`: batched sparse direct solve

mod sparse_solve;

pub use sparse_solve::*;
