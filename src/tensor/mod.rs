//! Tensor types
//!
//! This module provides the host-resident dense `Tensor` that carries
//! right-hand sides, solutions and gradients in and out of the solver.

mod core;
mod id;
mod shape;
mod storage;

pub use core::Tensor;
pub use id::TensorId;
pub use shape::Shape;
pub(crate) use storage::Storage;
