//! Batched sparse tensor

mod conversion;
mod core;

pub use core::SparseTensor;
