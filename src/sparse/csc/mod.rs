//! CSC (Compressed Sparse Column) sparse format

mod conversion;
mod core;
mod pattern;

pub use core::CscData;
pub use pattern::PatternKey;
