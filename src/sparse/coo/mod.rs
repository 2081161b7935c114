//! COO (Coordinate) sparse format

mod conversion;
mod core;

pub use conversion::DuplicatePolicy;
pub use core::CooData;
