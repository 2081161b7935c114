//! Sparse matrix storage for the solver
//!
//! # Sparse Formats
//!
//! - **COO** (Coordinate): `(row, col, value)` triplets, any order, duplicates
//!   allowed. The input format. O(nnz) storage.
//!
//! - **CSC** (Compressed Sparse Column): column pointers + sorted row indices.
//!   The format the factorization works on. O(nnz + ncols) storage.
//!
//! A batch of matrices travels as a [`SparseTensor`] of shape `[B, m, n]`,
//! split into one [`CooData`] per element before conversion.
//!
//! # Usage
//!
//! ```
//! use spsolve::sparse::{CooData, SparseStorage};
//!
//! let coo = CooData::from_slices(&[0, 1, 1], &[0, 0, 1], &[4.0, 1.0, 3.0], [2, 2])?;
//! let csc = coo.to_csc()?;
//! assert_eq!(csc.col_ptrs(), &[0, 2, 3]);
//! assert_eq!(csc.nnz(), 3);
//! # Ok::<(), spsolve::error::Error>(())
//! ```

mod coo;
mod csc;
mod format;
mod tensor;

pub use coo::{CooData, DuplicatePolicy};
pub use csc::{CscData, PatternKey};
pub use format::{SparseFormat, SparseStorage};
pub use tensor::SparseTensor;
