//! Core CSC implementation: struct, creation, getters

use crate::error::{Error, Result};

use super::super::format::{SparseFormat, SparseStorage};

/// CSC (Compressed Sparse Column) sparse matrix data
///
/// Invariants, checked by [`CscData::new`]:
/// - `col_ptrs.len() == ncols + 1`, `col_ptrs[0] == 0`, non-decreasing,
///   `col_ptrs[ncols] == nnz`
/// - row indices within each column are strictly increasing and `< nrows`
/// - `values` is aligned with `row_indices`
///
/// Indices are `usize` here: a `CscData` is always produced from validated
/// input, either by the COO converter or by [`CscData::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct CscData {
    pub(crate) col_ptrs: Vec<usize>,
    pub(crate) row_indices: Vec<usize>,
    pub(crate) values: Vec<f64>,
    pub(crate) shape: [usize; 2],
}

impl CscData {
    /// Create a new CSC matrix from components
    pub fn new(
        col_ptrs: Vec<usize>,
        row_indices: Vec<usize>,
        values: Vec<f64>,
        shape: [usize; 2],
    ) -> Result<Self> {
        let [nrows, ncols] = shape;
        let nnz = values.len();

        if col_ptrs.len() != ncols + 1 {
            return Err(Error::ShapeMismatch {
                expected: vec![ncols + 1],
                got: vec![col_ptrs.len()],
            });
        }
        if row_indices.len() != nnz {
            return Err(Error::ShapeMismatch {
                expected: vec![nnz],
                got: vec![row_indices.len()],
            });
        }
        if col_ptrs[0] != 0 || col_ptrs[ncols] != nnz {
            return Err(Error::invalid_argument(
                "col_ptrs",
                format!(
                    "must start at 0 and end at nnz = {nnz}, got [{}, .., {}]",
                    col_ptrs[0], col_ptrs[ncols]
                ),
            ));
        }

        for j in 0..ncols {
            let (start, end) = (col_ptrs[j], col_ptrs[j + 1]);
            if start > end {
                return Err(Error::invalid_argument(
                    "col_ptrs",
                    format!("decreases at column {j}"),
                ));
            }
            if end > nnz {
                return Err(Error::invalid_argument(
                    "col_ptrs",
                    format!("column {j} ends at {end}, past nnz = {nnz}"),
                ));
            }
            let rows = &row_indices[start..end];
            for (k, &row) in rows.iter().enumerate() {
                if row >= nrows {
                    return Err(Error::IndexOutOfBounds {
                        index: row as i64,
                        size: nrows,
                    });
                }
                if k > 0 && rows[k - 1] >= row {
                    return Err(Error::invalid_argument(
                        "row_indices",
                        format!("not strictly increasing in column {j}"),
                    ));
                }
            }
        }

        Ok(Self::from_parts_unchecked(
            col_ptrs,
            row_indices,
            values,
            shape,
        ))
    }

    /// Assemble from components already known to satisfy the invariants
    pub(crate) fn from_parts_unchecked(
        col_ptrs: Vec<usize>,
        row_indices: Vec<usize>,
        values: Vec<f64>,
        shape: [usize; 2],
    ) -> Self {
        debug_assert_eq!(col_ptrs.len(), shape[1] + 1);
        debug_assert_eq!(row_indices.len(), values.len());
        Self {
            col_ptrs,
            row_indices,
            values,
            shape,
        }
    }

    /// Create an empty CSC matrix
    pub fn empty(shape: [usize; 2]) -> Self {
        Self {
            col_ptrs: vec![0; shape[1] + 1],
            row_indices: Vec::new(),
            values: Vec::new(),
            shape,
        }
    }

    /// Returns the column pointers
    pub fn col_ptrs(&self) -> &[usize] {
        &self.col_ptrs
    }

    /// Returns the row indices
    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    /// Returns the values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Row indices and values of column `j`
    #[inline]
    pub fn column(&self, j: usize) -> (&[usize], &[f64]) {
        let range = self.col_ptrs[j]..self.col_ptrs[j + 1];
        (&self.row_indices[range.clone()], &self.values[range])
    }

    /// Value at `(row, col)`, zero if not stored
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let (rows, values) = self.column(col);
        match rows.binary_search(&row) {
            Ok(k) => values[k],
            Err(_) => 0.0,
        }
    }

    /// Same pattern with new values
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        if values.len() != self.values.len() {
            return Err(Error::shape_mismatch(&[self.values.len()], &[values.len()]));
        }
        Ok(Self {
            col_ptrs: self.col_ptrs.clone(),
            row_indices: self.row_indices.clone(),
            values,
            shape: self.shape,
        })
    }

    /// Whether `other` has exactly the same shape and stored positions
    pub fn same_pattern(&self, other: &CscData) -> bool {
        self.shape == other.shape
            && self.col_ptrs == other.col_ptrs
            && self.row_indices == other.row_indices
    }

    /// Largest stored magnitude, zero for an empty matrix
    pub fn max_abs(&self) -> f64 {
        self.values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()))
    }
}

impl SparseStorage for CscData {
    fn format(&self) -> SparseFormat {
        SparseFormat::Csc
    }

    fn shape(&self) -> [usize; 2] {
        self.shape
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }
}
