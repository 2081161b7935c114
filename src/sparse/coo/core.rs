//! Core COO implementation: struct, creation, getters

use crate::error::{Error, Result};

use super::super::format::{SparseFormat, SparseStorage};

/// COO (Coordinate) sparse matrix data
///
/// Three parallel sequences of equal length: row index, column index, value.
/// Entries may appear in any order and the same `(row, col)` may appear more
/// than once; how duplicates are treated is decided at conversion time (see
/// [`DuplicatePolicy`](super::DuplicatePolicy)). Indices are validated on
/// construction, so every stored index is in range.
#[derive(Debug, Clone, PartialEq)]
pub struct CooData {
    pub(crate) row_indices: Vec<i64>,
    pub(crate) col_indices: Vec<i64>,
    pub(crate) values: Vec<f64>,
    pub(crate) shape: [usize; 2],
}

impl CooData {
    /// Create a new COO matrix from owned components
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Arrays have different lengths
    /// - An index is negative or out of bounds for `shape`
    pub fn new(
        row_indices: Vec<i64>,
        col_indices: Vec<i64>,
        values: Vec<f64>,
        shape: [usize; 2],
    ) -> Result<Self> {
        let nnz = values.len();
        if row_indices.len() != nnz {
            return Err(Error::ShapeMismatch {
                expected: vec![nnz],
                got: vec![row_indices.len()],
            });
        }
        if col_indices.len() != nnz {
            return Err(Error::ShapeMismatch {
                expected: vec![nnz],
                got: vec![col_indices.len()],
            });
        }

        check_indices(&row_indices, shape[0])?;
        check_indices(&col_indices, shape[1])?;

        Ok(Self {
            row_indices,
            col_indices,
            values,
            shape,
        })
    }

    /// Create COO matrix from borrowed slices
    ///
    /// # Arguments
    ///
    /// * `rows` - Row indices
    /// * `cols` - Column indices
    /// * `values` - Entry values
    /// * `shape` - Matrix shape [nrows, ncols]
    pub fn from_slices(
        rows: &[i64],
        cols: &[i64],
        values: &[f64],
        shape: [usize; 2],
    ) -> Result<Self> {
        Self::new(rows.to_vec(), cols.to_vec(), values.to_vec(), shape)
    }

    /// Create a COO matrix holding every nonzero of a row-major dense matrix
    pub fn from_dense(data: &[f64], shape: [usize; 2]) -> Result<Self> {
        let [nrows, ncols] = shape;
        if data.len() != nrows * ncols {
            return Err(Error::shape_mismatch(&[nrows, ncols], &[data.len()]));
        }

        let mut rows = Vec::new();
        let mut cols = Vec::new();
        let mut values = Vec::new();
        for (idx, &v) in data.iter().enumerate() {
            if v != 0.0 {
                rows.push((idx / ncols) as i64);
                cols.push((idx % ncols) as i64);
                values.push(v);
            }
        }

        Ok(Self {
            row_indices: rows,
            col_indices: cols,
            values,
            shape,
        })
    }

    /// Create an empty COO matrix
    pub fn empty(shape: [usize; 2]) -> Self {
        Self {
            row_indices: Vec::new(),
            col_indices: Vec::new(),
            values: Vec::new(),
            shape,
        }
    }

    /// Returns the row indices
    pub fn row_indices(&self) -> &[i64] {
        &self.row_indices
    }

    /// Returns the column indices
    pub fn col_indices(&self) -> &[i64] {
        &self.col_indices
    }

    /// Returns the values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(row, col, value)` triplets in storage order
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.row_indices
            .iter()
            .zip(&self.col_indices)
            .zip(&self.values)
            .map(|((&r, &c), &v)| (r as usize, c as usize, v))
    }
}

fn check_indices(indices: &[i64], size: usize) -> Result<()> {
    match indices.iter().find(|&&i| i < 0 || i as usize >= size) {
        Some(&index) => Err(Error::IndexOutOfBounds { index, size }),
        None => Ok(()),
    }
}

impl SparseStorage for CooData {
    fn format(&self) -> SparseFormat {
        SparseFormat::Coo
    }

    fn shape(&self) -> [usize; 2] {
        self.shape
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coo_creation() {
        let coo = CooData::from_slices(&[0, 1, 2], &[1, 0, 2], &[1.0, 2.0, 3.0], [3, 3]).unwrap();

        assert_eq!(coo.nnz(), 3);
        assert_eq!(coo.shape(), [3, 3]);
        assert!(coo.is_square());
        assert_eq!(
            coo.triplets().collect::<Vec<_>>(),
            vec![(0, 1, 1.0), (1, 0, 2.0), (2, 2, 3.0)]
        );
    }

    #[test]
    fn test_coo_empty() {
        let coo = CooData::empty([100, 100]);

        assert_eq!(coo.nnz(), 0);
        assert!(coo.is_empty());
        assert_eq!(coo.sparsity(), 1.0);
    }

    #[test]
    fn test_coo_rejects_out_of_range() {
        let err = CooData::from_slices(&[0, 3], &[0, 0], &[1.0, 2.0], [3, 3]).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 3, size: 3 }));

        let err = CooData::from_slices(&[0], &[-1], &[1.0], [3, 3]).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: -1, size: 3 }));
    }

    #[test]
    fn test_coo_rejects_length_mismatch() {
        let err = CooData::from_slices(&[0, 1], &[0], &[1.0, 2.0], [2, 2]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_from_dense_skips_zeros() {
        let coo = CooData::from_dense(&[1.0, 0.0, 0.0, 4.0, 0.0, 6.0], [2, 3]).unwrap();
        assert_eq!(coo.row_indices(), &[0, 1, 1]);
        assert_eq!(coo.col_indices(), &[0, 0, 2]);
        assert_eq!(coo.values(), &[1.0, 4.0, 6.0]);
    }
}
