//! Sparse format definitions and traits

/// Sparse matrix storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparseFormat {
    /// Coordinate format (COO)
    ///
    /// Stores explicit (row, col, value) triplets, possibly unsorted and with
    /// duplicates. This is the input format of the solver.
    Coo,

    /// Compressed Sparse Column (CSC)
    ///
    /// Column pointers + row indices + values, rows sorted and unique within
    /// each column. This is the format the factorization works on.
    Csc,
}

impl SparseFormat {
    /// Returns the format name as a string
    pub fn name(&self) -> &'static str {
        match self {
            SparseFormat::Coo => "COO",
            SparseFormat::Csc => "CSC",
        }
    }
}

impl std::fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Common interface of the 2-D sparse storage formats
pub trait SparseStorage {
    /// Returns the sparse format type
    fn format(&self) -> SparseFormat;

    /// Returns the shape as [nrows, ncols]
    fn shape(&self) -> [usize; 2];

    /// Returns the number of stored entries
    fn nnz(&self) -> usize;

    /// Returns the number of rows
    #[inline]
    fn nrows(&self) -> usize {
        self.shape()[0]
    }

    /// Returns the number of columns
    #[inline]
    fn ncols(&self) -> usize {
        self.shape()[1]
    }

    /// Returns true if the matrix is square
    #[inline]
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }

    /// Returns true if no entries are stored
    #[inline]
    fn is_empty(&self) -> bool {
        self.nnz() == 0
    }

    /// Fraction of positions that are not stored: 1 - nnz / (nrows * ncols)
    fn sparsity(&self) -> f64 {
        let total = self.nrows() * self.ncols();
        if total == 0 {
            return 1.0;
        }
        1.0 - self.nnz() as f64 / total as f64
    }
}
