//! COO format conversion: to_csc, to_dense

use super::CooData;
use crate::error::{Error, Result};
use crate::sparse::CscData;

/// How repeated `(row, col)` coordinates are treated when compressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DuplicatePolicy {
    /// Accumulate all values for one coordinate into a single slot
    #[default]
    Sum,
    /// Fail with [`Error::DuplicateEntry`] on the first repeated coordinate
    Reject,
}

impl CooData {
    /// Convert to CSC format, summing duplicate entries
    ///
    /// Equivalent to `to_csc_with(DuplicatePolicy::Sum)`.
    pub fn to_csc(&self) -> Result<CscData> {
        self.to_csc_with(DuplicatePolicy::Sum)
    }

    /// Convert to CSC format with an explicit duplicate policy
    ///
    /// This is a counting conversion, `O(nnz + nrows + ncols)`, with no
    /// comparison sort:
    /// 1. Bucket entries by row (stable, so input order survives within a row)
    /// 2. Count entries per column and prefix-sum into column pointers
    /// 3. Walk the row buckets in ascending row order and scatter each entry
    ///    into its column, so every column comes out sorted by row
    /// 4. Duplicates are now adjacent within their column and are merged or
    ///    rejected according to `policy`
    ///
    /// Summed duplicates are accumulated in input order.
    pub fn to_csc_with(&self, policy: DuplicatePolicy) -> Result<CscData> {
        let [nrows, ncols] = self.shape;
        let nnz = self.values.len();

        // Handle empty case
        if nnz == 0 {
            return Ok(CscData::empty(self.shape));
        }

        // Row buckets
        let mut row_ptrs = vec![0usize; nrows + 1];
        for &r in &self.row_indices {
            row_ptrs[r as usize + 1] += 1;
        }
        for i in 0..nrows {
            row_ptrs[i + 1] += row_ptrs[i];
        }
        let mut row_cursor = row_ptrs[..nrows].to_vec();
        let mut by_row = vec![0usize; nnz];
        for (entry, &r) in self.row_indices.iter().enumerate() {
            let r = r as usize;
            by_row[row_cursor[r]] = entry;
            row_cursor[r] += 1;
        }

        // Column pointers
        let mut col_ptrs = vec![0usize; ncols + 1];
        for &c in &self.col_indices {
            col_ptrs[c as usize + 1] += 1;
        }
        for j in 0..ncols {
            col_ptrs[j + 1] += col_ptrs[j];
        }

        // Scatter in ascending row order
        let mut col_cursor = col_ptrs[..ncols].to_vec();
        let mut row_indices = vec![0usize; nnz];
        let mut values = vec![0.0f64; nnz];
        for &entry in &by_row {
            let c = self.col_indices[entry] as usize;
            let slot = col_cursor[c];
            row_indices[slot] = self.row_indices[entry] as usize;
            values[slot] = self.values[entry];
            col_cursor[c] += 1;
        }

        // Merge adjacent duplicates in place
        let mut write = 0usize;
        let mut read_start = 0usize;
        for j in 0..ncols {
            let read_end = col_ptrs[j + 1];
            let col_start = write;
            for k in read_start..read_end {
                let row = row_indices[k];
                if write > col_start && row_indices[write - 1] == row {
                    match policy {
                        DuplicatePolicy::Sum => values[write - 1] += values[k],
                        DuplicatePolicy::Reject => {
                            return Err(Error::DuplicateEntry { row, col: j });
                        }
                    }
                } else {
                    row_indices[write] = row;
                    values[write] = values[k];
                    write += 1;
                }
            }
            read_start = read_end;
            col_ptrs[j + 1] = write;
        }
        row_indices.truncate(write);
        values.truncate(write);

        Ok(CscData::from_parts_unchecked(
            col_ptrs,
            row_indices,
            values,
            self.shape,
        ))
    }

    /// Expand to a row-major dense buffer, summing duplicates
    pub fn to_dense(&self) -> Vec<f64> {
        let [nrows, ncols] = self.shape;
        let mut dense = vec![0.0f64; nrows * ncols];
        for (r, c, v) in self.triplets() {
            dense[r * ncols + c] += v;
        }
        dense
    }
}
