//! CSC format conversion and products: transpose, to_coo, to_dense, matmul_dense

use super::CscData;
use crate::error::{Error, Result};
use crate::sparse::CooData;

impl CscData {
    /// Transpose by counting scatter
    ///
    /// Rows of `self` become columns of the result. Walking the source
    /// columns in ascending order keeps the result's rows sorted, so no
    /// sort is needed.
    pub fn transpose(&self) -> CscData {
        let [nrows, ncols] = self.shape;
        let nnz = self.values.len();

        let mut col_ptrs = vec![0usize; nrows + 1];
        for &r in &self.row_indices {
            col_ptrs[r + 1] += 1;
        }
        for i in 0..nrows {
            col_ptrs[i + 1] += col_ptrs[i];
        }

        let mut cursor = col_ptrs[..nrows].to_vec();
        let mut row_indices = vec![0usize; nnz];
        let mut values = vec![0.0f64; nnz];
        for j in 0..ncols {
            let (rows, vals) = self.column(j);
            for (&r, &v) in rows.iter().zip(vals) {
                let slot = cursor[r];
                row_indices[slot] = j;
                values[slot] = v;
                cursor[r] += 1;
            }
        }

        CscData::from_parts_unchecked(col_ptrs, row_indices, values, [ncols, nrows])
    }

    /// Convert to COO, column-major entry order
    pub fn to_coo(&self) -> CooData {
        let nnz = self.values.len();
        let mut rows = Vec::with_capacity(nnz);
        let mut cols = Vec::with_capacity(nnz);
        for j in 0..self.shape[1] {
            let (col_rows, _) = self.column(j);
            for &r in col_rows {
                rows.push(r as i64);
                cols.push(j as i64);
            }
        }

        CooData {
            row_indices: rows,
            col_indices: cols,
            values: self.values.clone(),
            shape: self.shape,
        }
    }

    /// Expand to a row-major dense buffer
    pub fn to_dense(&self) -> Vec<f64> {
        let [nrows, ncols] = self.shape;
        let mut dense = vec![0.0f64; nrows * ncols];
        for j in 0..ncols {
            let (rows, vals) = self.column(j);
            for (&r, &v) in rows.iter().zip(vals) {
                dense[r * ncols + j] = v;
            }
        }
        dense
    }

    /// Sparse-dense product `A * X`
    ///
    /// `x` is row-major `[ncols, k]`; the result is row-major `[nrows, k]`.
    pub fn matmul_dense(&self, x: &[f64], k: usize) -> Result<Vec<f64>> {
        let [nrows, ncols] = self.shape;
        if x.len() != ncols * k {
            return Err(Error::shape_mismatch(&[ncols, k], &[x.len()]));
        }

        let mut out = vec![0.0f64; nrows * k];
        for j in 0..ncols {
            let x_row = &x[j * k..(j + 1) * k];
            let (rows, vals) = self.column(j);
            for (&r, &v) in rows.iter().zip(vals) {
                let out_row = &mut out[r * k..(r + 1) * k];
                for (o, &xv) in out_row.iter_mut().zip(x_row) {
                    *o += v * xv;
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CscData {
        // [1 0 2]
        // [0 3 0]
        CscData::new(vec![0, 1, 2, 3], vec![0, 1, 0], vec![1.0, 3.0, 2.0], [2, 3]).unwrap()
    }

    #[test]
    fn test_transpose() {
        let t = sample().transpose();

        assert_eq!(t.shape, [3, 2]);
        assert_eq!(t.col_ptrs(), &[0, 2, 3]);
        assert_eq!(t.row_indices(), &[0, 2, 1]);
        assert_eq!(t.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(t.transpose(), sample());
    }

    #[test]
    fn test_to_coo_round_trip() {
        let csc = sample();
        let back = csc.to_coo().to_csc().unwrap();
        assert_eq!(back, csc);
    }

    #[test]
    fn test_to_dense() {
        assert_eq!(sample().to_dense(), vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_matmul_dense() {
        // X = [[1, 0], [0, 1], [1, 1]]
        let x = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let y = sample().matmul_dense(&x, 2).unwrap();
        assert_eq!(y, vec![3.0, 2.0, 0.0, 3.0]);
        assert!(sample().matmul_dense(&x[..4], 2).is_err());
    }
}
