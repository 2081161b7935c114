//! SparseTensor conversions: dense, per-element COO, batch assembly

use super::SparseTensor;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::sparse::CooData;
use crate::tensor::Tensor;

impl SparseTensor {
    /// Create a sparse tensor holding every nonzero of a dense `F64` tensor
    ///
    /// Entries are emitted in row-major order of the dense tensor.
    pub fn from_dense(dense: &Tensor) -> Result<Self> {
        let data = dense
            .as_slice::<f64>()
            .map_err(|_| Error::unsupported_dtype(dense.dtype(), "SparseTensor::from_dense"))?;
        let shape = dense.shape();
        let ndim = shape.len();

        let positions: Vec<usize> = (0..data.len()).filter(|&p| data[p] != 0.0).collect();
        let nnz = positions.len();
        let mut indices = vec![0i64; ndim * nnz];
        for (k, &p) in positions.iter().enumerate() {
            let mut rem = p;
            for dim in (0..ndim).rev() {
                indices[dim * nnz + k] = (rem % shape[dim]) as i64;
                rem /= shape[dim];
            }
        }
        let values: Vec<f64> = positions.iter().map(|&p| data[p]).collect();

        Self::from_slices(&indices, &values, shape)
    }

    /// Stack same-shaped matrices into a `[B, m, n]` sparse tensor
    ///
    /// Entries keep their per-matrix order, batch element after batch
    /// element.
    pub fn from_batch(matrices: &[CooData]) -> Result<Self> {
        let Some(first) = matrices.first() else {
            return Err(Error::invalid_argument(
                "matrices",
                "cannot infer a shape from an empty batch",
            ));
        };
        let [m, n] = first.shape;

        let nnz: usize = matrices.iter().map(|coo| coo.values.len()).sum();
        let mut indices = vec![0i64; 3 * nnz];
        let mut values = Vec::with_capacity(nnz);
        let mut k = 0usize;
        for (b, coo) in matrices.iter().enumerate() {
            if coo.shape != first.shape {
                return Err(Error::shape_mismatch(&first.shape, &coo.shape).in_batch(b));
            }
            for (r, c, v) in coo.triplets() {
                indices[k] = b as i64;
                indices[nnz + k] = r as i64;
                indices[2 * nnz + k] = c as i64;
                values.push(v);
                k += 1;
            }
        }

        Self::from_slices(&indices, &values, &[matrices.len(), m, n])
    }

    /// Expand to a dense `F64` tensor, summing duplicates
    pub fn to_dense(&self) -> Result<Tensor> {
        let values = self.f64_values("SparseTensor::to_dense")?;
        let shape = self.shape();
        let ndim = shape.len();
        let nnz = self.nnz();
        let coords = self.indices().as_slice::<i64>()?;

        let mut dense = vec![0.0f64; shape.iter().product()];
        for (k, &v) in values.iter().enumerate() {
            let mut flat = 0usize;
            for dim in 0..ndim {
                flat = flat * shape[dim] + coords[dim * nnz + k] as usize;
            }
            dense[flat] += v;
        }

        Tensor::try_from_slice(&dense, shape)
    }

    /// Split a `[B, m, n]` tensor into one COO matrix per batch element
    ///
    /// Each matrix keeps the relative order of its entries.
    pub fn batch_elements(&self) -> Result<Vec<CooData>> {
        let Some((batch, m, n)) = self.dims_3d() else {
            return Err(Error::InvalidDimension {
                arg: "A",
                expected: 3,
                got: self.ndim(),
            });
        };
        let values = self.f64_values("SparseTensor::batch_elements")?;
        let (bs, rows, cols) = (self.coords(0)?, self.coords(1)?, self.coords(2)?);

        let mut counts = vec![0usize; batch];
        for &b in bs {
            counts[b as usize] += 1;
        }
        let mut elements: Vec<CooData> = counts
            .iter()
            .map(|&count| CooData {
                row_indices: Vec::with_capacity(count),
                col_indices: Vec::with_capacity(count),
                values: Vec::with_capacity(count),
                shape: [m, n],
            })
            .collect();

        for k in 0..values.len() {
            let coo = &mut elements[bs[k] as usize];
            coo.row_indices.push(rows[k]);
            coo.col_indices.push(cols[k]);
            coo.values.push(values[k]);
        }

        Ok(elements)
    }

    /// `(B, m, n)` if this tensor is 3-d
    pub(crate) fn dims_3d(&self) -> Option<(usize, usize, usize)> {
        match self.shape() {
            &[b, m, n] => Some((b, m, n)),
            _ => None,
        }
    }

    fn f64_values(&self, op: &'static str) -> Result<&[f64]> {
        if self.dtype() != DType::F64 {
            return Err(Error::unsupported_dtype(self.dtype(), op));
        }
        self.values().as_slice::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_round_trip() {
        let dense = Tensor::from_slice(
            &[1.0f64, 0.0, 0.0, 2.0, /* batch 1 */ 0.0, 3.0, 0.0, 0.0],
            &[2, 2, 2],
        );
        let sparse = SparseTensor::from_dense(&dense).unwrap();

        assert_eq!(sparse.nnz(), 3);
        assert_eq!(sparse.coords(0).unwrap(), &[0, 0, 1]);
        assert_eq!(sparse.coords(1).unwrap(), &[0, 1, 0]);
        assert_eq!(sparse.coords(2).unwrap(), &[0, 1, 1]);
        assert_eq!(
            sparse.to_dense().unwrap().to_vec::<f64>(),
            dense.to_vec::<f64>()
        );
    }

    #[test]
    fn test_to_dense_sums_duplicates() {
        let sparse =
            SparseTensor::from_slices(&[0, 0, 1, 1, 0, 0], &[1.5, 2.5], &[1, 2, 2]).unwrap();
        assert_eq!(
            sparse.to_dense().unwrap().to_vec::<f64>(),
            vec![0.0, 0.0, 4.0, 0.0]
        );
    }

    #[test]
    fn test_batch_split_and_stack() {
        // Interleaved batch order on input
        let sparse = SparseTensor::from_slices(
            &[1, 0, 1, /* rows */ 0, 1, 1, /* cols */ 1, 1, 0],
            &[3.0, 2.0, 4.0],
            &[2, 2, 2],
        )
        .unwrap();

        let elements = sparse.batch_elements().unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].values(), &[2.0]);
        assert_eq!(elements[1].row_indices(), &[0, 1]);
        assert_eq!(elements[1].col_indices(), &[1, 0]);
        assert_eq!(elements[1].values(), &[3.0, 4.0]);

        let stacked = SparseTensor::from_batch(&elements).unwrap();
        assert_eq!(stacked.shape(), &[2, 2, 2]);
        assert_eq!(
            stacked.to_dense().unwrap().to_vec::<f64>(),
            sparse.to_dense().unwrap().to_vec::<f64>()
        );
    }

    #[test]
    fn test_batch_elements_requires_3d() {
        let sparse = SparseTensor::from_slices(&[0, 1], &[1.0], &[2, 2]).unwrap();
        assert!(matches!(
            sparse.batch_elements(),
            Err(Error::InvalidDimension { expected: 3, got: 2, .. })
        ));
    }

    #[test]
    fn test_from_batch_rejects_mixed_shapes() {
        let a = CooData::empty([2, 2]);
        let b = CooData::empty([3, 3]);
        let err = SparseTensor::from_batch(&[a, b]).unwrap_err();
        assert!(matches!(err, Error::BatchElement { index: 1, .. }));
        assert!(SparseTensor::from_batch(&[]).is_err());
    }
}
