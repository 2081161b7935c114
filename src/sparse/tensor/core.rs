//! Core SparseTensor implementation: struct, creation, properties

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::tensor::{Shape, Tensor, TensorId};

/// Batched sparse tensor in coordinate form
///
/// The layout a differentiation framework hands over: an `I64` index tensor
/// of shape `[ndim, nnz]` (row `d` holds the coordinates along dimension
/// `d`) and a values tensor of shape `[nnz]`. A batch of matrices is the
/// 3-d case `[B, m, n]`, with index rows (batch, row, col).
///
/// Entries are kept in the order given, duplicates included; that order is
/// what gradients with respect to the values refer to.
///
/// # Example
///
/// ```
/// use spsolve::prelude::*;
///
/// // One 2x2 diagonal matrix in a batch of size 1
/// let a = SparseTensor::from_slices(
///     &[0, 0, /* rows */ 0, 1, /* cols */ 0, 1],
///     &[2.0, 4.0],
///     &[1, 2, 2],
/// )?;
/// assert_eq!(a.nnz(), 2);
/// assert_eq!(a.to_dense()?.to_vec::<f64>(), vec![2.0, 0.0, 0.0, 4.0]);
/// # Ok::<(), spsolve::error::Error>(())
/// ```
#[derive(Clone)]
pub struct SparseTensor {
    id: TensorId,
    indices: Tensor,
    values: Tensor,
    shape: Shape,
}

impl SparseTensor {
    /// Create a sparse tensor from index and value tensors
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `indices` is not `I64` or not of shape `[shape.len(), nnz]`
    /// - `values` is not 1-d of length `nnz`
    /// - any coordinate is out of range for `shape`
    ///
    /// The value dtype is not restricted here; operations that compute
    /// check it themselves.
    pub fn new(indices: Tensor, values: Tensor, shape: &[usize]) -> Result<Self> {
        if indices.dtype() != DType::I64 {
            return Err(Error::DTypeMismatch {
                lhs: DType::I64,
                rhs: indices.dtype(),
            });
        }
        if values.ndim() != 1 {
            return Err(Error::InvalidDimension {
                arg: "values",
                expected: 1,
                got: values.ndim(),
            });
        }

        let nnz = values.numel();
        let ndim = shape.len();
        if indices.shape() != [ndim, nnz] {
            return Err(Error::shape_mismatch(&[ndim, nnz], indices.shape()));
        }

        let coords = indices.as_slice::<i64>()?;
        if nnz > 0 {
            for (dim, row) in coords.chunks_exact(nnz).enumerate() {
                let size = shape[dim];
                if let Some(&index) = row.iter().find(|&&i| i < 0 || i as usize >= size) {
                    return Err(Error::IndexOutOfBounds { index, size });
                }
            }
        }

        Ok(Self {
            id: TensorId::new(),
            indices,
            values,
            shape: Shape::from(shape),
        })
    }

    /// Create a sparse tensor from host slices
    ///
    /// `indices` is the row-major `[shape.len(), nnz]` coordinate block.
    pub fn from_slices(indices: &[i64], values: &[f64], shape: &[usize]) -> Result<Self> {
        let nnz = values.len();
        let indices = Tensor::try_from_slice(indices, &[shape.len(), nnz])?;
        let values = Tensor::try_from_slice(values, &[nnz])?;
        Self::new(indices, values, shape)
    }

    /// Unique ID for autograd tracking
    #[inline]
    pub fn id(&self) -> TensorId {
        self.id
    }

    /// The `[ndim, nnz]` index tensor
    #[inline]
    pub fn indices(&self) -> &Tensor {
        &self.indices
    }

    /// The `[nnz]` values tensor
    #[inline]
    pub fn values(&self) -> &Tensor {
        &self.values
    }

    /// Dense shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.shape.as_slice()
    }

    /// Number of dimensions of the dense shape
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Number of stored entries, duplicates included
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.numel()
    }

    /// Element type of the values
    #[inline]
    pub fn dtype(&self) -> DType {
        self.values.dtype()
    }

    /// Coordinates along dimension `dim`, one per stored entry
    pub fn coords(&self, dim: usize) -> Result<&[i64]> {
        if dim >= self.ndim() {
            return Err(Error::IndexOutOfBounds {
                index: dim as i64,
                size: self.ndim(),
            });
        }
        let nnz = self.nnz();
        let all = self.indices.as_slice::<i64>()?;
        Ok(&all[dim * nnz..(dim + 1) * nnz])
    }

    /// Same coordinates with new values
    ///
    /// The result shares the index buffer with `self` and gets a new id.
    pub fn with_values(&self, values: Tensor) -> Result<Self> {
        if values.shape() != [self.nnz()] {
            return Err(Error::shape_mismatch(&[self.nnz()], values.shape()));
        }
        Ok(Self {
            id: TensorId::new(),
            indices: self.indices.clone(),
            values,
            shape: self.shape.clone(),
        })
    }

    /// Whether `other` stores exactly the same coordinates in the same order
    pub fn same_pattern(&self, other: &SparseTensor) -> bool {
        if self.shape != other.shape || self.indices.shape() != other.indices.shape() {
            return false;
        }
        if self.indices.shares_storage(&other.indices) {
            return true;
        }
        matches!(
            (self.indices.as_slice::<i64>(), other.indices.as_slice::<i64>()),
            (Ok(a), Ok(b)) if a == b
        )
    }

    /// Sum of two sparse tensors with identical patterns
    pub fn add(&self, other: &SparseTensor) -> Result<Self> {
        if !self.same_pattern(other) {
            return Err(Error::PatternMismatch {
                reason: format!(
                    "cannot add sparse tensors with different coordinates (shape {:?}, nnz {} vs shape {:?}, nnz {})",
                    self.shape(),
                    self.nnz(),
                    other.shape(),
                    other.nnz()
                ),
            });
        }
        self.with_values(self.values.add(&other.values)?)
    }
}

impl std::fmt::Debug for SparseTensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseTensor")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("nnz", &self.nnz())
            .field("dtype", &self.dtype())
            .finish()
    }
}

impl std::fmt::Display for SparseTensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SparseTensor({:?}, nnz={}, dtype={})",
            self.shape(),
            self.nnz(),
            self.dtype()
        )
    }
}
