//! Core Tensor type

use super::{Shape, Storage, TensorId};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use std::fmt;

/// Dense, contiguous, row-major n-dimensional array on the host
///
/// `Tensor` consists of:
/// - **Storage**: reference-counted host buffer
/// - **Shape**: dimensions, last dimension fastest
/// - **DType**: element type (determined at runtime)
///
/// Cloning is cheap and keeps the id; `reshape` shares the buffer but
/// produces a new id.
///
/// # Example
///
/// ```
/// use spsolve::prelude::*;
///
/// let b = Tensor::try_from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[1, 2, 2])?;
/// assert_eq!(b.shape(), &[1, 2, 2]);
/// assert_eq!(b.to_vec::<f64>(), vec![1.0, 2.0, 3.0, 4.0]);
/// # Ok::<(), spsolve::error::Error>(())
/// ```
#[derive(Clone)]
pub struct Tensor {
    /// Unique ID for autograd tracking
    id: TensorId,
    storage: Storage,
    shape: Shape,
}

impl Tensor {
    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape` dimensions.
    /// For a fallible alternative, use [`Self::try_from_slice`].
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize]) -> Self {
        match Self::try_from_slice(data, shape) {
            Ok(tensor) => tensor,
            Err(e) => panic!("Tensor::from_slice failed: {e}"),
        }
    }

    /// Create a tensor from a slice of data (fallible version)
    ///
    /// Returns an error if `data.len()` does not equal the product of the
    /// `shape` dimensions.
    pub fn try_from_slice<T: Element>(data: &[T], shape: &[usize]) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        Ok(Self {
            id: TensorId::new(),
            storage: Storage::from_slice(data),
            shape: Shape::from(shape),
        })
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        let len: usize = shape.iter().product();
        Self {
            id: TensorId::new(),
            storage: Storage::zeroed(len, dtype),
            shape: Shape::from(shape),
        }
    }

    /// Create an `F64` tensor filled with `value`
    pub fn full(shape: &[usize], value: f64) -> Self {
        let len: usize = shape.iter().product();
        Self {
            id: TensorId::new(),
            storage: Storage::from_slice(&vec![value; len]),
            shape: Shape::from(shape),
        }
    }

    /// Get the tensor ID
    #[inline]
    pub fn id(&self) -> TensorId {
        self.id
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.shape.as_slice()
    }

    /// Get the shape as a [`Shape`]
    #[inline]
    pub fn dims(&self) -> &Shape {
        &self.shape
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.storage.len()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Borrow the elements as a typed slice
    ///
    /// Fails with `DTypeMismatch` if `T` is not the tensor's dtype.
    pub fn as_slice<T: Element>(&self) -> Result<&[T]> {
        self.storage.typed::<T>().ok_or(Error::DTypeMismatch {
            lhs: self.dtype(),
            rhs: T::DTYPE,
        })
    }

    /// Copy tensor data to a Vec
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the tensor's dtype.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        match self.as_slice::<T>() {
            Ok(data) => data.to_vec(),
            Err(e) => panic!("Tensor::to_vec failed: {e}"),
        }
    }

    /// Reshape to a new shape with the same number of elements (zero-copy)
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        let len: usize = shape.iter().product();
        if len != self.numel() {
            return Err(Error::shape_mismatch(shape, self.shape()));
        }

        Ok(Self {
            id: TensorId::new(),
            storage: self.storage.clone(),
            shape: Shape::from(shape),
        })
    }

    /// Elementwise sum of two `F64` tensors of identical shape
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        if self.shape() != other.shape() {
            return Err(Error::shape_mismatch(self.shape(), other.shape()));
        }
        if self.dtype() != other.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: self.dtype(),
                rhs: other.dtype(),
            });
        }
        let lhs = self
            .as_slice::<f64>()
            .map_err(|_| Error::unsupported_dtype(self.dtype(), "add"))?;
        let rhs = other.as_slice::<f64>()?;
        let sum: Vec<f64> = lhs.iter().zip(rhs).map(|(a, b)| a + b).collect();
        Tensor::try_from_slice(&sum, self.shape())
    }

    /// Whether two tensors share one buffer
    pub fn shares_storage(&self, other: &Tensor) -> bool {
        self.storage.ptr_eq(&other.storage)
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("dtype", &self.dtype())
            .finish()
    }
}
