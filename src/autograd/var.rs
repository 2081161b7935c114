//! Variable: value with gradient tracking

use super::GradFn;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::sparse::SparseTensor;
use crate::tensor::{Tensor, TensorId};
use std::sync::Arc;

/// A value flowing through the graph: dense or sparse
#[derive(Clone, Debug)]
pub enum Value {
    /// Dense tensor
    Dense(Tensor),
    /// Batched COO tensor
    Sparse(SparseTensor),
}

impl Value {
    /// ID of the underlying tensor
    pub fn id(&self) -> TensorId {
        match self {
            Value::Dense(t) => t.id(),
            Value::Sparse(s) => s.id(),
        }
    }

    /// Dense shape
    pub fn shape(&self) -> &[usize] {
        match self {
            Value::Dense(t) => t.shape(),
            Value::Sparse(s) => s.shape(),
        }
    }

    /// Element type of the (stored) values
    pub fn dtype(&self) -> DType {
        match self {
            Value::Dense(t) => t.dtype(),
            Value::Sparse(s) => s.dtype(),
        }
    }

    /// `"dense"` or `"sparse"`
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Dense(_) => "dense",
            Value::Sparse(_) => "sparse",
        }
    }

    /// Whether this is a sparse value
    pub fn is_sparse(&self) -> bool {
        matches!(self, Value::Sparse(_))
    }

    /// The dense tensor, if dense
    pub fn as_dense(&self) -> Option<&Tensor> {
        match self {
            Value::Dense(t) => Some(t),
            Value::Sparse(_) => None,
        }
    }

    /// The sparse tensor, if sparse
    pub fn as_sparse(&self) -> Option<&SparseTensor> {
        match self {
            Value::Sparse(s) => Some(s),
            Value::Dense(_) => None,
        }
    }

    /// Elementwise sum, used for gradient accumulation
    ///
    /// Dense values must have equal shapes; sparse values must have
    /// identical patterns.
    pub fn add(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Dense(a), Value::Dense(b)) => a.add(b).map(Value::Dense),
            (Value::Sparse(a), Value::Sparse(b)) => a.add(b).map(Value::Sparse),
            _ => Err(Error::invalid_argument(
                "other",
                format!("cannot add a {} value to a {} value", other.kind(), self.kind()),
            )),
        }
    }
}

impl From<Tensor> for Value {
    fn from(t: Tensor) -> Self {
        Value::Dense(t)
    }
}

impl From<SparseTensor> for Value {
    fn from(s: SparseTensor) -> Self {
        Value::Sparse(s)
    }
}

/// A value that tracks gradients for automatic differentiation
///
/// `Var` wraps a [`Value`] and optionally records how it was created
/// (via `grad_fn`), enabling reverse-mode autodiff. Leaves take the id of
/// their value, so gradients can be looked up by either.
#[derive(Clone)]
pub struct Var {
    value: Value,
    id: TensorId,
    requires_grad: bool,
    grad_fn: Option<Arc<dyn GradFn>>,
}

impl Var {
    /// Create a leaf variable (no gradient function)
    pub fn new(value: impl Into<Value>, requires_grad: bool) -> Self {
        let value = value.into();
        Self {
            id: value.id(),
            value,
            requires_grad,
            grad_fn: None,
        }
    }

    /// Create from an operation result with a gradient function
    pub fn from_op(value: impl Into<Value>, grad_fn: Arc<dyn GradFn>) -> Self {
        Self {
            value: value.into(),
            id: TensorId::new(),
            requires_grad: true,
            grad_fn: Some(grad_fn),
        }
    }

    /// Get the variable ID
    #[inline]
    pub fn id(&self) -> TensorId {
        self.id
    }

    /// Access the underlying value
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The dense tensor, if this variable is dense
    #[inline]
    pub fn tensor(&self) -> Option<&Tensor> {
        self.value.as_dense()
    }

    /// The sparse tensor, if this variable is sparse
    #[inline]
    pub fn sparse(&self) -> Option<&SparseTensor> {
        self.value.as_sparse()
    }

    /// Check if this variable requires gradients
    #[inline]
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Get the gradient function (if any)
    #[inline]
    pub fn grad_fn(&self) -> Option<&Arc<dyn GradFn>> {
        self.grad_fn.as_ref()
    }

    /// Detach from the computation graph
    pub fn detach(&self) -> Self {
        Self {
            value: self.value.clone(),
            id: TensorId::new(),
            requires_grad: false,
            grad_fn: None,
        }
    }

    /// Set requires_grad flag
    pub fn set_requires_grad(&mut self, requires_grad: bool) {
        self.requires_grad = requires_grad;
        if !requires_grad {
            self.grad_fn = None;
        }
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.value.shape()
    }

    /// Get the number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.value.shape().len()
    }
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var")
            .field("id", &self.id)
            .field("kind", &self.value.kind())
            .field("shape", &self.value.shape())
            .field("requires_grad", &self.requires_grad)
            .field("grad_fn", &self.grad_fn.as_ref().map(|g| g.name()))
            .finish()
    }
}
