//! Gradient function trait

use super::Value;
use crate::error::Result;
use crate::tensor::TensorId;
use std::sync::Arc;

/// Trait for computing gradients during backward pass
///
/// Each operation that participates in autograd has an associated
/// `GradFn` that knows how to compute gradients for its inputs.
pub trait GradFn: Send + Sync {
    /// Compute gradients for input values given the gradient of the output
    ///
    /// Returns a vector of optional gradients - one per input.
    /// `None` indicates that input doesn't need a gradient.
    fn backward(&self, grad_output: &Value) -> Result<Vec<Option<Value>>>;

    /// Get the IDs of input variables
    ///
    /// Used for topological sorting during backward pass.
    fn inputs(&self) -> &[TensorId];

    /// Get the grad_fns of input variables for graph traversal
    ///
    /// Returns a vector of optional grad_fns - one per input.
    /// `None` indicates a leaf.
    fn input_grad_fns(&self) -> Vec<Option<Arc<dyn GradFn>>> {
        vec![None; self.inputs().len()]
    }

    /// Human-readable name for debugging
    fn name(&self) -> &'static str;
}
