//! Backward pass implementation
//!
//! Implements reverse-mode automatic differentiation using topological sort
//! to traverse the computation graph and accumulate gradients.

use super::{GradFn, GradStore, Value, Var};
use crate::error::{Error, Result};
use crate::tensor::TensorId;
use std::collections::HashSet;
use std::sync::Arc;

/// Compute gradients via reverse-mode automatic differentiation
///
/// Seeds the root with `grad_output` (the gradient of some loss with
/// respect to `root`, same kind and shape) and traverses the graph in
/// reverse topological order.
///
/// # Returns
///
/// A `GradStore` holding the gradient of every variable reached,
/// including the root.
///
/// # Example
///
/// ```
/// use spsolve::prelude::*;
/// use std::sync::Arc;
///
/// let a = Var::new(SparseTensor::from_slices(&[0, 0, 0], &[2.0], &[1, 1, 1])?, true);
/// let b = Var::new(Tensor::from_slice(&[4.0f64], &[1, 1, 1]), true);
///
/// let x = var_sparse_solve(&a, &b, &Arc::new(BatchSolver::default()))?;
/// let grads = backward(&x, Tensor::full(&[1, 1, 1], 1.0).into())?;
///
/// // x = b / a: ∂x/∂a = -b / a², ∂x/∂b = 1 / a
/// assert_eq!(grads.get_sparse(a.id()).unwrap().values().to_vec::<f64>(), vec![-1.0]);
/// assert_eq!(grads.get_dense(b.id()).unwrap().to_vec::<f64>(), vec![0.5]);
/// # Ok::<(), spsolve::error::Error>(())
/// ```
pub fn backward(root: &Var, grad_output: Value) -> Result<GradStore> {
    if !root.requires_grad() {
        return Err(Error::invalid_argument(
            "root",
            "backward() called on a variable that doesn't require grad",
        ));
    }
    if grad_output.is_sparse() != root.value().is_sparse() {
        return Err(Error::invalid_argument(
            "grad_output",
            format!(
                "expected a {} gradient, got {}",
                root.value().kind(),
                grad_output.kind()
            ),
        ));
    }
    if grad_output.shape() != root.shape() {
        return Err(Error::shape_mismatch(root.shape(), grad_output.shape()));
    }

    let mut grad_store = GradStore::new();
    grad_store.insert(root.id(), grad_output);

    let topo_order = topological_sort(root);

    // Traverse in reverse topological order (from output to inputs)
    for (var_id, grad_fn_opt, input_ids) in topo_order.into_iter().rev() {
        let Some(grad_fn) = grad_fn_opt else {
            continue;
        };
        let grad_output = match grad_store.get(var_id) {
            Some(g) => g.clone(),
            None => continue,
        };

        let input_grads = grad_fn.backward(&grad_output)?;
        if input_grads.len() != input_ids.len() {
            return Err(Error::Internal(format!(
                "{} returned {} gradients for {} inputs",
                grad_fn.name(),
                input_grads.len(),
                input_ids.len()
            )));
        }

        for (input_id, input_grad) in input_ids.iter().zip(input_grads) {
            if let Some(input_grad) = input_grad {
                grad_store.accumulate(*input_id, input_grad)?;
            }
        }
    }

    Ok(grad_store)
}

/// Entry for topological sort: (var_id, grad_fn, input_ids)
type TopoEntry = (TensorId, Option<Arc<dyn GradFn>>, Vec<TensorId>);

/// Build topological sort of computation graph using DFS post-order traversal
///
/// Returns nodes in topological order (inputs before outputs).
fn topological_sort(root: &Var) -> Vec<TopoEntry> {
    let mut result = Vec::new();
    let mut visited = HashSet::new();

    fn dfs(
        id: TensorId,
        grad_fn: Option<Arc<dyn GradFn>>,
        visited: &mut HashSet<TensorId>,
        result: &mut Vec<TopoEntry>,
    ) {
        if !visited.insert(id) {
            return;
        }

        let input_ids: Vec<TensorId> = grad_fn
            .as_ref()
            .map(|gf| gf.inputs().to_vec())
            .unwrap_or_default();

        if let Some(gf) = &grad_fn {
            for (input_id, input_grad_fn) in input_ids.iter().zip(gf.input_grad_fns()) {
                dfs(*input_id, input_grad_fn, visited, result);
            }
        }

        result.push((id, grad_fn, input_ids));
    }

    dfs(root.id(), root.grad_fn().cloned(), &mut visited, &mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Tensor;

    #[test]
    fn test_backward_leaf_variable() {
        let x = Var::new(Tensor::from_slice(&[3.0f64], &[1]), true);
        let grads = backward(&x, Tensor::from_slice(&[1.0f64], &[1]).into()).unwrap();

        assert_eq!(grads.get_dense(x.id()).unwrap().to_vec::<f64>(), vec![1.0]);
        assert_eq!(grads.len(), 1);
    }

    #[test]
    fn test_backward_requires_grad() {
        let x = Var::new(Tensor::from_slice(&[3.0f64], &[1]), false);
        let err = backward(&x, Tensor::from_slice(&[1.0f64], &[1]).into()).unwrap_err();
        assert!(err.is_usage_error());
    }

    #[test]
    fn test_backward_validates_seed() {
        let x = Var::new(Tensor::from_slice(&[3.0f64, 4.0], &[2]), true);

        let err = backward(&x, Tensor::from_slice(&[1.0f64], &[1]).into()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
