//! Backward implementation for the batched sparse solve
//!
//! Implements gradient computation for X = A⁻¹ B with sparse A

use crate::autograd::{GradFn, Value, Var};
use crate::batch::BatchSolver;
use crate::error::{Error, Result};
use crate::ops::{SavedState, sparse_solve_backward, sparse_solve_forward};
use crate::tensor::TensorId;
use parking_lot::Mutex;
use std::sync::Arc;

// ============================================================================
// SparseSolveBackward
// ============================================================================

/// Backward for the sparse solve: X = A⁻¹ B
///
/// - dL/dB = λ = A⁻ᵀ dL/dX
/// - dL/dA = −λ Xᵀ at A's stored entries
///
/// The saved forward state is released by the first backward; a second
/// backward through the same node fails with `SavedStateReleased`.
pub struct SparseSolveBackward {
    input_ids: [TensorId; 2],
    requires_grad: [bool; 2],
    input_grad_fns: [Option<Arc<dyn GradFn>>; 2],
    saved: Mutex<Option<SavedState>>,
    solver: Arc<BatchSolver>,
}

impl SparseSolveBackward {
    /// Create a new SparseSolveBackward
    pub fn new(a: &Var, b: &Var, saved: SavedState, solver: Arc<BatchSolver>) -> Self {
        Self {
            input_ids: [a.id(), b.id()],
            requires_grad: [a.requires_grad(), b.requires_grad()],
            input_grad_fns: [a.grad_fn().cloned(), b.grad_fn().cloned()],
            saved: Mutex::new(Some(saved)),
            solver,
        }
    }

    /// Whether the saved state is still held
    pub fn has_saved_state(&self) -> bool {
        self.saved.lock().is_some()
    }
}

impl GradFn for SparseSolveBackward {
    fn backward(&self, grad_output: &Value) -> Result<Vec<Option<Value>>> {
        let Some(grad_x) = grad_output.as_dense() else {
            return Err(Error::invalid_argument(
                "grad_output",
                "sparse_solve produces a dense output; expected a dense gradient",
            ));
        };
        let saved = self
            .saved
            .lock()
            .take()
            .ok_or(Error::SavedStateReleased { op: "sparse_solve" })?;

        let grads = sparse_solve_backward(grad_x, saved, &self.solver)?;

        Ok(vec![
            self.requires_grad[0].then(|| Value::Sparse(grads.grad_a)),
            self.requires_grad[1].then(|| Value::Dense(grads.grad_b)),
        ])
    }

    fn inputs(&self) -> &[TensorId] {
        &self.input_ids
    }

    fn input_grad_fns(&self) -> Vec<Option<Arc<dyn GradFn>>> {
        self.input_grad_fns.to_vec()
    }

    fn name(&self) -> &'static str {
        "SparseSolveBackward"
    }
}

/// Differentiable batched sparse solve
///
/// `a` must hold a sparse `[batch, m, m]` value and `b` a dense
/// `[batch, m, n]` value. When neither requires grad, the result is a
/// plain leaf and nothing is saved.
pub fn var_sparse_solve(a: &Var, b: &Var, solver: &Arc<BatchSolver>) -> Result<Var> {
    let Some(a_sparse) = a.sparse() else {
        return Err(Error::invalid_argument(
            "A",
            "sparse_solve requires a sparse tensor",
        ));
    };
    let Some(b_dense) = b.tensor() else {
        return Err(Error::invalid_argument(
            "b",
            "sparse_solve requires a dense tensor",
        ));
    };

    let (x, saved) = sparse_solve_forward(a_sparse, b_dense, solver)?;

    if !a.requires_grad() && !b.requires_grad() {
        return Ok(Var::new(x, false));
    }

    let grad_fn = SparseSolveBackward::new(a, b, saved, Arc::clone(solver));
    Ok(Var::from_op(x, Arc::new(grad_fn)))
}
