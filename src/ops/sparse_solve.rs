//! Differentiable batched sparse solve
//!
//! Forward: `X = A⁻¹ B` for a batch of sparse `A` `[batch, m, m]` and dense
//! `B` `[batch, m, n]`.
//!
//! Backward: differentiating `A X = B` gives `dA·X + A·dX = dB`, so for an
//! upstream gradient `G = ∂L/∂X`:
//!
//! ```text
//! λ      = A⁻ᵀ G           (one transposed solve per element)
//! ∂L/∂B  = λ
//! ∂L/∂A  = −λ Xᵀ           (only at A's stored entries)
//! ```
//!
//! The gradient for `A` is never formed densely: for every stored entry
//! `(i, r, c)` it is `−Σ_k λ[i, r, k] · X[i, c, k]`, computed in the entry
//! order of `A` so that it reuses `A`'s indices unchanged.

use crate::batch::BatchSolver;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::sparse::SparseTensor;
use crate::tensor::Tensor;

/// Dimensions of a validated batched solve
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SolveParams {
    /// Number of systems
    pub batch: usize,
    /// Order of each sparse matrix
    pub m: usize,
    /// Number of right-hand side columns
    pub n: usize,
}

impl SolveParams {
    /// Shape of `b`, `x` and the gradient of either
    pub fn dense_shape(&self) -> [usize; 3] {
        [self.batch, self.m, self.n]
    }
}

/// Forward values kept for the backward pass
///
/// Moved into [`sparse_solve_backward`], so one forward pairs with exactly
/// one backward.
#[derive(Debug)]
pub struct SavedState {
    /// Sparse operand `[batch, m, m]`
    pub a: SparseTensor,
    /// Right-hand sides `[batch, m, n]`
    pub b: Tensor,
    /// Solution `[batch, m, n]`
    pub x: Tensor,
    /// Elements skipped under `FailurePolicy::SkipFailed`, by ascending
    /// batch index; their slices of `x` are NaN
    pub failures: Vec<(usize, Error)>,
}

impl SavedState {
    /// Whether every element of the forward solve succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Gradients of a loss with respect to both solve inputs
#[derive(Clone, Debug)]
pub struct GradientPair {
    /// Gradient for `A`, with exactly `A`'s indices
    pub grad_a: SparseTensor,
    /// Gradient for `b`, `[batch, m, n]`
    pub grad_b: Tensor,
}

/// Validate the operands of a batched solve
///
/// Checked before any numerical work:
/// - `A` is 3-d and square in its last two dimensions
/// - `b` is 3-d
/// - both are f64
/// - batch sizes agree and `b` has `m` rows
pub fn validate_solve_shapes(a: &SparseTensor, b: &Tensor) -> Result<SolveParams> {
    let &[batch, m, m2] = a.shape() else {
        return Err(Error::InvalidDimension {
            arg: "A",
            expected: 3,
            got: a.ndim(),
        });
    };
    if m != m2 {
        return Err(Error::invalid_argument(
            "A",
            format!("must be square in its last two dimensions, got {:?}", a.shape()),
        ));
    }

    let &[b_batch, b_rows, n] = b.shape() else {
        return Err(Error::InvalidDimension {
            arg: "b",
            expected: 3,
            got: b.ndim(),
        });
    };

    if a.dtype() != DType::F64 {
        return Err(Error::unsupported_dtype(a.dtype(), "sparse_solve"));
    }
    if b.dtype() != DType::F64 {
        return Err(Error::unsupported_dtype(b.dtype(), "sparse_solve"));
    }

    if b_batch != batch {
        return Err(Error::invalid_argument(
            "b",
            format!("batch size {b_batch} does not match A's batch size {batch}"),
        ));
    }
    if b_rows != m {
        return Err(Error::invalid_argument(
            "b",
            format!("has {b_rows} rows but A is {m}x{m}"),
        ));
    }

    Ok(SolveParams { batch, m, n })
}

/// Solve `A X = b` with a default solver
///
/// # Example
///
/// ```
/// use spsolve::prelude::*;
///
/// // One 2x2 system: [[4, 1], [0, 2]] x = [6, 4]
/// let a = SparseTensor::from_slices(&[0, 0, 0, 0, 0, 1, 0, 1, 1], &[4.0, 1.0, 2.0], &[1, 2, 2])?;
/// let b = Tensor::from_slice(&[6.0f64, 4.0], &[1, 2, 1]);
///
/// let x = sparse_solve(&a, &b)?;
/// assert_eq!(x.to_vec::<f64>(), vec![1.0, 2.0]);
/// # Ok::<(), spsolve::error::Error>(())
/// ```
pub fn sparse_solve(a: &SparseTensor, b: &Tensor) -> Result<Tensor> {
    let (x, _) = sparse_solve_forward(a, b, &BatchSolver::default())?;
    Ok(x)
}

/// Forward solve, returning `x` and the state its backward needs
///
/// Under `FailurePolicy::SkipFailed`, singular elements come back as NaN
/// slices of `x` and are listed in [`SavedState::failures`].
pub fn sparse_solve_forward(
    a: &SparseTensor,
    b: &Tensor,
    solver: &BatchSolver,
) -> Result<(Tensor, SavedState)> {
    validate_solve_shapes(a, b)?;

    let solution = solver.solve(a, b)?;

    let saved = SavedState {
        a: a.clone(),
        b: b.clone(),
        x: solution.x.clone(),
        failures: solution.failures,
    };
    let x = solution.x;
    Ok((x, saved))
}

/// Backward solve: gradients for `A` and `b` from the gradient for `x`
///
/// Singular transposed systems fail exactly like the forward solve, under
/// the same failure policy.
pub fn sparse_solve_backward(
    grad_x: &Tensor,
    saved: SavedState,
    solver: &BatchSolver,
) -> Result<GradientPair> {
    let SavedState { a, x, .. } = saved;

    if grad_x.dtype() != DType::F64 {
        return Err(Error::unsupported_dtype(grad_x.dtype(), "sparse_solve_backward"));
    }
    if grad_x.shape() != x.shape() {
        return Err(Error::shape_mismatch(x.shape(), grad_x.shape()));
    }
    let &[_, m, n] = x.shape() else {
        return Err(Error::InvalidDimension {
            arg: "x",
            expected: 3,
            got: x.ndim(),
        });
    };

    // λ = A⁻ᵀ G
    let matrices = a.batch_elements()?;
    let lambda = solver.solve_transposed(&matrices, grad_x)?.x;

    let grad_values = {
        let lam = lambda.as_slice::<f64>()?;
        let xs = x.as_slice::<f64>()?;
        let (batches, rows, cols) = (a.coords(0)?, a.coords(1)?, a.coords(2)?);
        let block = m * n;

        batches
            .iter()
            .zip(rows)
            .zip(cols)
            .map(|((&i, &r), &c)| {
                let base = i as usize * block;
                let lam_row = &lam[base + r as usize * n..][..n];
                let x_row = &xs[base + c as usize * n..][..n];
                -lam_row
                    .iter()
                    .zip(x_row)
                    .map(|(l, v)| l * v)
                    .sum::<f64>()
            })
            .collect::<Vec<f64>>()
    };

    let nnz = grad_values.len();
    let grad_a = a.with_values(Tensor::try_from_slice(&grad_values, &[nnz])?)?;

    Ok(GradientPair {
        grad_a,
        grad_b: lambda,
    })
}
