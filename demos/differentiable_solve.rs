//! Differentiable Sparse Solve: Recovering a Tridiagonal Operator
//!
//! Given the inverse of an unknown tridiagonal matrix, this example learns
//! the matrix's stored entries by gradient descent through the solve.
//!
//! Key concepts demonstrated:
//! - `SparseTensor` holds a batch of matrices sharing one mask
//! - `var_sparse_solve` records the solve in the autograd graph
//! - `backward()` returns a gradient for `A` on exactly `A`'s entries
//! - A `BatchSolver` kept across iterations reuses its symbolic analysis
//!
//! Run with:
//! ```sh
//! cargo run --example differentiable_solve
//! ```

use std::sync::Arc;

use env_logger::Env;
use spsolve::prelude::*;

const M: usize = 8;

/// Tridiagonal mask of a single `[1, M, M]` matrix, as a `[3, nnz]` block
fn tridiagonal_indices() -> Vec<i64> {
    let mut coords = Vec::new();
    for r in 0..M {
        for c in r.saturating_sub(1)..(r + 2).min(M) {
            coords.push((r as i64, c as i64));
        }
    }
    let batch = coords.iter().map(|_| 0i64);
    let rows = coords.iter().map(|&(r, _)| r);
    let cols = coords.iter().map(|&(_, c)| c);
    batch.chain(rows).chain(cols).collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let indices = tridiagonal_indices();
    let nnz = indices.len() / 3;
    let is_diag = |k: usize| indices[nnz + k] == indices[2 * nnz + k];

    // -----------------------------------------------------------------------
    // 1. Target: X* = A*⁻¹ for A* = tridiag(-1, 4, -1)
    // -----------------------------------------------------------------------
    let true_values: Vec<f64> = (0..nnz).map(|k| if is_diag(k) { 4.0 } else { -1.0 }).collect();
    let true_a = SparseTensor::from_slices(&indices, &true_values, &[1, M, M])?;

    let mut identity = vec![0.0f64; M * M];
    for i in 0..M {
        identity[i * M + i] = 1.0;
    }
    let b = Tensor::from_slice(&identity, &[1, M, M]);
    let target = sparse_solve(&true_a, &b)?.to_vec::<f64>();

    // -----------------------------------------------------------------------
    // 2. Start from A = 3·I on the same mask (off-diagonals stored as zeros)
    // -----------------------------------------------------------------------
    let mut values: Vec<f64> = (0..nnz).map(|k| if is_diag(k) { 3.0 } else { 0.0 }).collect();
    let b_var = Var::new(b, false);
    let solver = Arc::new(BatchSolver::default());

    // -----------------------------------------------------------------------
    // 3. Gradient descent on L = ½‖X - X*‖²
    // -----------------------------------------------------------------------
    let lr = 20.0;
    let n_steps = 300;

    for step in 0..n_steps {
        let a = Var::new(SparseTensor::from_slices(&indices, &values, &[1, M, M])?, true);
        let x = var_sparse_solve(&a, &b_var, &solver)?;

        let x_data = x.tensor().map(|t| t.to_vec::<f64>()).unwrap_or_default();
        let residual: Vec<f64> = x_data.iter().zip(&target).map(|(x, t)| x - t).collect();
        let loss: f64 = 0.5 * residual.iter().map(|r| r * r).sum::<f64>();
        if step % 50 == 0 || step == n_steps - 1 {
            println!("step {step:>4}: loss = {loss:.3e}");
        }

        // dL/dX = X - X*
        let grads = backward(&x, Tensor::from_slice(&residual, &[1, M, M]).into())?;
        let Some(grad_a) = grads.get_sparse(a.id()) else {
            return Err(Error::MissingGradient);
        };

        for (v, g) in values.iter_mut().zip(grad_a.values().to_vec::<f64>()) {
            *v -= lr * g;
        }
    }

    // -----------------------------------------------------------------------
    // 4. Inspect the learned entries of the first two rows
    // -----------------------------------------------------------------------
    println!("\nLearned entries (first five): {:?}", &values[..5]);
    println!("True entries    (first five): {:?}", &true_values[..5]);

    let stats = solver.cache().stats();
    println!(
        "\nSymbolic cache: {} analyses for {} factorizations",
        stats.entries,
        stats.hits + stats.misses
    );
    Ok(())
}
