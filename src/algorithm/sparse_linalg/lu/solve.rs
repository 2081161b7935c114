//! Triangular solves with computed LU factors

use super::factor::sparse_lu;
use super::types::{LuFactors, LuOptions};
use crate::algorithm::sparse_linalg::ordering::{ColamdOptions, ColumnOrdering};
use crate::algorithm::sparse_linalg::symbolic::analyze;
use crate::error::{Error, Result};
use crate::sparse::CscData;

/// Solve A·X = B using precomputed LU factors
///
/// `b` is row-major `[n, nrhs]`; the result has the same layout.
/// Solves by: X = Q · U⁻¹ · L⁻¹ · P · B, one right-hand side column at a time.
pub fn sparse_lu_solve(factors: &LuFactors, b: &[f64], nrhs: usize) -> Result<Vec<f64>> {
    let mut x = vec![0.0f64; b.len()];
    sparse_lu_solve_into(factors, b, nrhs, &mut x)?;
    Ok(x)
}

/// Solve A·X = B, writing X into `x`
///
/// `b` and `x` are both row-major `[n, nrhs]`.
pub fn sparse_lu_solve_into(
    factors: &LuFactors,
    b: &[f64],
    nrhs: usize,
    x: &mut [f64],
) -> Result<()> {
    let n = factors.n();
    if b.len() != n * nrhs {
        return Err(Error::shape_mismatch(&[n, nrhs], &[b.len()]));
    }
    if x.len() != n * nrhs {
        return Err(Error::shape_mismatch(&[n, nrhs], &[x.len()]));
    }

    let mut work = vec![0.0f64; n];
    for c in 0..nrhs {
        // y = P * b
        for (k, w) in work.iter_mut().enumerate() {
            *w = b[factors.row_perm[k] * nrhs + c];
        }

        // Forward substitution: L * z = y (L is unit lower triangular)
        for j in 0..n {
            let zj = work[j];
            if zj == 0.0 {
                continue;
            }
            let (rows, vals) = factors.l.column(j);
            for (&i, &v) in rows.iter().zip(vals) {
                work[i] -= v * zj;
            }
        }

        // Backward substitution: U * w = z, diagonal last in each column
        for j in (0..n).rev() {
            let (rows, vals) = factors.u.column(j);
            let Some((&diag_row, above)) = rows.split_last() else {
                return Err(Error::Internal(format!("U column {j} is empty")));
            };
            if diag_row != j {
                return Err(Error::Internal(format!("U column {j} has no diagonal")));
            }
            work[j] /= vals[above.len()];
            let wj = work[j];
            for (&i, &v) in above.iter().zip(vals) {
                work[i] -= v * wj;
            }
        }

        // x = Q * w
        for (k, &w) in work.iter().enumerate() {
            x[factors.col_perm[k] * nrhs + c] = w;
        }
    }

    Ok(())
}

/// Solve A·X = B for one CSC matrix with default options
///
/// Symbolic analysis (COLAMD ordering), factorization and solve in one
/// call. Not batched and not differentiable; meant for checking results
/// against reference implementations.
///
/// # Example
///
/// ```
/// use spsolve::algorithm::sparse_linalg::solve_csc;
/// use spsolve::sparse::CooData;
///
/// // [2 0]   [x0]   [4]
/// // [1 4] * [x1] = [6]
/// let a = CooData::from_slices(&[0, 1, 1], &[0, 0, 1], &[2.0, 1.0, 4.0], [2, 2])?.to_csc()?;
/// let x = solve_csc(&a, &[4.0, 6.0], 1)?;
/// assert!((x[0] - 2.0).abs() < 1e-12 && (x[1] - 1.0).abs() < 1e-12);
/// # Ok::<(), spsolve::error::Error>(())
/// ```
pub fn solve_csc(a: &CscData, b: &[f64], nrhs: usize) -> Result<Vec<f64>> {
    solve_csc_with(
        a,
        b,
        nrhs,
        ColumnOrdering::default(),
        &ColamdOptions::default(),
        &LuOptions::default(),
    )
}

/// Solve A·X = B for one CSC matrix with explicit options
pub fn solve_csc_with(
    a: &CscData,
    b: &[f64],
    nrhs: usize,
    ordering: ColumnOrdering,
    colamd_options: &ColamdOptions,
    options: &LuOptions,
) -> Result<Vec<f64>> {
    let symbolic = analyze(a, ordering, colamd_options)?;
    let factors = sparse_lu(a, &symbolic, options)?;
    sparse_lu_solve(&factors, b, nrhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::CooData;

    fn dense_csc(data: &[f64], n: usize) -> CscData {
        CooData::from_dense(data, [n, n]).unwrap().to_csc().unwrap()
    }

    fn assert_residual_small(a: &CscData, x: &[f64], b: &[f64], nrhs: usize) {
        let ax = a.matmul_dense(x, nrhs).unwrap();
        for (got, want) in ax.iter().zip(b) {
            assert!((got - want).abs() < 1e-10, "residual {got} vs {want}");
        }
    }

    #[test]
    fn test_solve_single_rhs() {
        let a = dense_csc(&[4.0, 1.0, 0.0, 1.0, 4.0, 1.0, 0.0, 1.0, 4.0], 3);
        let b = [1.0, 2.0, 3.0];
        let x = solve_csc(&a, &b, 1).unwrap();
        assert_residual_small(&a, &x, &b, 1);
    }

    #[test]
    fn test_solve_multiple_rhs_with_pivoting() {
        let a = dense_csc(&[0.0, 2.0, 1.0, 3.0, 1.0, 0.0, 1.0, 0.0, 4.0], 3);
        // [3, 2] right-hand side, row-major
        let b = [1.0, 0.0, 0.0, 1.0, 2.0, -1.0];
        for ordering in [ColumnOrdering::Natural, ColumnOrdering::Colamd] {
            let x = solve_csc_with(
                &a,
                &b,
                2,
                ordering,
                &ColamdOptions::default(),
                &LuOptions::default(),
            )
            .unwrap();
            assert_residual_small(&a, &x, &b, 2);
        }
    }

    #[test]
    fn test_permutation_matrix() {
        // Anti-diagonal: pivoting only
        let a = dense_csc(&[0.0, 0.0, 5.0, 0.0, 2.0, 0.0, 1.0, 0.0, 0.0], 3);
        let x = solve_csc(&a, &[5.0, 4.0, 3.0], 1).unwrap();
        assert_eq!(x, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_rhs_shape_checked() {
        let a = dense_csc(&[1.0, 0.0, 0.0, 1.0], 2);
        let err = solve_csc(&a, &[1.0, 2.0, 3.0], 1).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_empty_system() {
        let x = solve_csc(&CscData::empty([0, 0]), &[], 3).unwrap();
        assert!(x.is_empty());
    }
}
