//! Numeric sparse LU factorization
//!
//! Gilbert-Peierls left-looking algorithm with threshold partial pivoting.

use log::trace;

use super::kernels::{Reach, scatter_column, sparse_axpy};
use super::types::{LuFactors, LuMetrics, LuOptions};
use crate::algorithm::sparse_linalg::symbolic::LuSymbolic;
use crate::error::{Error, Result};
use crate::sparse::{CscData, SparseStorage};

/// Sparse LU factorization of `a` using a precomputed symbolic analysis
///
/// Computes P·A·Q = L·U where Q comes from `symbolic`.
///
/// # Errors
///
/// - `PatternMismatch` if `a` is not the matrix `symbolic` was computed for
/// - `StructurallySingular` if a column has no candidate pivot row
/// - `NumericallySingular` if the pivot is not finite or is at most
///   `pivot_threshold` times the largest magnitude in the column being
///   eliminated
pub fn sparse_lu(a: &CscData, symbolic: &LuSymbolic, options: &LuOptions) -> Result<LuFactors> {
    let (factors, _metrics) = sparse_lu_with_metrics(a, symbolic, options)?;
    Ok(factors)
}

/// Sparse LU factorization with metrics
pub fn sparse_lu_with_metrics(
    a: &CscData,
    symbolic: &LuSymbolic,
    options: &LuOptions,
) -> Result<(LuFactors, LuMetrics)> {
    validate_options(options)?;
    symbolic.verify(a)?;

    let n = symbolic.n;
    let q = &symbolic.col_perm;
    let a_max = a.max_abs();
    let tolerance = options.pivot_tolerance;

    // pinv[i] = pivot position of original row i
    let mut pinv: Vec<Option<usize>> = vec![None; n];

    // L holds original row indices until the end; U holds positions
    let mut l_col_ptrs: Vec<usize> = Vec::with_capacity(n + 1);
    let mut l_rows: Vec<usize> = Vec::with_capacity(a.nnz());
    let mut l_vals: Vec<f64> = Vec::with_capacity(a.nnz());
    let mut u_col_ptrs: Vec<usize> = Vec::with_capacity(n + 1);
    let mut u_rows: Vec<usize> = Vec::with_capacity(a.nnz());
    let mut u_vals: Vec<f64> = Vec::with_capacity(a.nnz());
    l_col_ptrs.push(0);
    u_col_ptrs.push(0);

    let mut work = vec![0.0f64; n];
    let mut reach = Reach::new(n);
    let mut row_swaps = 0usize;
    let mut u_max = 0.0f64;

    for (k, &col) in q.iter().enumerate() {
        let (a_rows, a_vals) = a.column(col);

        // Nonzero pattern of L \ A(:, col), topologically ordered
        let pattern = reach.compute(a_rows, &pinv, &l_col_ptrs, &l_rows);

        // Sparse triangular solve into the work vector
        scatter_column(a_vals, a_rows, &mut work);
        for &i in pattern {
            if let Some(j) = pinv[i] {
                let range = l_col_ptrs[j]..l_col_ptrs[j + 1];
                sparse_axpy(work[i], &l_vals[range.clone()], &l_rows[range], &mut work);
            }
        }

        // Pivoted rows go to U; the rest are pivot candidates
        let mut best: Option<usize> = None;
        let mut best_abs = 0.0f64;
        let mut diag_candidate = false;
        let mut col_scale = a_vals.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        for &i in pattern {
            col_scale = col_scale.max(work[i].abs());
            match pinv[i] {
                Some(j) => {
                    u_rows.push(j);
                    u_vals.push(work[i]);
                }
                None => {
                    let t = work[i].abs();
                    if best.is_none() || t > best_abs {
                        best = Some(i);
                        best_abs = t;
                    }
                    diag_candidate |= i == col;
                }
            }
        }

        let Some(mut ipiv) = best else {
            return Err(Error::StructurallySingular {
                column: Some(col),
                rank: k,
            });
        };
        if diag_candidate && work[col].abs() >= tolerance * best_abs {
            ipiv = col;
        }

        // Relative to this column only, so scaling elsewhere in A is irrelevant
        let pivot = work[ipiv];
        if !pivot.is_finite() || !(pivot.abs() > options.pivot_threshold * col_scale) {
            return Err(Error::NumericallySingular {
                column: col,
                pivot: pivot.abs(),
            });
        }
        if ipiv != col {
            row_swaps += 1;
        }

        u_rows.push(k);
        u_vals.push(pivot);
        pinv[ipiv] = Some(k);

        for &i in pattern {
            if pinv[i].is_none() {
                l_rows.push(i);
                l_vals.push(work[i] / pivot);
            }
            work[i] = 0.0;
        }
        l_col_ptrs.push(l_rows.len());
        u_col_ptrs.push(u_rows.len());
    }

    let row_perm_inv: Vec<usize> = pinv
        .iter()
        .map(|p| p.ok_or_else(|| Error::Internal("row left unpivoted after factorization".into())))
        .collect::<Result<_>>()?;
    let mut row_perm = vec![0usize; n];
    for (row, &pos) in row_perm_inv.iter().enumerate() {
        row_perm[pos] = row;
    }

    // Move L to pivot positions and restore sorted columns
    for r in l_rows.iter_mut() {
        *r = row_perm_inv[*r];
    }
    sort_columns(&l_col_ptrs, &mut l_rows, &mut l_vals);
    sort_columns(&u_col_ptrs, &mut u_rows, &mut u_vals);
    for v in &u_vals {
        u_max = u_max.max(v.abs());
    }

    let original_nnz = a.nnz();
    let metrics = LuMetrics {
        original_nnz,
        l_nnz: l_vals.len(),
        u_nnz: u_vals.len(),
        fill_ratio: if original_nnz == 0 {
            0.0
        } else {
            (l_vals.len() + u_vals.len()) as f64 / original_nnz as f64
        },
        row_swaps,
        pivot_growth: if a_max > 0.0 { u_max / a_max } else { 0.0 },
    };
    trace!(
        "sparse LU n={n}: l_nnz={} u_nnz={} fill={:.2} swaps={} growth={:.3e}",
        metrics.l_nnz,
        metrics.u_nnz,
        metrics.fill_ratio,
        metrics.row_swaps,
        metrics.pivot_growth
    );

    let factors = LuFactors {
        l: CscData::from_parts_unchecked(l_col_ptrs, l_rows, l_vals, [n, n]),
        u: CscData::from_parts_unchecked(u_col_ptrs, u_rows, u_vals, [n, n]),
        row_perm,
        row_perm_inv,
        col_perm: q.clone(),
    };

    Ok((factors, metrics))
}

fn validate_options(options: &LuOptions) -> Result<()> {
    if !(options.pivot_tolerance > 0.0 && options.pivot_tolerance <= 1.0) {
        return Err(Error::invalid_argument(
            "pivot_tolerance",
            format!("must be in (0, 1], got {}", options.pivot_tolerance),
        ));
    }
    if !(options.pivot_threshold >= 0.0 && options.pivot_threshold.is_finite()) {
        return Err(Error::invalid_argument(
            "pivot_threshold",
            format!(
                "must be finite and non-negative, got {}",
                options.pivot_threshold
            ),
        ));
    }
    Ok(())
}

/// Sort each column's entries by row
fn sort_columns(col_ptrs: &[usize], rows: &mut [usize], vals: &mut [f64]) {
    let mut entries: Vec<(usize, f64)> = Vec::new();
    for w in col_ptrs.windows(2) {
        let (start, end) = (w[0], w[1]);
        if rows[start..end].windows(2).all(|p| p[0] < p[1]) {
            continue;
        }
        entries.clear();
        entries.extend(rows[start..end].iter().copied().zip(vals[start..end].iter().copied()));
        entries.sort_unstable_by_key(|&(r, _)| r);
        for (k, (r, v)) in entries.drain(..).enumerate() {
            rows[start + k] = r;
            vals[start + k] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::sparse_linalg::lu::solve::sparse_lu_solve;
    use crate::algorithm::sparse_linalg::ordering::{ColamdOptions, ColumnOrdering};
    use crate::algorithm::sparse_linalg::symbolic::analyze;
    use crate::sparse::CooData;

    fn dense_csc(data: &[f64], n: usize) -> CscData {
        CooData::from_dense(data, [n, n]).unwrap().to_csc().unwrap()
    }

    fn factor(a: &CscData, ordering: ColumnOrdering) -> Result<(LuFactors, LuMetrics)> {
        let sym = analyze(a, ordering, &ColamdOptions::default())?;
        sparse_lu_with_metrics(a, &sym, &LuOptions::default())
    }

    /// Check P·A·Q == L·U entrywise
    fn assert_reconstructs(a: &CscData, f: &LuFactors) {
        let n = f.n();
        let l = f.l.to_dense();
        let u = f.u.to_dense();
        let dense = a.to_dense();
        for i in 0..n {
            for j in 0..n {
                let mut lu = u[i * n + j];
                for k in 0..i {
                    lu += l[i * n + k] * u[k * n + j];
                }
                let paq = dense[f.row_perm[i] * n + f.col_perm[j]];
                assert!((lu - paq).abs() < 1e-12, "mismatch at ({i}, {j}): {lu} vs {paq}");
            }
        }
    }

    #[test]
    fn test_factor_requires_pivoting() {
        // Zero on the diagonal forces a row swap
        let a = dense_csc(&[0.0, 2.0, 1.0, 3.0, 1.0, 0.0, 1.0, 0.0, 4.0], 3);
        let (f, metrics) = factor(&a, ColumnOrdering::Natural).unwrap();

        assert_reconstructs(&a, &f);
        assert!(metrics.row_swaps > 0);
    }

    #[test]
    fn test_factor_with_colamd() {
        let a = dense_csc(
            &[
                4.0, 1.0, 0.0, 0.0, //
                1.0, 4.0, 1.0, 0.0, //
                0.0, 1.0, 4.0, 1.0, //
                2.0, 0.0, 1.0, 4.0,
            ],
            4,
        );
        let (f, metrics) = factor(&a, ColumnOrdering::Colamd).unwrap();

        assert_reconstructs(&a, &f);
        assert_eq!(metrics.original_nnz, 11);
        assert!(metrics.fill_ratio >= 1.0);
    }

    #[test]
    fn test_factors_are_triangular() {
        let a = dense_csc(&[2.0, 1.0, 1.0, 1.0, 3.0, 2.0, 1.0, 0.0, 0.0], 3);
        let (f, _) = factor(&a, ColumnOrdering::Natural).unwrap();

        for j in 0..3 {
            let (l_rows, _) = f.l.column(j);
            assert!(l_rows.iter().all(|&r| r > j));
            let (u_rows, _) = f.u.column(j);
            assert!(u_rows.iter().all(|&r| r <= j));
            assert_eq!(u_rows.last(), Some(&j));
        }
        assert_reconstructs(&a, &f);
    }

    #[test]
    fn test_numerically_singular() {
        // Full pattern, rank 1
        let a = dense_csc(&[1.0, 2.0, 2.0, 4.0], 2);
        let err = factor(&a, ColumnOrdering::Natural).unwrap_err();
        assert!(matches!(err, Error::NumericallySingular { column: 1, .. }));
        assert!(err.is_singular());
    }

    #[test]
    fn test_explicit_zero_pattern_is_numerically_singular() {
        // Stored zeros give full structural rank but no usable pivot
        let coo = CooData::from_slices(&[0, 1], &[0, 1], &[1.0, 0.0], [2, 2]).unwrap();
        let a = coo.to_csc().unwrap();
        let err = factor(&a, ColumnOrdering::Natural).unwrap_err();
        assert!(matches!(err, Error::NumericallySingular { column: 1, pivot } if pivot == 0.0));
    }

    #[test]
    fn test_badly_scaled_columns_are_not_singular() {
        // diag(1e16, 1) and a block-diagonal system mixing 1e-12 and 1e12
        let a = dense_csc(&[1e16, 0.0, 0.0, 1.0], 2);
        let (f, _) = factor(&a, ColumnOrdering::Natural).unwrap();
        assert_reconstructs(&a, &f);

        let a = dense_csc(
            &[
                1e-12, 2e-12, 0.0, //
                3e-12, 1e-12, 0.0, //
                0.0, 0.0, 1e12,
            ],
            3,
        );
        let sym = analyze(&a, ColumnOrdering::Colamd, &ColamdOptions::default()).unwrap();
        let f = sparse_lu(&a, &sym, &LuOptions::default()).unwrap();
        let x = sparse_lu_solve(&f, &[3e-12, 4e-12, 1e12], 1).unwrap();
        for v in x {
            assert!((v - 1.0).abs() < 1e-12, "{v}");
        }
    }

    #[test]
    fn test_cancellation_within_column_is_singular() {
        // Rank one in exact arithmetic; column 1 cancels to a rounding-sized remainder
        let a = dense_csc(&[0.1, 0.3, 0.3, 0.9], 2);
        let err = factor(&a, ColumnOrdering::Natural).unwrap_err();
        assert!(matches!(err, Error::NumericallySingular { column: 1, .. }));
    }

    #[test]
    fn test_diagonal_preference() {
        let a = dense_csc(&[1.0, 0.0, 2.0, 1.0], 2);
        let sym = analyze(&a, ColumnOrdering::Natural, &ColamdOptions::default()).unwrap();

        let (_, partial) = sparse_lu_with_metrics(&a, &sym, &LuOptions::default()).unwrap();
        assert!(partial.row_swaps > 0);

        let (f, diag) =
            sparse_lu_with_metrics(&a, &sym, &LuOptions::diagonal_preference(0.1)).unwrap();
        assert_eq!(diag.row_swaps, 0);
        assert_reconstructs(&a, &f);
    }

    #[test]
    fn test_rejects_bad_options() {
        let a = dense_csc(&[1.0, 0.0, 0.0, 1.0], 2);
        let sym = analyze(&a, ColumnOrdering::Natural, &ColamdOptions::default()).unwrap();
        let bad = LuOptions {
            pivot_tolerance: 0.0,
            ..Default::default()
        };
        assert!(sparse_lu(&a, &sym, &bad).unwrap_err().is_usage_error());
    }

    #[test]
    fn test_pattern_mismatch() {
        let a = dense_csc(&[1.0, 0.0, 0.0, 1.0], 2);
        let b = dense_csc(&[1.0, 1.0, 0.0, 1.0], 2);
        let sym = analyze(&a, ColumnOrdering::Natural, &ColamdOptions::default()).unwrap();
        assert!(matches!(
            sparse_lu(&b, &sym, &LuOptions::default()),
            Err(Error::PatternMismatch { .. })
        ));
    }
}
