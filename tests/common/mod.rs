//! Common test utilities
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use spsolve::sparse::SparseTensor;
use spsolve::tensor::Tensor;

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Dense row-major `[m, m] · [m, n]` product
pub fn dense_matmul(a: &[f64], x: &[f64], m: usize, n: usize) -> Vec<f64> {
    let mut out = vec![0.0; m * n];
    for i in 0..m {
        for k in 0..m {
            let aik = a[i * m + k];
            for j in 0..n {
                out[i * n + j] += aik * x[k * n + j];
            }
        }
    }
    out
}

/// Reference dense solve by Gaussian elimination with partial pivoting
///
/// `a` is row-major `[m, m]`, `b` row-major `[m, n]`. Returns `None` for an
/// exactly singular matrix.
pub fn dense_lu_solve(a: &[f64], b: &[f64], m: usize, n: usize) -> Option<Vec<f64>> {
    let mut a = a.to_vec();
    let mut x = b.to_vec();

    for k in 0..m {
        let p = (k..m).max_by(|&i, &j| a[i * m + k].abs().total_cmp(&a[j * m + k].abs()))?;
        if a[p * m + k] == 0.0 {
            return None;
        }
        if p != k {
            for c in 0..m {
                a.swap(k * m + c, p * m + c);
            }
            for c in 0..n {
                x.swap(k * n + c, p * n + c);
            }
        }
        for i in k + 1..m {
            let f = a[i * m + k] / a[k * m + k];
            if f == 0.0 {
                continue;
            }
            for c in k..m {
                a[i * m + c] -= f * a[k * m + c];
            }
            for c in 0..n {
                x[i * n + c] -= f * x[k * n + c];
            }
        }
    }

    for k in (0..m).rev() {
        for c in 0..n {
            let mut s = x[k * n + c];
            for j in k + 1..m {
                s -= a[k * m + j] * x[j * n + c];
            }
            x[k * n + c] = s / a[k * m + k];
        }
    }
    Some(x)
}

/// Coordinates `(row, col)` of a lower-triangular-plus-diagonal mask
pub fn lower_triangular_mask(m: usize) -> Vec<(usize, usize)> {
    (0..m)
        .flat_map(|r| (0..=r).map(move |c| (r, c)))
        .collect()
}

/// Coordinates of a random mask that always contains the diagonal
pub fn random_mask(rng: &mut StdRng, m: usize, density: f64) -> Vec<(usize, usize)> {
    let mut mask = Vec::new();
    for r in 0..m {
        for c in 0..m {
            if r == c || rng.gen_bool(density) {
                mask.push((r, c));
            }
        }
    }
    mask
}

/// Batch of matrices sharing `mask`, with standard normal entries and a
/// diagonal shifted by `diag_shift` to keep every element well conditioned
pub fn random_batch(
    rng: &mut StdRng,
    batch: usize,
    m: usize,
    mask: &[(usize, usize)],
    diag_shift: f64,
) -> SparseTensor {
    let nnz = batch * mask.len();
    let mut indices = vec![0i64; 3 * nnz];
    let mut values = Vec::with_capacity(nnz);

    for i in 0..batch {
        for (k, &(r, c)) in mask.iter().enumerate() {
            let e = i * mask.len() + k;
            indices[e] = i as i64;
            indices[nnz + e] = r as i64;
            indices[2 * nnz + e] = c as i64;
            let v: f64 = rng.sample(StandardNormal);
            values.push(if r == c { v + diag_shift } else { v });
        }
    }

    SparseTensor::from_slices(&indices, &values, &[batch, m, m]).expect("valid fixture")
}

/// Dense tensor of standard normal entries
pub fn random_dense(rng: &mut StdRng, shape: &[usize]) -> Tensor {
    let len: usize = shape.iter().product();
    let data: Vec<f64> = (0..len).map(|_| rng.sample(StandardNormal)).collect();
    Tensor::from_slice(&data, shape)
}

/// Seeded RNG for reproducible fixtures
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
