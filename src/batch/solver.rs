//! Batched sparse solve

use std::sync::Arc;

use log::{debug, warn};

use super::cache::SymbolicCache;
use super::options::{FailurePolicy, SolveOptions};
use crate::algorithm::sparse_linalg::{LuSymbolic, analyze, sparse_lu, sparse_lu_solve_into};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::sparse::{CooData, CscData, SparseTensor};
use crate::tensor::Tensor;

/// Result of a batched solve
#[derive(Debug)]
pub struct BatchSolution {
    /// Solutions, `[B, m, n]`, in batch order
    pub x: Tensor,

    /// Elements that failed under [`FailurePolicy::SkipFailed`], by batch
    /// index in ascending order; their slices of `x` are NaN
    pub failures: Vec<(usize, Error)>,
}

impl BatchSolution {
    /// Whether every element was solved
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The solution, or the first failure wrapped with its batch index
    pub fn into_result(self) -> Result<Tensor> {
        match self.failures.into_iter().next() {
            None => Ok(self.x),
            Some((index, err)) => Err(err.in_batch(index)),
        }
    }
}

/// Solves batches of independent sparse systems `A_i · X_i = B_i`
///
/// Each element is converted to CSC, analyzed, factored and solved on its
/// own; elements run in parallel when the `rayon` feature is enabled. The
/// solver owns a [`SymbolicCache`] that persists across calls, so repeated
/// solves with a fixed mask analyze the pattern once.
///
/// # Example
///
/// ```
/// use spsolve::prelude::*;
///
/// // Two diagonal 2x2 systems
/// let a = SparseTensor::from_slices(
///     &[0, 0, 1, 1, 0, 1, 0, 1, 0, 1, 0, 1],
///     &[2.0, 4.0, 1.0, 8.0],
///     &[2, 2, 2],
/// )?;
/// let b = Tensor::from_slice(&[2.0f64, 4.0, 3.0, 8.0], &[2, 2, 1]);
///
/// let solver = BatchSolver::default();
/// let x = solver.solve(&a, &b)?.into_result()?;
/// assert_eq!(x.to_vec::<f64>(), vec![1.0, 1.0, 3.0, 1.0]);
/// # Ok::<(), spsolve::error::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct BatchSolver {
    options: SolveOptions,
    cache: SymbolicCache,
}

impl BatchSolver {
    /// Create a solver with the given options and an empty cache
    pub fn new(options: SolveOptions) -> Self {
        Self {
            options,
            cache: SymbolicCache::new(),
        }
    }

    /// The solver's options
    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// The solver's symbolic cache
    pub fn cache(&self) -> &SymbolicCache {
        &self.cache
    }

    /// Solve `A · X = B` for a batched COO tensor `A` `[B, m, m]`
    pub fn solve(&self, a: &SparseTensor, b: &Tensor) -> Result<BatchSolution> {
        let matrices = a.batch_elements()?;
        self.solve_coo(&matrices, b)
    }

    /// Solve `A_i · X_i = B_i` for one COO matrix per batch element
    pub fn solve_coo(&self, matrices: &[CooData], b: &Tensor) -> Result<BatchSolution> {
        let duplicates = self.options.duplicates;
        self.solve_elements(
            matrices.iter().map(|a| a.shape).collect(),
            b,
            "solve",
            |i| matrices[i].to_csc_with(duplicates),
        )
    }

    /// Solve `A_iᵀ · X_i = B_i` for one COO matrix per batch element
    ///
    /// The transpose is formed per element from the compressed matrix.
    pub fn solve_transposed(&self, matrices: &[CooData], b: &Tensor) -> Result<BatchSolution> {
        let duplicates = self.options.duplicates;
        self.solve_elements(
            matrices.iter().map(|a| a.shape).collect(),
            b,
            "solve_transposed",
            |i| Ok(matrices[i].to_csc_with(duplicates)?.transpose()),
        )
    }

    /// Solve `A_i · X_i = B_i` for already compressed matrices
    pub fn solve_csc(&self, matrices: &[CscData], b: &Tensor) -> Result<BatchSolution> {
        self.solve_elements(
            matrices.iter().map(|a| a.shape).collect(),
            b,
            "solve_csc",
            |i| Ok(matrices[i].clone()),
        )
    }

    fn solve_elements<F>(
        &self,
        shapes: Vec<[usize; 2]>,
        b: &Tensor,
        op: &'static str,
        make_csc: F,
    ) -> Result<BatchSolution>
    where
        F: Fn(usize) -> Result<CscData> + Sync,
    {
        let count = shapes.len();
        let (m, n, rhs) = rhs_blocks(b, count, op)?;
        for (i, shape) in shapes.iter().enumerate() {
            if *shape != [m, m] {
                return Err(Error::shape_mismatch(&[m, m], shape).in_batch(i));
            }
        }

        let chunk = m * n;
        debug!(
            "{op}: batch={count} m={m} nrhs={n} parallel={} reuse_symbolic={}",
            self.runs_parallel(count),
            self.options.reuse_symbolic
        );

        let mut out = vec![0.0f64; count * chunk];
        let results = self.for_each_element(&mut out, chunk, count, |i, x| {
            let a = make_csc(i)?;
            let symbolic = self.symbolic_for(&a)?;
            let factors = sparse_lu(&a, &symbolic, &self.options.lu)?;
            sparse_lu_solve_into(&factors, &rhs[i * chunk..(i + 1) * chunk], n, x)
        });

        let mut failures = Vec::new();
        for (i, result) in results.into_iter().enumerate() {
            let Err(err) = result else {
                continue;
            };
            if self.options.failure_policy == FailurePolicy::AbortOnFirst || !err.is_singular() {
                return Err(err.in_batch(i));
            }
            warn!("{op}: skipping batch element {i}: {err}");
            out[i * chunk..(i + 1) * chunk].fill(f64::NAN);
            failures.push((i, err));
        }

        Ok(BatchSolution {
            x: Tensor::try_from_slice(&out, &[count, m, n])?,
            failures,
        })
    }

    fn symbolic_for(&self, a: &CscData) -> Result<Arc<LuSymbolic>> {
        if self.options.reuse_symbolic {
            return self
                .cache
                .get_or_analyze(a, self.options.ordering, &self.options.colamd);
        }
        analyze(a, self.options.ordering, &self.options.colamd).map(Arc::new)
    }

    fn runs_parallel(&self, count: usize) -> bool {
        cfg!(feature = "rayon") && self.options.parallel && count > 1
    }

    /// Run `solve` for every batch element over its disjoint output chunk
    fn for_each_element<F>(
        &self,
        out: &mut [f64],
        chunk: usize,
        count: usize,
        solve: F,
    ) -> Vec<Result<()>>
    where
        F: Fn(usize, &mut [f64]) -> Result<()> + Sync,
    {
        if chunk == 0 {
            return (0..count).map(|i| solve(i, &mut [])).collect();
        }

        #[cfg(feature = "rayon")]
        {
            if self.runs_parallel(count) {
                use rayon::prelude::*;
                return out
                    .par_chunks_mut(chunk)
                    .enumerate()
                    .map(|(i, x)| solve(i, x))
                    .collect();
            }
        }

        out.chunks_mut(chunk)
            .enumerate()
            .map(|(i, x)| solve(i, x))
            .collect()
    }
}

/// Validate `b` as `[count, m, n]` f64 and return `(m, n, data)`
fn rhs_blocks<'a>(
    b: &'a Tensor,
    count: usize,
    op: &'static str,
) -> Result<(usize, usize, &'a [f64])> {
    let Some((batch, m, n)) = b.dims().as_batch_matrix() else {
        return Err(Error::InvalidDimension {
            arg: "b",
            expected: 3,
            got: b.ndim(),
        });
    };
    if b.dtype() != DType::F64 {
        return Err(Error::unsupported_dtype(b.dtype(), op));
    }
    if batch != count {
        return Err(Error::shape_mismatch(&[count, m, n], b.shape()));
    }
    Ok((m, n, b.as_slice::<f64>()?))
}
