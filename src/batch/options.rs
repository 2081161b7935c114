//! Configuration for batched solves

use crate::algorithm::sparse_linalg::{ColamdOptions, ColumnOrdering, LuOptions};
use crate::sparse::DuplicatePolicy;

/// What a batched call does when an element fails to factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Fail the whole call with the lowest failing batch index
    #[default]
    AbortOnFirst,
    /// Fill failed elements with NaN and report them alongside the result
    ///
    /// Only singular elements are skipped; malformed input still fails the
    /// call.
    SkipFailed,
}

/// Options for [`BatchSolver`](super::BatchSolver)
#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Numeric factorization options
    pub lu: LuOptions,

    /// Fill-reducing column ordering
    pub ordering: ColumnOrdering,

    /// COLAMD tuning, used when `ordering` is `Colamd`
    pub colamd: ColamdOptions,

    /// Treatment of repeated coordinates in COO input
    pub duplicates: DuplicatePolicy,

    /// Behavior on singular batch elements
    pub failure_policy: FailurePolicy,

    /// Solve batch elements in parallel (requires the `rayon` feature)
    pub parallel: bool,

    /// Share symbolic analyses between elements with the same pattern
    pub reuse_symbolic: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            lu: LuOptions::default(),
            ordering: ColumnOrdering::default(),
            colamd: ColamdOptions::default(),
            duplicates: DuplicatePolicy::default(),
            failure_policy: FailurePolicy::default(),
            parallel: true,
            reuse_symbolic: true,
        }
    }
}

impl SolveOptions {
    /// Set the factorization options
    pub fn with_lu(mut self, lu: LuOptions) -> Self {
        self.lu = lu;
        self
    }

    /// Set the column ordering
    pub fn with_ordering(mut self, ordering: ColumnOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Set the COLAMD options
    pub fn with_colamd(mut self, colamd: ColamdOptions) -> Self {
        self.colamd = colamd;
        self
    }

    /// Set the duplicate-entry policy
    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Set the failure policy
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Enable or disable parallel batch solving
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable or disable symbolic reuse
    pub fn with_symbolic_reuse(mut self, reuse: bool) -> Self {
        self.reuse_symbolic = reuse;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = SolveOptions::default();
        assert_eq!(opts.ordering, ColumnOrdering::Colamd);
        assert_eq!(opts.duplicates, DuplicatePolicy::Sum);
        assert_eq!(opts.failure_policy, FailurePolicy::AbortOnFirst);
        assert!(opts.parallel);
        assert!(opts.reuse_symbolic);
    }

    #[test]
    fn test_builder() {
        let opts = SolveOptions::default()
            .with_ordering(ColumnOrdering::Natural)
            .with_failure_policy(FailurePolicy::SkipFailed)
            .with_parallel(false)
            .with_symbolic_reuse(false);

        assert_eq!(opts.ordering, ColumnOrdering::Natural);
        assert_eq!(opts.failure_policy, FailurePolicy::SkipFailed);
        assert!(!opts.parallel);
        assert!(!opts.reuse_symbolic);
    }
}
