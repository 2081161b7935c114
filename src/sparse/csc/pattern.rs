//! Sparsity pattern signatures

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::CscData;

/// Compact signature of a CSC sparsity pattern
///
/// Two matrices with the same stored positions always have equal keys. Equal
/// keys do not prove equal patterns (the hash can collide), so anything that
/// reuses work by key must still compare the full pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternKey {
    /// Matrix shape [nrows, ncols]
    pub shape: [usize; 2],
    /// Number of stored entries
    pub nnz: usize,
    /// Hash of column pointers and row indices
    pub hash: u64,
}

impl PatternKey {
    /// Compute the key of a CSC matrix
    pub fn of(a: &CscData) -> Self {
        let mut hasher = DefaultHasher::new();
        a.col_ptrs.hash(&mut hasher);
        a.row_indices.hash(&mut hasher);
        Self {
            shape: a.shape,
            nnz: a.values.len(),
            hash: hasher.finish(),
        }
    }
}

impl CscData {
    /// Signature of this matrix's sparsity pattern
    pub fn pattern_key(&self) -> PatternKey {
        PatternKey::of(self)
    }
}
