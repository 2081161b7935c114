//! Symbolic analysis cache
//!
//! Batches frequently share one sparsity pattern (a fixed mask with learned
//! values), and the transposed systems of a backward pass share the pattern
//! of each other. The cache lets every such element skip the matching and
//! ordering work after the first.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use parking_lot::RwLock;

use crate::algorithm::sparse_linalg::{ColamdOptions, ColumnOrdering, LuSymbolic, analyze};
use crate::error::Result;
use crate::sparse::{CscData, PatternKey};

/// Cache key: pattern signature plus the ordering the analysis used
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct CacheKey {
    pattern: PatternKey,
    ordering: ColumnOrdering,
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that ran a fresh analysis
    pub misses: u64,
    /// Number of cached analyses
    pub entries: usize,
}

/// Keyed store of symbolic analyses, shared read-only across batch workers
///
/// A hit is always checked against the full pattern before use. When two
/// different patterns collide on a key, the second gets a fresh analysis
/// and the cached entry is left alone.
#[derive(Debug, Default)]
pub struct SymbolicCache {
    entries: RwLock<HashMap<CacheKey, Arc<LuSymbolic>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SymbolicCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the analysis for `a`, computing and caching it on a miss
    ///
    /// Analysis failures (non-square or structurally singular matrices) are
    /// returned as-is and never cached.
    pub fn get_or_analyze(
        &self,
        a: &CscData,
        ordering: ColumnOrdering,
        colamd_options: &ColamdOptions,
    ) -> Result<Arc<LuSymbolic>> {
        let key = CacheKey {
            pattern: a.pattern_key(),
            ordering,
        };

        {
            let entries = self.entries.read();
            if let Some(symbolic) = entries.get(&key) {
                if symbolic.matches(a) {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(Arc::clone(symbolic));
                }
                debug!("symbolic cache: key collision for {:?}", key.pattern);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let symbolic = Arc::new(analyze(a, ordering, colamd_options)?);

        let mut entries = self.entries.write();
        let cached = entries
            .entry(key)
            .or_insert_with(|| Arc::clone(&symbolic));
        if cached.matches(a) {
            return Ok(Arc::clone(cached));
        }
        Ok(symbolic)
    }

    /// Drop every cached analysis; counters are kept
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        if !entries.is_empty() {
            debug!("symbolic cache: cleared {} entries", entries.len());
        }
        entries.clear();
    }

    /// Number of cached analyses
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no analyses
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Current hit/miss counters and size
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
