//! Bipartite matching on sparse matrix structure
//!
//! Maximum matching between rows and columns of a sparse matrix. The size of
//! a maximum matching is the structural rank: the largest number of
//! nonzeros that row and column permutations can place on the diagonal.
//!
//! # Algorithms
//!
//! - **Hopcroft-Karp**: O(E√V) maximum cardinality matching

pub mod hopcroft_karp;

pub use hopcroft_karp::{MatchingResult, hopcroft_karp, structural_rank};
