//! Hopcroft-Karp algorithm for maximum bipartite matching.
//!
//! Finds a maximum cardinality matching in a bipartite graph in O(E√V) time.
//!
//! # Algorithm Overview
//!
//! The algorithm alternates between two phases:
//!
//! 1. **BFS phase**: Find shortest augmenting paths from all unmatched columns
//!    to unmatched rows, building a level graph.
//!
//! 2. **DFS phase**: Find a maximal set of vertex-disjoint augmenting paths
//!    in the level graph and augment the matching.
//!
//! This is repeated until no augmenting paths exist.
//!
//! # References
//!
//! Hopcroft, J. E., & Karp, R. M. (1973). "An n^(5/2) algorithm for maximum
//! matchings in bipartite graphs." SIAM Journal on Computing, 2(4), 225-231.

use std::collections::VecDeque;

use crate::sparse::CscData;

/// Result of maximum matching computation.
#[derive(Debug, Clone)]
pub struct MatchingResult {
    /// For each column j, the row matched to it.
    pub col_to_row: Vec<Option<usize>>,
    /// For each row i, the column matched to it.
    pub row_to_col: Vec<Option<usize>>,
    /// Size of the maximum matching, which is the structural rank.
    pub structural_rank: usize,
}

impl MatchingResult {
    /// First column left without a partner, if any.
    pub fn first_unmatched_col(&self) -> Option<usize> {
        self.col_to_row.iter().position(Option::is_none)
    }
}

const INF: usize = usize::MAX;

/// Compute a maximum matching between the rows and columns of `a`.
///
/// An edge joins column j and row i when `a` stores an entry at (i, j),
/// whatever its value.
pub fn hopcroft_karp(a: &CscData) -> MatchingResult {
    let [n_rows, n_cols] = a.shape;

    let mut col_to_row: Vec<Option<usize>> = vec![None; n_cols];
    let mut row_to_col: Vec<Option<usize>> = vec![None; n_rows];

    // dist[j] for columns; dist[n_cols] is the distance to a free row
    let mut dist = vec![0usize; n_cols + 1];
    let mut matched = 0usize;

    // Cheap greedy pass first: most columns match on their first free row
    for j in 0..n_cols {
        let (rows, _) = a.column(j);
        if let Some(&i) = rows.iter().find(|&&i| row_to_col[i].is_none()) {
            col_to_row[j] = Some(i);
            row_to_col[i] = Some(j);
            matched += 1;
        }
    }

    while bfs(a, &col_to_row, &row_to_col, &mut dist) {
        for j in 0..n_cols {
            if col_to_row[j].is_none() && augment(a, j, &mut col_to_row, &mut row_to_col, &mut dist)
            {
                matched += 1;
            }
        }
    }

    MatchingResult {
        col_to_row,
        row_to_col,
        structural_rank: matched,
    }
}

/// Structural rank of `a` (size of a maximum matching).
pub fn structural_rank(a: &CscData) -> usize {
    hopcroft_karp(a).structural_rank
}

/// BFS phase: layer columns by distance from the free columns.
///
/// Returns true if some free row is reachable.
fn bfs(
    a: &CscData,
    col_to_row: &[Option<usize>],
    row_to_col: &[Option<usize>],
    dist: &mut [usize],
) -> bool {
    let n_cols = col_to_row.len();
    let mut queue: VecDeque<usize> = VecDeque::with_capacity(n_cols);

    for j in 0..n_cols {
        if col_to_row[j].is_none() {
            dist[j] = 0;
            queue.push_back(j);
        } else {
            dist[j] = INF;
        }
    }
    dist[n_cols] = INF;

    while let Some(j) = queue.pop_front() {
        if dist[j] >= dist[n_cols] {
            continue;
        }
        let (rows, _) = a.column(j);
        for &i in rows {
            let next = row_to_col[i].unwrap_or(n_cols);
            if dist[next] == INF {
                dist[next] = dist[j] + 1;
                if next != n_cols {
                    queue.push_back(next);
                }
            }
        }
    }

    dist[n_cols] != INF
}

/// DFS phase: search an augmenting path from free column `root` along the
/// level graph and flip it.
///
/// Iterative, so deep paths on large matrices cannot overflow the stack.
fn augment(
    a: &CscData,
    root: usize,
    col_to_row: &mut [Option<usize>],
    row_to_col: &mut [Option<usize>],
    dist: &mut [usize],
) -> bool {
    let n_cols = col_to_row.len();
    // (column, next edge offset within the column, row chosen to reach the child)
    let mut stack: Vec<(usize, usize, usize)> = vec![(root, 0, 0)];

    while let Some(top) = stack.len().checked_sub(1) {
        let j = stack[top].0;
        let (rows, _) = a.column(j);
        let mut descended = false;

        while stack[top].1 < rows.len() {
            let i = rows[stack[top].1];
            stack[top].1 += 1;
            let next = row_to_col[i].unwrap_or(n_cols);
            if dist[next] != dist[j].wrapping_add(1) {
                continue;
            }

            if next == n_cols {
                // Free row reached: flip the path from the top of the stack down
                let mut row = i;
                while let Some((col, _, via)) = stack.pop() {
                    col_to_row[col] = Some(row);
                    row_to_col[row] = Some(col);
                    row = via;
                }
                return true;
            }

            stack.push((next, 0, i));
            descended = true;
            break;
        }

        if !descended {
            // Dead end: drop the column from this phase's level graph
            dist[j] = INF;
            stack.pop();
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csc(n_rows: usize, col_ptrs: Vec<usize>, row_indices: Vec<usize>) -> CscData {
        let n_cols = col_ptrs.len() - 1;
        let values = vec![1.0; row_indices.len()];
        CscData::new(col_ptrs, row_indices, values, [n_rows, n_cols]).unwrap()
    }

    fn assert_valid(result: &MatchingResult) {
        for (j, row) in result.col_to_row.iter().enumerate() {
            if let Some(i) = *row {
                assert_eq!(result.row_to_col[i], Some(j));
            }
        }
        let count = result.col_to_row.iter().filter(|r| r.is_some()).count();
        assert_eq!(count, result.structural_rank);
    }

    #[test]
    fn test_empty() {
        let result = hopcroft_karp(&csc(0, vec![0], vec![]));
        assert_eq!(result.structural_rank, 0);
    }

    #[test]
    fn test_diagonal() {
        let result = hopcroft_karp(&csc(3, vec![0, 1, 2, 3], vec![0, 1, 2]));

        assert_eq!(result.structural_rank, 3);
        assert_eq!(result.col_to_row, vec![Some(0), Some(1), Some(2)]);
        assert_valid(&result);
    }

    #[test]
    fn test_permutation_needed() {
        // [. x]
        // [x x]
        let result = hopcroft_karp(&csc(2, vec![0, 1, 3], vec![1, 0, 1]));

        assert_eq!(result.structural_rank, 2);
        assert_eq!(result.col_to_row, vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_augmenting_path() {
        // [x x .]
        // [x . x]
        // [. x x]
        // Greedy matches col0->row0, col1->row2 and then needs an augmenting
        // path to place col2
        let result = hopcroft_karp(&csc(3, vec![0, 2, 4, 6], vec![0, 1, 0, 2, 1, 2]));

        assert_eq!(result.structural_rank, 3);
        assert_valid(&result);
    }

    #[test]
    fn test_long_augmenting_chain() {
        // Column j holds rows j and j+1 (bidiagonal), column n-1 only row 0.
        // Greedy fills rows 0..n-1 and the last column forces a chain through
        // every column.
        let n = 200;
        let mut col_ptrs = vec![0];
        let mut rows = Vec::new();
        for j in 0..n - 1 {
            rows.push(j);
            rows.push(j + 1);
            col_ptrs.push(rows.len());
        }
        rows.push(0);
        col_ptrs.push(rows.len());

        let result = hopcroft_karp(&csc(n, col_ptrs, rows));
        assert_eq!(result.structural_rank, n);
        assert_valid(&result);
    }

    #[test]
    fn test_structurally_singular() {
        // [x .]
        // [x .]
        let result = hopcroft_karp(&csc(2, vec![0, 2, 2], vec![0, 1]));

        assert_eq!(result.structural_rank, 1);
        assert_eq!(result.first_unmatched_col(), Some(1));
        assert_eq!(structural_rank(&csc(2, vec![0, 2, 2], vec![0, 1])), 1);
    }

    #[test]
    fn test_rectangular() {
        // 4x2: column 0 rows {0,1}, column 1 rows {1,2,3}
        let result = hopcroft_karp(&csc(4, vec![0, 2, 5], vec![0, 1, 1, 2, 3]));
        assert_eq!(result.structural_rank, 2);
        assert_valid(&result);
    }
}
