//! Primitive kernels of the left-looking factorization
//!
//! - **scatter_column**: copy a sparse column into the dense work vector
//! - **sparse_axpy**: `work[i] -= scale * values[i]` over sparse indices
//! - **Reach**: nonzero pattern of a sparse triangular solve, topologically
//!   ordered, by depth-first search over the graph of L

/// Scatter a sparse column into a dense work vector
#[inline]
pub fn scatter_column(values: &[f64], row_indices: &[usize], work: &mut [f64]) {
    for (&row, &val) in row_indices.iter().zip(values) {
        work[row] = val;
    }
}

/// Sparse AXPY: `work[row_indices[k]] -= scale * values[k]`
#[inline]
pub fn sparse_axpy(scale: f64, values: &[f64], row_indices: &[usize], work: &mut [f64]) {
    for (&row, &val) in row_indices.iter().zip(values) {
        work[row] -= scale * val;
    }
}

/// Depth-first reach over the column graph of a partially built L
///
/// Node `i` is an original row index. A row that has been pivoted to
/// position `j` has edges to the rows stored in column `j` of L; an
/// unpivoted row has none. Buffers are reused across columns.
pub struct Reach {
    /// Rows reached; postorder while searching, topological once done
    order: Vec<usize>,
    /// `mark[i] == stamp` means row i was visited for the current column
    mark: Vec<usize>,
    stamp: usize,
    /// Explicit DFS stack of (row, next edge offset)
    stack: Vec<(usize, usize)>,
}

impl Reach {
    /// Buffers for an `n`-row matrix
    pub fn new(n: usize) -> Self {
        Self {
            order: Vec::with_capacity(n),
            mark: vec![0; n],
            stamp: 0,
            stack: Vec::with_capacity(n),
        }
    }

    /// Compute the rows reachable from `roots`
    ///
    /// `pinv[i]` is the pivot position of row i, `l_col_ptrs`/`l_rows` the
    /// columns of L built so far (original row indices).
    ///
    /// Returns the reached rows in topological order: every row comes
    /// before the rows its L column updates.
    pub fn compute(
        &mut self,
        roots: &[usize],
        pinv: &[Option<usize>],
        l_col_ptrs: &[usize],
        l_rows: &[usize],
    ) -> &[usize] {
        self.stamp += 1;
        self.order.clear();

        for &root in roots {
            if self.mark[root] == self.stamp {
                continue;
            }
            self.mark[root] = self.stamp;
            self.stack.push((root, 0));

            while let Some(top) = self.stack.len().checked_sub(1) {
                let (node, offset) = self.stack[top];
                let edges: &[usize] = match pinv[node] {
                    Some(j) => &l_rows[l_col_ptrs[j]..l_col_ptrs[j + 1]],
                    None => &[],
                };

                match edges[offset..].iter().position(|&r| self.mark[r] != self.stamp) {
                    Some(skip) => {
                        let child = edges[offset + skip];
                        self.stack[top].1 = offset + skip + 1;
                        self.mark[child] = self.stamp;
                        self.stack.push((child, 0));
                    }
                    None => {
                        self.stack.pop();
                        self.order.push(node);
                    }
                }
            }
        }

        self.order.reverse();
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scatter_axpy() {
        let mut work = vec![0.0; 6];
        scatter_column(&[1.0, 2.0, 3.0], &[0, 2, 4], &mut work);
        assert_eq!(work, vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);

        sparse_axpy(2.0, &[0.5, 1.0], &[2, 5], &mut work);
        assert_eq!(work, vec![1.0, 0.0, 1.0, 0.0, 3.0, -2.0]);
    }

    #[test]
    fn test_reach_topological() {
        // Rows 0 and 1 are pivoted at positions 0 and 1.
        // L column 0 holds row 1 and row 3, L column 1 holds row 2.
        let pinv = vec![Some(0), Some(1), None, None];
        let l_col_ptrs = vec![0, 2, 3];
        let l_rows = vec![1, 3, 2];
        let mut reach = Reach::new(4);

        let order = reach.compute(&[0], &pinv, &l_col_ptrs, &l_rows).to_vec();

        assert_eq!(order.len(), 4);
        let pos = |r: usize| order.iter().position(|&x| x == r).unwrap();
        assert_eq!(order[0], 0);
        assert!(pos(1) < pos(2));

        // Unpivoted root has no edges
        let order = reach.compute(&[3], &pinv, &l_col_ptrs, &l_rows).to_vec();
        assert_eq!(order, vec![3]);
    }
}
