//! Minimum-cost assignment of the rows of a rectangular cost matrix to
//! distinct columns, solved with the `munkres` crate.
//!
//! Munkres wants a square matrix, so `rows < cols` is padded with zero-cost
//! dummy rows. They take the leftover columns and add nothing to the total.

use munkres::{solve_assignment, WeightMatrix};

pub(crate) struct CostMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<i64>,
}

impl CostMatrix {
    /// `rows <= cols` is required.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> u32) -> Self {
        debug_assert!(rows <= cols);
        let mut cells = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                cells.push(i64::from(f(r, c)));
            }
        }
        Self { rows, cols, cells }
    }

    #[inline]
    fn get(&self, r: usize, c: usize) -> i64 {
        self.cells[r * self.cols + c]
    }

    /// Total cost of an optimal assignment of every row.
    pub fn min_assignment(&self) -> u64 {
        if self.rows == 0 {
            return 0;
        }
        let n = self.cols;
        let mut square = self.cells.clone();
        square.resize(n * n, 0);
        let mut weights = WeightMatrix::from_row_vec(n, square);
        match solve_assignment(&mut weights) {
            Ok(assignment) => assignment
                .iter()
                .filter(|pos| pos.row < self.rows)
                .map(|pos| self.get(pos.row, pos.column) as u64)
                .sum(),
            Err(_) => {
                // unreachable for integer weights
                tracing::warn!(rows = self.rows, cols = self.cols, "assignment not solvable");
                (0..self.rows)
                    .map(|r| (0..self.cols).map(|c| self.get(r, c)).min().unwrap_or(0) as u64)
                    .sum()
            }
        }
    }
}
