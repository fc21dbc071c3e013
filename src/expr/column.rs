use crate::error::Result;

/// Column-addressable sparse storage: rows are cells, columns are genes.
pub trait SparseColumns: Sync {
    fn n_rows(&self) -> usize;
    fn n_cols(&self) -> usize;
    fn nnz(&self) -> usize;
    /// Non-zero entries of one column. Views are cheap and can be iterated repeatedly.
    fn column(&self, col: usize) -> Result<ColumnView<'_>>;
}

/// Borrowed non-zero `(row, value)` pairs of a single column, rows sorted.
#[derive(Debug, Clone, Copy)]
pub struct ColumnView<'a> {
    rows: &'a [u32],
    values: &'a [f64],
}

impl<'a> ColumnView<'a> {
    pub fn new(rows: &'a [u32], values: &'a [f64]) -> Self {
        debug_assert_eq!(rows.len(), values.len());
        Self { rows, values }
    }

    pub fn nnz(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(self) -> impl Iterator<Item = (usize, f64)> + 'a {
        self.rows
            .iter()
            .zip(self.values.iter())
            .map(|(&row, &value)| (row as usize, value))
    }

    /// Writes the full column into `dense`, zeroing every implicit entry.
    pub fn densify_into(&self, dense: &mut [f64]) {
        dense.fill(0.0);
        for (row, value) in self.iter() {
            dense[row] += value;
        }
    }
}
