use crate::error::{AtlasError, Result};
use crate::expr::column::{ColumnView, SparseColumns};

/// Cell x gene expression matrix compressed by gene (column).
///
/// `col_ptr[g]..col_ptr[g + 1]` spans the non-zero entries of gene `g`;
/// `row_idx` holds the cell index of each entry, sorted within a column.
/// Repeated cell indices are allowed and summed, as scipy does.
#[derive(Debug, Clone)]
pub struct CscMatrix {
    n_cells: usize,
    n_genes: usize,
    col_ptr: Vec<u64>,
    row_idx: Vec<u32>,
    values: Vec<f64>,
}

impl CscMatrix {
    pub fn new(
        n_cells: usize,
        n_genes: usize,
        col_ptr: Vec<u64>,
        row_idx: Vec<u32>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if col_ptr.len() != n_genes + 1 {
            return Err(AtlasError::InvalidDataset(format!(
                "col_ptr length ({}) does not match n_genes+1 ({})",
                col_ptr.len(),
                n_genes + 1
            )));
        }
        if row_idx.len() != values.len() {
            return Err(AtlasError::InvalidDataset(format!(
                "row index length ({}) does not match value length ({})",
                row_idx.len(),
                values.len()
            )));
        }
        if col_ptr[0] != 0 || col_ptr[n_genes] as usize != values.len() {
            return Err(AtlasError::InvalidDataset(
                "col_ptr must start at 0 and end at nnz".to_string(),
            ));
        }
        for gene in 0..n_genes {
            let start = col_ptr[gene];
            let end = col_ptr[gene + 1];
            if end < start || end as usize > values.len() {
                return Err(AtlasError::InvalidDataset(format!(
                    "col_ptr is not monotonic at gene {}",
                    gene
                )));
            }
            let rows = &row_idx[start as usize..end as usize];
            for pair in rows.windows(2) {
                if pair[1] < pair[0] {
                    return Err(AtlasError::InvalidDataset(format!(
                        "cell indices of gene {} are not sorted",
                        gene
                    )));
                }
            }
            if let Some(&last) = rows.last() {
                if last as usize >= n_cells {
                    return Err(AtlasError::InvalidDataset(format!(
                        "cell index {} out of range for {} cells",
                        last, n_cells
                    )));
                }
            }
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(AtlasError::InvalidDataset(format!(
                "non-finite expression value at entry {}",
                pos
            )));
        }
        Ok(Self {
            n_cells,
            n_genes,
            col_ptr,
            row_idx,
            values,
        })
    }

    /// Builds gene-major storage from cell-major (CSR) arrays.
    ///
    /// `indptr` has `n_cells + 1` entries and `indices` are gene indices.
    pub fn from_csr(
        n_cells: usize,
        n_genes: usize,
        indptr: &[u64],
        indices: &[u32],
        data: &[f64],
    ) -> Result<Self> {
        if indptr.len() != n_cells + 1 {
            return Err(AtlasError::InvalidDataset(format!(
                "CSR indptr length ({}) does not match n_cells+1 ({})",
                indptr.len(),
                n_cells + 1
            )));
        }
        if indices.len() != data.len() {
            return Err(AtlasError::InvalidDataset(format!(
                "CSR indices length ({}) does not match data length ({})",
                indices.len(),
                data.len()
            )));
        }
        let nnz = data.len();
        if indptr[0] != 0 || indptr[n_cells] as usize != nnz {
            return Err(AtlasError::InvalidDataset(
                "CSR indptr must start at 0 and end at nnz".to_string(),
            ));
        }

        let mut col_ptr = vec![0u64; n_genes + 1];
        for &gene in indices {
            if gene as usize >= n_genes {
                return Err(AtlasError::InvalidDataset(format!(
                    "gene index {} out of range for {} genes",
                    gene, n_genes
                )));
            }
            col_ptr[gene as usize + 1] += 1;
        }
        for g in 0..n_genes {
            col_ptr[g + 1] += col_ptr[g];
        }

        // Cells are visited in ascending order, so each gene's rows come out sorted.
        let mut row_idx = vec![0u32; nnz];
        let mut values = vec![0f64; nnz];
        let mut offsets = col_ptr.clone();
        for cell in 0..n_cells {
            let start = indptr[cell] as usize;
            let end = indptr[cell + 1] as usize;
            if end < start || end > nnz {
                return Err(AtlasError::InvalidDataset(format!(
                    "CSR indptr is not monotonic at cell {}",
                    cell
                )));
            }
            for k in start..end {
                let g = indices[k] as usize;
                let dst = offsets[g] as usize;
                row_idx[dst] = cell as u32;
                values[dst] = data[k];
                offsets[g] += 1;
            }
        }

        Self::new(n_cells, n_genes, col_ptr, row_idx, values)
    }

    /// Accepts gene-major arrays whose cell indices may be unsorted within a column.
    pub fn from_csc(
        n_cells: usize,
        n_genes: usize,
        col_ptr: Vec<u64>,
        mut row_idx: Vec<u32>,
        mut values: Vec<f64>,
    ) -> Result<Self> {
        if col_ptr.len() == n_genes + 1 && row_idx.len() == values.len() {
            let mut pairs: Vec<(u32, f64)> = Vec::new();
            for gene in 0..n_genes {
                let start = col_ptr[gene] as usize;
                let end = col_ptr[gene + 1] as usize;
                if end < start || end > row_idx.len() {
                    break;
                }
                let rows = &row_idx[start..end];
                if rows.windows(2).all(|w| w[0] <= w[1]) {
                    continue;
                }
                pairs.clear();
                pairs.extend(rows.iter().copied().zip(values[start..end].iter().copied()));
                pairs.sort_by_key(|(row, _)| *row);
                for (k, (row, value)) in pairs.iter().enumerate() {
                    row_idx[start + k] = *row;
                    values[start + k] = *value;
                }
            }
        }
        Self::new(n_cells, n_genes, col_ptr, row_idx, values)
    }

    /// Builds from a row-major dense `n_cells x n_genes` buffer, keeping non-zeros only.
    pub fn from_dense(n_cells: usize, n_genes: usize, dense: &[f64]) -> Result<Self> {
        if dense.len() != n_cells * n_genes {
            return Err(AtlasError::InvalidDataset(format!(
                "dense buffer length ({}) does not match {} x {}",
                dense.len(),
                n_cells,
                n_genes
            )));
        }
        let mut col_ptr = Vec::with_capacity(n_genes + 1);
        let mut row_idx = Vec::new();
        let mut values = Vec::new();
        col_ptr.push(0u64);
        for gene in 0..n_genes {
            for cell in 0..n_cells {
                let v = dense[cell * n_genes + gene];
                if v != 0.0 {
                    row_idx.push(cell as u32);
                    values.push(v);
                }
            }
            col_ptr.push(values.len() as u64);
        }
        Self::new(n_cells, n_genes, col_ptr, row_idx, values)
    }

    pub fn empty(n_cells: usize, n_genes: usize) -> Self {
        Self {
            n_cells,
            n_genes,
            col_ptr: vec![0u64; n_genes + 1],
            row_idx: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl SparseColumns for CscMatrix {
    fn n_rows(&self) -> usize {
        self.n_cells
    }

    fn n_cols(&self) -> usize {
        self.n_genes
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn column(&self, col: usize) -> Result<ColumnView<'_>> {
        if col >= self.n_genes {
            return Err(AtlasError::InvalidDataset(format!(
                "gene {} out of range for {} genes",
                col, self.n_genes
            )));
        }
        let start = self.col_ptr[col] as usize;
        let end = self.col_ptr[col + 1] as usize;
        Ok(ColumnView::new(
            &self.row_idx[start..end],
            &self.values[start..end],
        ))
    }
}
