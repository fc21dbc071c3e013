//! In-memory view of one loaded AnnData dataset.

use std::collections::BTreeMap;

use crate::error::{AtlasError, KeyKind, Result};
use crate::expr::{CscMatrix, SparseColumns};

pub mod keys;

pub use keys::{DatasetKeys, RequiredKeys, validate_keys};

/// Label used for cells whose categorical code is missing.
pub const MISSING_LABEL: &str = "NA";

#[derive(Debug, Clone)]
pub enum Column {
    Categorical {
        codes: Vec<i32>,
        categories: Vec<String>,
    },
    Strings(Vec<String>),
    Integer(Vec<i64>),
    Numeric(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Categorical { codes, .. } => codes.len(),
            Column::Strings(values) => values.len(),
            Column::Integer(values) => values.len(),
            Column::Numeric(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label of row `i` as a string. Numbers render the way pandas prints
    /// them: `3` for integers, `3.0` for floats.
    pub fn label_at(&self, i: usize) -> String {
        match self {
            Column::Categorical { codes, categories } => {
                let code = codes[i];
                if code < 0 {
                    MISSING_LABEL.to_string()
                } else {
                    categories[code as usize].clone()
                }
            }
            Column::Strings(values) => values[i].clone(),
            Column::Integer(values) => values[i].to_string(),
            Column::Numeric(values) => float_label(values[i]),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        (0..self.len()).map(|i| self.label_at(i)).collect()
    }
}

pub fn float_label(v: f64) -> String {
    if v.is_nan() {
        MISSING_LABEL.to_string()
    } else {
        format!("{:?}", v)
    }
}

/// Per-row metadata: the names of every column present in the file, plus
/// the subset that was actually loaded.
#[derive(Debug, Clone, Default)]
pub struct Table {
    names: Vec<String>,
    columns: BTreeMap<String, Column>,
}

impl Table {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            columns: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, column: Column) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
        self.columns.insert(name.to_string(), column);
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str, kind: KeyKind) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| AtlasError::missing_key(kind, name, &self.names))
    }
}

/// Row-major `n_rows x n_dims` coordinates.
#[derive(Debug, Clone)]
pub struct Embedding {
    pub n_rows: usize,
    pub n_dims: usize,
    pub values: Vec<f64>,
}

impl Embedding {
    pub fn new(n_rows: usize, n_dims: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != n_rows * n_dims {
            return Err(AtlasError::InvalidDataset(format!(
                "embedding buffer length ({}) does not match {} x {}",
                values.len(),
                n_rows,
                n_dims
            )));
        }
        Ok(Self {
            n_rows,
            n_dims,
            values,
        })
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n_dims..(i + 1) * self.n_dims]
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmbeddingSet {
    names: Vec<String>,
    entries: BTreeMap<String, Embedding>,
}

impl EmbeddingSet {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, embedding: Embedding) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
        self.entries.insert(name.to_string(), embedding);
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Result<&Embedding> {
        self.entries
            .get(name)
            .ok_or_else(|| AtlasError::missing_key(KeyKind::Embedding, name, &self.names))
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub expression: CscMatrix,
    pub cell_metadata: Table,
    pub gene_metadata: Table,
    pub embeddings: EmbeddingSet,
}

impl Dataset {
    /// Assembles a dataset, checking every loaded column and embedding against
    /// the matrix shape.
    pub fn new(
        expression: CscMatrix,
        cell_metadata: Table,
        gene_metadata: Table,
        embeddings: EmbeddingSet,
    ) -> Result<Self> {
        let n_cells = expression.n_rows();
        let n_genes = expression.n_cols();
        for (name, column) in &cell_metadata.columns {
            if column.len() != n_cells {
                return Err(AtlasError::InvalidDataset(format!(
                    "obs column '{}' has {} rows, expected {}",
                    name,
                    column.len(),
                    n_cells
                )));
            }
        }
        for (name, column) in &gene_metadata.columns {
            if column.len() != n_genes {
                return Err(AtlasError::InvalidDataset(format!(
                    "var column '{}' has {} rows, expected {}",
                    name,
                    column.len(),
                    n_genes
                )));
            }
        }
        for (name, embedding) in &embeddings.entries {
            if embedding.n_rows != n_cells {
                return Err(AtlasError::InvalidDataset(format!(
                    "obsm '{}' has {} rows, expected {}",
                    name, embedding.n_rows, n_cells
                )));
            }
        }
        for column in cell_metadata
            .columns
            .values()
            .chain(gene_metadata.columns.values())
        {
            if let Column::Categorical { codes, categories } = column {
                if let Some(&bad) = codes.iter().find(|&&c| c >= categories.len() as i32) {
                    return Err(AtlasError::InvalidDataset(format!(
                        "categorical code {} exceeds {} categories",
                        bad,
                        categories.len()
                    )));
                }
            }
        }
        Ok(Self {
            expression,
            cell_metadata,
            gene_metadata,
            embeddings,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.expression.n_rows()
    }

    pub fn gene_count(&self) -> usize {
        self.expression.n_cols()
    }

    pub fn nnz(&self) -> usize {
        self.expression.nnz()
    }

    /// Key listing of an in-memory dataset, shaped like the one read from disk.
    pub fn keys(&self) -> DatasetKeys {
        DatasetKeys {
            n_cells: self.cell_count(),
            n_genes: self.gene_count(),
            nnz: self.nnz(),
            obs_columns: self.cell_metadata.names().to_vec(),
            var_columns: self.gene_metadata.names().to_vec(),
            obsm_keys: self.embeddings.names().to_vec(),
        }
    }
}
