use crate::error::{AtlasError, KeyKind, Result};

/// Names and shape of a dataset, readable without loading the matrix.
#[derive(Debug, Clone, Default)]
pub struct DatasetKeys {
    pub n_cells: usize,
    pub n_genes: usize,
    pub nnz: usize,
    pub obs_columns: Vec<String>,
    pub var_columns: Vec<String>,
    pub obsm_keys: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct RequiredKeys<'a> {
    pub cell_type: &'a str,
    pub gene_name: &'a str,
    pub embedding: &'a str,
}

/// Checks every required key up front so no pipeline starts on a dataset
/// that another pipeline would reject.
pub fn validate_keys(keys: &DatasetKeys, required: &RequiredKeys<'_>) -> Result<()> {
    if !keys.obs_columns.iter().any(|c| c == required.cell_type) {
        return Err(AtlasError::missing_key(
            KeyKind::CellMetadata,
            required.cell_type,
            &keys.obs_columns,
        ));
    }
    if !keys.var_columns.iter().any(|c| c == required.gene_name) {
        return Err(AtlasError::missing_key(
            KeyKind::GeneMetadata,
            required.gene_name,
            &keys.var_columns,
        ));
    }
    if !keys.obsm_keys.iter().any(|c| c == required.embedding) {
        return Err(AtlasError::missing_key(
            KeyKind::Embedding,
            required.embedding,
            &keys.obsm_keys,
        ));
    }
    Ok(())
}
