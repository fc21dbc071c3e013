//! Bounded uniform subsample of cells with their 2-D layout and label.

use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{AtlasError, KeyKind, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub x: f64,
    pub y: f64,
    pub cell_type: String,
}

/// Row indices to keep: all rows in order when `sample_size >= n_cells`,
/// otherwise `sample_size` distinct rows drawn without replacement.
pub fn select_cells<R: Rng + ?Sized>(rng: &mut R, n_cells: usize, sample_size: usize) -> Vec<usize> {
    if n_cells <= sample_size {
        return (0..n_cells).collect();
    }
    index::sample(rng, n_cells, sample_size).into_vec()
}

pub fn sample<R: Rng + ?Sized>(
    dataset: &Dataset,
    embedding_key: &str,
    label_key: &str,
    sample_size: usize,
    rng: &mut R,
) -> Result<Vec<SampleRecord>> {
    let embedding = dataset.embeddings.get(embedding_key)?;
    let labels = dataset
        .cell_metadata
        .column(label_key, KeyKind::CellMetadata)?;
    if embedding.n_dims < 2 {
        return Err(AtlasError::InvalidDataset(format!(
            "obsm '{}' has {} dimension(s); at least 2 are required",
            embedding_key, embedding.n_dims
        )));
    }

    let rows = select_cells(rng, dataset.cell_count(), sample_size);
    let records = rows
        .into_iter()
        .map(|row| {
            let coords = embedding.row(row);
            SampleRecord {
                x: coords[0],
                y: coords[1],
                cell_type: labels.label_at(row),
            }
        })
        .collect();
    Ok(records)
}
