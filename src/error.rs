//! Typed errors raised at the library seams.
//!
//! Stages and the binary wrap these in `anyhow::Error`; callers that need to
//! branch on the failure kind can `downcast_ref::<AtlasError>()`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which metadata collection a key was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    CellMetadata,
    GeneMetadata,
    Embedding,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::CellMetadata => f.write_str("obs column"),
            KeyKind::GeneMetadata => f.write_str("var column"),
            KeyKind::Embedding => f.write_str("obsm key"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("failed to read dataset {}: {reason}", path.display())]
    DatasetRead { path: PathBuf, reason: String },

    #[error("{kind} '{key}' not found; available: [{}]", available.join(", "))]
    MissingKey {
        kind: KeyKind,
        key: String,
        available: Vec<String>,
    },

    #[error("dataset is empty ({cells} cells, {genes} genes)")]
    EmptyDataset { cells: usize, genes: usize },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AtlasError {
    pub fn missing_key(kind: KeyKind, key: &str, available: &[String]) -> Self {
        AtlasError::MissingKey {
            kind,
            key: key.to_string(),
            available: available.to_vec(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;
