use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{AtlasError, Result};
use crate::math::AggregationResult;
use crate::sample::SampleRecord;

/// Serializes `value` in full, then replaces `path` in one rename so readers
/// never observe a truncated document.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
    .map_err(|source| AtlasError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let io_err = |source: std::io::Error| AtlasError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let tmp = staging_path(path);
    if let Err(source) = fs::write(&tmp, &bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(source));
    }
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(source));
    }
    info!(path = %path.display(), bytes = bytes.len(), "json_written");
    Ok(())
}

/// `[{"x": .., "y": .., "cell_type": ..}, ...]`
pub fn write_umap(path: &Path, records: &[SampleRecord], pretty: bool) -> Result<()> {
    write_json(path, records, pretty)
}

/// `{"GENE": {"category": mean, ...}, ...}`
pub fn write_means(path: &Path, result: &AggregationResult, pretty: bool) -> Result<()> {
    write_json(path, result, pretty)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}
