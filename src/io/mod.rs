#[cfg(feature = "hdf5")]
pub mod h5ad;
#[cfg(not(feature = "hdf5"))]
pub mod h5ad {
    use std::path::Path;

    use crate::dataset::{Dataset, DatasetKeys, RequiredKeys};
    use crate::error::AtlasError;

    fn disabled(path: &Path) -> AtlasError {
        AtlasError::DatasetRead {
            path: path.to_path_buf(),
            reason: "H5AD support not enabled. Rebuild with --features hdf5".to_string(),
        }
    }

    pub fn read_keys(path: &Path) -> Result<DatasetKeys, AtlasError> {
        Err(disabled(path))
    }

    pub fn load_dataset(path: &Path, _required: &RequiredKeys<'_>) -> Result<Dataset, AtlasError> {
        Err(disabled(path))
    }
}
pub mod json_writer;
pub mod summary;
