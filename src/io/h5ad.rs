use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use hdf5::types::{FloatSize, IntSize, TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{File, Group, Location};
use tracing::info;

use crate::dataset::{
    Column, Dataset, DatasetKeys, Embedding, EmbeddingSet, MISSING_LABEL, RequiredKeys, Table,
    float_label, validate_keys,
};
use crate::error::AtlasError;
use crate::expr::CscMatrix;

const LEGACY_CATEGORIES: &str = "__categories";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XEncoding {
    Csr,
    Csc,
    Dense,
}

/// Shape and key names only; the matrix is not read.
pub fn read_keys(path: &Path) -> Result<DatasetKeys, AtlasError> {
    read_keys_inner(path).map_err(|e| read_error(path, e))
}

/// Loads the matrix plus the three required entries after checking they exist.
pub fn load_dataset(path: &Path, required: &RequiredKeys<'_>) -> Result<Dataset, AtlasError> {
    let keys = read_keys(path)?;
    validate_keys(&keys, required)?;
    let (expression, cell_metadata, gene_metadata, embeddings) =
        load_inner(path, &keys, required).map_err(|e| read_error(path, e))?;
    Dataset::new(expression, cell_metadata, gene_metadata, embeddings)
}

fn read_error(path: &Path, err: anyhow::Error) -> AtlasError {
    AtlasError::DatasetRead {
        path: path.to_path_buf(),
        reason: format!("{:#}", err),
    }
}

fn read_keys_inner(path: &Path) -> Result<DatasetKeys> {
    let file = File::open(path).context("failed to open H5AD file")?;
    let (encoding, n_cells, n_genes, nnz) = read_x_meta(&file)?;
    info!(?encoding, n_cells, n_genes, nnz, "h5ad_x_meta");

    Ok(DatasetKeys {
        n_cells,
        n_genes,
        nnz,
        obs_columns: table_names(&file, "obs")?,
        var_columns: table_names(&file, "var")?,
        obsm_keys: member_names_or_empty(&file, "obsm")?,
    })
}

fn load_inner(
    path: &Path,
    keys: &DatasetKeys,
    required: &RequiredKeys<'_>,
) -> Result<(CscMatrix, Table, Table, EmbeddingSet)> {
    let file = File::open(path).context("failed to open H5AD file")?;
    let expression = read_matrix(&file)?;

    let obs = file.group("obs").context("missing group: obs")?;
    let mut cell_metadata = Table::new(keys.obs_columns.clone());
    let column = read_column(&obs, required.cell_type)
        .with_context(|| format!("failed to read obs/{}", required.cell_type))?;
    cell_metadata.insert(required.cell_type, column);

    let var = file.group("var").context("missing group: var")?;
    let mut gene_metadata = Table::new(keys.var_columns.clone());
    let column = read_column(&var, required.gene_name)
        .with_context(|| format!("failed to read var/{}", required.gene_name))?;
    gene_metadata.insert(required.gene_name, column);

    let obsm = file.group("obsm").context("missing group: obsm")?;
    let mut embeddings = EmbeddingSet::new(keys.obsm_keys.clone());
    let embedding = read_embedding(&obsm, required.embedding)
        .with_context(|| format!("failed to read obsm/{}", required.embedding))?;
    embeddings.insert(required.embedding, embedding);

    Ok((expression, cell_metadata, gene_metadata, embeddings))
}

fn read_x_meta(file: &File) -> Result<(XEncoding, usize, usize, usize)> {
    if let Ok(x) = file.group("X") {
        let encoding = sparse_encoding(&x)?;
        let [n_cells, n_genes] = read_shape(&x)?;
        let data = x.dataset("data").context("missing X/data")?;
        let indices = x.dataset("indices").context("missing X/indices")?;
        let indptr = x.dataset("indptr").context("missing X/indptr")?;
        let nnz = data.size();
        if indices.size() != nnz {
            bail!(
                "X/indices length ({}) does not match X/data length ({})",
                indices.size(),
                nnz
            );
        }
        let expected = match encoding {
            XEncoding::Csr => n_cells + 1,
            _ => n_genes + 1,
        };
        if indptr.size() != expected {
            bail!(
                "X/indptr length ({}) does not match expected {}",
                indptr.size(),
                expected
            );
        }
        return Ok((encoding, n_cells, n_genes, nnz));
    }
    let x = file.dataset("X").context("missing X")?;
    let shape = x.shape();
    if shape.len() != 2 {
        bail!("dense X must be 2-D, got {} dimension(s)", shape.len());
    }
    Ok((XEncoding::Dense, shape[0], shape[1], x.size()))
}

fn sparse_encoding(x: &Group) -> Result<XEncoding> {
    let encoding = match read_str_attr(x, "encoding-type")? {
        Some(value) => value,
        None => read_str_attr(x, "h5sparse_format")?
            .map(|f| format!("{}_matrix", f))
            .context("missing X attribute: encoding-type")?,
    };
    match encoding.as_str() {
        "csr_matrix" => Ok(XEncoding::Csr),
        "csc_matrix" => Ok(XEncoding::Csc),
        other => bail!(
            "unsupported X encoding-type '{}'; supported: csr_matrix, csc_matrix",
            other
        ),
    }
}

fn read_shape(x: &Group) -> Result<[usize; 2]> {
    let shape: Vec<i64> = if let Ok(attr) = x.attr("shape") {
        attr.read_raw().context("failed to read X shape attribute")?
    } else if let Ok(attr) = x.attr("h5sparse_shape") {
        attr.read_raw().context("failed to read X h5sparse_shape")?
    } else {
        let ds = x.dataset("shape").context("missing X shape")?;
        read_int_vec(&ds).context("failed to read X/shape")?
    };
    if shape.len() != 2 || shape.iter().any(|&v| v < 0) {
        bail!("X shape must be two non-negative values");
    }
    Ok([shape[0] as usize, shape[1] as usize])
}

fn read_matrix(file: &File) -> Result<CscMatrix> {
    let (encoding, n_cells, n_genes, _) = read_x_meta(file)?;
    if encoding == XEncoding::Dense {
        let x = file.dataset("X").context("missing X")?;
        let dense = read_f64_vec(&x).context("failed to read dense X")?;
        return Ok(CscMatrix::from_dense(n_cells, n_genes, &dense)?);
    }

    let x = file.group("X").context("missing group: X")?;
    let data = read_f64_vec(&x.dataset("data")?).context("failed to read X/data")?;
    let indices = read_u32_vec(&x.dataset("indices")?).context("failed to read X/indices")?;
    let indptr = read_u64_vec(&x.dataset("indptr")?).context("failed to read X/indptr")?;

    let matrix = match encoding {
        XEncoding::Csr => CscMatrix::from_csr(n_cells, n_genes, &indptr, &indices, &data)?,
        _ => CscMatrix::from_csc(n_cells, n_genes, indptr, indices, data)?,
    };
    Ok(matrix)
}

fn table_names(file: &File, name: &str) -> Result<Vec<String>> {
    let group = file
        .group(name)
        .with_context(|| format!("missing group: {}", name))?;
    let names = group
        .member_names()
        .with_context(|| format!("failed to list {}", name))?;
    Ok(names
        .into_iter()
        .filter(|n| n != LEGACY_CATEGORIES)
        .collect())
}

fn member_names_or_empty(file: &File, name: &str) -> Result<Vec<String>> {
    if !file.link_exists(name) {
        return Ok(Vec::new());
    }
    let group = file
        .group(name)
        .with_context(|| format!("{} is not a group", name))?;
    Ok(group.member_names()?)
}

fn read_column(table: &Group, name: &str) -> Result<Column> {
    if let Ok(group) = table.group(name) {
        let encoding = read_str_attr(&group, "encoding-type")?.unwrap_or_default();
        return match encoding.as_str() {
            "categorical" => {
                let categories = read_labels(&group.dataset("categories")?)?;
                let codes = read_i32_vec(&group.dataset("codes")?)?;
                Ok(Column::Categorical { codes, categories })
            }
            "nullable-integer" | "nullable-boolean" => {
                let values = group.dataset("values")?;
                let mut labels = if encoding == "nullable-integer" {
                    int_labels(read_int_vec(&values)?)
                } else {
                    bool_labels(read_bool_vec(&values)?)
                };
                if group.link_exists("mask") {
                    let mask = read_bool_vec(&group.dataset("mask")?)?;
                    if mask.len() != labels.len() {
                        bail!(
                            "mask length ({}) does not match values ({})",
                            mask.len(),
                            labels.len()
                        );
                    }
                    for (label, masked) in labels.iter_mut().zip(mask) {
                        if masked {
                            *label = MISSING_LABEL.to_string();
                        }
                    }
                }
                Ok(Column::Strings(labels))
            }
            other => bail!("unsupported column encoding '{}'", other),
        };
    }

    let ds = table.dataset(name)?;
    let legacy = format!("{}/{}", LEGACY_CATEGORIES, name);
    if table.link_exists(LEGACY_CATEGORIES) && table.link_exists(&legacy) {
        let categories = read_labels(&table.dataset(&legacy)?)?;
        let codes = read_i32_vec(&ds)?;
        return Ok(Column::Categorical { codes, categories });
    }
    Ok(match descriptor(&ds)? {
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
            Column::Integer(read_int_vec(&ds)?)
        }
        TypeDescriptor::Float(_) => Column::Numeric(read_f64_vec(&ds)?),
        TypeDescriptor::Boolean | TypeDescriptor::Enum(_) => {
            Column::Strings(bool_labels(read_bool_vec(&ds)?))
        }
        _ => Column::Strings(read_string_vec(&ds)?),
    })
}

fn read_embedding(obsm: &Group, name: &str) -> Result<Embedding> {
    let ds = obsm.dataset(name)?;
    let shape = ds.shape();
    if shape.len() != 2 {
        bail!("expected a 2-D array, got {} dimension(s)", shape.len());
    }
    let values = read_f64_vec(&ds)?;
    Ok(Embedding::new(shape[0], shape[1], values)?)
}

fn read_str_attr(loc: &Location, name: &str) -> Result<Option<String>> {
    let Ok(attr) = loc.attr(name) else {
        return Ok(None);
    };
    if let Ok(v) = attr.read_scalar::<VarLenUnicode>() {
        return Ok(Some(v.as_str().to_string()));
    }
    if let Ok(v) = attr.read_scalar::<VarLenAscii>() {
        return Ok(Some(v.as_str().to_string()));
    }
    bail!("attribute '{}' is not a string", name)
}

fn descriptor(ds: &hdf5::Dataset) -> Result<TypeDescriptor> {
    ds.dtype()
        .and_then(|dtype| dtype.to_descriptor())
        .context("failed to read dataset type")
}

fn read_string_vec(ds: &hdf5::Dataset) -> Result<Vec<String>> {
    match descriptor(ds)? {
        TypeDescriptor::VarLenUnicode => Ok(ds
            .read_raw::<VarLenUnicode>()?
            .iter()
            .map(|s| s.as_str().to_string())
            .collect()),
        TypeDescriptor::VarLenAscii => Ok(ds
            .read_raw::<VarLenAscii>()?
            .iter()
            .map(|s| s.as_str().to_string())
            .collect()),
        other => bail!("expected a string array, found {:?}", other),
    }
}

/// Categories may be strings, numbers or booleans.
fn read_labels(ds: &hdf5::Dataset) -> Result<Vec<String>> {
    match descriptor(ds)? {
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
            Ok(int_labels(read_int_vec(ds)?))
        }
        TypeDescriptor::Float(_) => Ok(read_f64_vec(ds)?.into_iter().map(float_label).collect()),
        TypeDescriptor::Boolean | TypeDescriptor::Enum(_) => Ok(bool_labels(read_bool_vec(ds)?)),
        _ => read_string_vec(ds),
    }
}

fn int_labels(values: Vec<i64>) -> Vec<String> {
    values.into_iter().map(|v| v.to_string()).collect()
}

fn bool_labels(values: Vec<bool>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| if v { "True" } else { "False" }.to_string())
        .collect()
}

/// Any stored float or integer width, widened without loss where possible.
fn read_f64_vec(ds: &hdf5::Dataset) -> Result<Vec<f64>> {
    match descriptor(ds)? {
        TypeDescriptor::Float(FloatSize::U4) => {
            Ok(ds.read_raw::<f32>()?.into_iter().map(f64::from).collect())
        }
        TypeDescriptor::Float(_) => Ok(ds.read_raw::<f64>()?),
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
            Ok(read_int_vec(ds)?.into_iter().map(|v| v as f64).collect())
        }
        TypeDescriptor::Boolean | TypeDescriptor::Enum(_) => Ok(read_bool_vec(ds)?
            .into_iter()
            .map(|v| if v { 1.0 } else { 0.0 })
            .collect()),
        other => bail!("expected a numeric array, found {:?}", other),
    }
}

fn read_bool_vec(ds: &hdf5::Dataset) -> Result<Vec<bool>> {
    match descriptor(ds)? {
        TypeDescriptor::Boolean | TypeDescriptor::Enum(_) => Ok(ds.read_raw::<bool>()?),
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
            Ok(read_int_vec(ds)?.into_iter().map(|v| v != 0).collect())
        }
        other => bail!("expected a boolean array, found {:?}", other),
    }
}

/// Reads at the stored width so out-of-range values surface here instead of
/// being clamped by an HDF5 conversion.
fn read_int_vec(ds: &hdf5::Dataset) -> Result<Vec<i64>> {
    let values = match descriptor(ds)? {
        TypeDescriptor::Integer(IntSize::U1) => widen(ds.read_raw::<i8>()?),
        TypeDescriptor::Integer(IntSize::U2) => widen(ds.read_raw::<i16>()?),
        TypeDescriptor::Integer(IntSize::U4) => widen(ds.read_raw::<i32>()?),
        TypeDescriptor::Integer(IntSize::U8) => ds.read_raw::<i64>()?,
        TypeDescriptor::Unsigned(IntSize::U1) => widen(ds.read_raw::<u8>()?),
        TypeDescriptor::Unsigned(IntSize::U2) => widen(ds.read_raw::<u16>()?),
        TypeDescriptor::Unsigned(IntSize::U4) => widen(ds.read_raw::<u32>()?),
        TypeDescriptor::Unsigned(IntSize::U8) => ds
            .read_raw::<u64>()?
            .into_iter()
            .map(|v| i64::try_from(v).map_err(|_| anyhow!("integer {} exceeds i64", v)))
            .collect::<Result<Vec<i64>>>()?,
        other => bail!("expected an integer array, found {:?}", other),
    };
    Ok(values)
}

fn widen<T: Into<i64>>(values: Vec<T>) -> Vec<i64> {
    values.into_iter().map(Into::into).collect()
}

fn read_i32_vec(ds: &hdf5::Dataset) -> Result<Vec<i32>> {
    read_int_vec(ds)?
        .into_iter()
        .map(|v| i32::try_from(v).map_err(|_| anyhow!("categorical code {} out of range", v)))
        .collect()
}

fn read_u32_vec(ds: &hdf5::Dataset) -> Result<Vec<u32>> {
    if let TypeDescriptor::Unsigned(IntSize::U4) = descriptor(ds)? {
        return Ok(ds.read_raw::<u32>()?);
    }
    read_int_vec(ds)?
        .into_iter()
        .map(|v| u32::try_from(v).map_err(|_| anyhow!("index {} out of range", v)))
        .collect()
}

fn read_u64_vec(ds: &hdf5::Dataset) -> Result<Vec<u64>> {
    if let TypeDescriptor::Unsigned(IntSize::U8) = descriptor(ds)? {
        return Ok(ds.read_raw::<u64>()?);
    }
    read_int_vec(ds)?
        .into_iter()
        .map(|v| u64::try_from(v).map_err(|_| anyhow!("indptr contains negative value {}", v)))
        .collect()
}
