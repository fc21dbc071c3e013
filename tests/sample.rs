use std::collections::HashSet;

use kira_cellxgene::dataset::{Column, Dataset, Embedding, EmbeddingSet, Table};
use kira_cellxgene::error::{AtlasError, KeyKind};
use kira_cellxgene::expr::CscMatrix;
use kira_cellxgene::sample::{SampleRecord, sample, select_cells};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn dataset(n_cells: usize, dims: usize) -> Dataset {
    let labels = ["A", "A", "B", "B"];
    let mut obs = Table::new(Vec::new());
    obs.insert(
        "cell_type",
        Column::Strings((0..n_cells).map(|c| labels[c % 4].to_string()).collect()),
    );
    let mut obsm = EmbeddingSet::new(vec!["X_pca".to_string()]);
    let coords = (0..n_cells)
        .flat_map(|c| (0..dims).map(move |d| c as f64 + d as f64 / 10.0))
        .collect();
    obsm.insert("X_umap", Embedding::new(n_cells, dims, coords).unwrap());
    Dataset::new(CscMatrix::empty(n_cells, 0), obs, Table::default(), obsm).unwrap()
}

fn truth(row: usize) -> SampleRecord {
    let labels = ["A", "A", "B", "B"];
    SampleRecord {
        x: row as f64,
        y: row as f64 + 0.1,
        cell_type: labels[row % 4].to_string(),
    }
}

#[test]
fn sample_size_at_least_cell_count_keeps_all_cells() {
    let ds = dataset(4, 2);
    let mut rng = StdRng::seed_from_u64(0);
    for size in [4, 5, 20000] {
        let records = sample(&ds, "X_umap", "cell_type", size, &mut rng).unwrap();
        let expected: Vec<SampleRecord> = (0..4).map(truth).collect();
        assert_eq!(records, expected);
    }
}

#[test]
fn subsample_returns_distinct_true_records() {
    let ds = dataset(4, 2);
    let mut rng = StdRng::seed_from_u64(7);
    let records = sample(&ds, "X_umap", "cell_type", 2, &mut rng).unwrap();
    assert_eq!(records.len(), 2);
    let truths: Vec<SampleRecord> = (0..4).map(truth).collect();
    for r in &records {
        assert!(truths.contains(r), "fabricated record {:?}", r);
    }
    assert_ne!(records[0], records[1]);
}

#[test]
fn select_cells_without_replacement() {
    let mut rng = StdRng::seed_from_u64(42);
    let rows = select_cells(&mut rng, 1000, 250);
    assert_eq!(rows.len(), 250);
    let unique: HashSet<usize> = rows.iter().copied().collect();
    assert_eq!(unique.len(), 250);
    assert!(rows.iter().all(|&r| r < 1000));
}

#[test]
fn same_seed_same_sample() {
    let ds = dataset(100, 3);
    let a = sample(&ds, "X_umap", "cell_type", 10, &mut StdRng::seed_from_u64(0)).unwrap();
    let b = sample(&ds, "X_umap", "cell_type", 10, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(a, b);
    for r in &a {
        let row = r.x as usize;
        assert_eq!(r.y, row as f64 + 0.1);
    }
}

#[test]
fn empty_dataset_yields_no_records() {
    let ds = dataset(0, 2);
    let records = sample(&ds, "X_umap", "cell_type", 10, &mut StdRng::seed_from_u64(0)).unwrap();
    assert!(records.is_empty());
}

#[test]
fn missing_embedding_key_lists_alternatives() {
    let ds = dataset(4, 2);
    let err = sample(&ds, "X_tsne", "cell_type", 2, &mut StdRng::seed_from_u64(0)).unwrap_err();
    match err {
        AtlasError::MissingKey {
            kind, available, ..
        } => {
            assert_eq!(kind, KeyKind::Embedding);
            assert_eq!(available, vec!["X_pca".to_string(), "X_umap".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_label_key_is_reported() {
    let ds = dataset(4, 2);
    let err = sample(&ds, "X_umap", "leiden", 2, &mut StdRng::seed_from_u64(0)).unwrap_err();
    assert!(matches!(
        err,
        AtlasError::MissingKey {
            kind: KeyKind::CellMetadata,
            ..
        }
    ));
}

#[test]
fn one_dimensional_embedding_is_rejected() {
    let ds = dataset(4, 1);
    let err = sample(&ds, "X_umap", "cell_type", 2, &mut StdRng::seed_from_u64(0)).unwrap_err();
    assert!(matches!(err, AtlasError::InvalidDataset(_)));
}

#[test]
fn records_serialize_with_expected_keys() {
    let json = serde_json::to_value(truth(2)).unwrap();
    assert_eq!(json["x"], 2.0);
    assert_eq!(json["y"], 2.1);
    assert_eq!(json["cell_type"], "B");
}
