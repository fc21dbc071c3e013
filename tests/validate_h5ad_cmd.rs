#![cfg(feature = "hdf5")]

use std::path::Path;

use assert_cmd::Command;
use hdf5::File;
use hdf5::types::VarLenUnicode;
use tempfile::TempDir;

fn vlen(items: &[&str]) -> Vec<VarLenUnicode> {
    items.iter().map(|s| s.parse().unwrap()).collect()
}

/// Dense X, 2 cells x 1 gene, string cell types.
fn write_h5ad(path: &Path) {
    let file = File::create(path).unwrap();
    file.new_dataset::<f32>()
        .shape((2, 1))
        .create("X")
        .unwrap()
        .write_raw(&[2.0f32, 4.0])
        .unwrap();

    let obs = file.create_group("obs").unwrap();
    obs.new_dataset::<VarLenUnicode>()
        .shape(2)
        .create("cell_type")
        .unwrap()
        .write_raw(&vlen(&["T", "T"]))
        .unwrap();

    let var = file.create_group("var").unwrap();
    var.new_dataset::<VarLenUnicode>()
        .shape(1)
        .create("feature_name")
        .unwrap()
        .write_raw(&vlen(&["cd3e"]))
        .unwrap();

    let obsm = file.create_group("obsm").unwrap();
    obsm.new_dataset::<f64>()
        .shape((2, 2))
        .create("X_umap")
        .unwrap()
        .write_raw(&[0.0f64, 1.0, 2.0, 3.0])
        .unwrap();
}

#[test]
fn validate_reports_shape_and_keys() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tiny.h5ad");
    write_h5ad(&path);

    let mut cmd = Command::cargo_bin("kira-cellxgene").unwrap();
    let out = cmd.arg("validate").arg("--input").arg(&path).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("kira-cellxgene validate ok"));
    assert!(stdout.contains("cells: 2"));
    assert!(stdout.contains("genes: 1"));
}

#[test]
fn validate_fails_on_missing_embedding() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tiny.h5ad");
    write_h5ad(&path);

    let mut cmd = Command::cargo_bin("kira-cellxgene").unwrap();
    let out = cmd
        .arg("validate")
        .arg("--input")
        .arg(&path)
        .arg("--embedding-key")
        .arg("X_tsne")
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("X_tsne"));
    assert!(stderr.contains("X_umap"));
}

#[test]
fn keys_lists_columns() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tiny.h5ad");
    write_h5ad(&path);

    let mut cmd = Command::cargo_bin("kira-cellxgene").unwrap();
    let out = cmd.arg("keys").arg("--input").arg(&path).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("\tcell_type"));
    assert!(stdout.contains("\tfeature_name"));
    assert!(stdout.contains("\tX_umap"));
}

#[test]
fn run_writes_both_documents() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tiny.h5ad");
    write_h5ad(&path);
    let umap = tmp.path().join("out").join("umap.json");
    let means = tmp.path().join("out").join("means.json");

    let mut cmd = Command::cargo_bin("kira-cellxgene").unwrap();
    cmd.arg("run")
        .arg("--input")
        .arg(&path)
        .arg("--umap-out")
        .arg(&umap)
        .arg("--means-out")
        .arg(&means)
        .arg("--threads")
        .arg("1");
    cmd.assert().success();

    assert_eq!(
        std::fs::read_to_string(&means).unwrap(),
        r#"{"CD3E":{"T":3.0}}"#
    );
    let records: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&umap).unwrap()).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 2);
}
