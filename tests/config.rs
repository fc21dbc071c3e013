use std::path::PathBuf;

use kira_cellxgene::config::ExportConfig;
use kira_cellxgene::error::AtlasError;
use kira_cellxgene::math::{CollisionPolicy, ReduceStrategy};

fn base() -> ExportConfig {
    ExportConfig::new(PathBuf::from("atlas.h5ad"))
}

#[test]
fn defaults_are_valid() {
    let config = base();
    config.validate().unwrap();
    let keys = config.required_keys();
    assert_eq!(keys.cell_type, "cell_type");
    assert_eq!(keys.gene_name, "feature_name");
    assert_eq!(keys.embedding, "X_umap");
}

#[test]
fn empty_key_is_rejected() {
    let mut config = base();
    config.gene_name_key = "  ".to_string();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, AtlasError::InvalidConfig(_)));
    assert!(err.to_string().contains("gene name key"));
}

#[test]
fn identical_outputs_are_rejected() {
    let mut config = base();
    config.means_out = config.umap_out.clone();
    assert!(matches!(
        config.validate(),
        Err(AtlasError::InvalidConfig(_))
    ));
}

#[test]
fn zero_progress_interval_is_rejected() {
    let mut config = base();
    config.progress_every = 0;
    assert!(matches!(
        config.validate(),
        Err(AtlasError::InvalidConfig(_))
    ));
}

#[test]
fn aggregate_options_follow_config() {
    let mut config = base();
    config.threads = 3;
    config.collision = CollisionPolicy::FirstWins;
    config.progress_every = 10;
    let options = config.aggregate_options();
    assert_eq!(options.threads, 3);
    assert_eq!(options.collision, CollisionPolicy::FirstWins);
    assert_eq!(options.strategy, ReduceStrategy::Sparse);
    assert_eq!(options.progress_every, 10);
}
