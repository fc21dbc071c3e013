use std::path::PathBuf;

use crate::cli::{CollisionArg, KeyArgs, RunArgs, StrategyArg};
use crate::dataset::RequiredKeys;
use crate::error::{AtlasError, Result};
use crate::math::{AggregateOptions, CollisionPolicy, ReduceStrategy};

/// Everything one run needs, fixed at startup.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub input: PathBuf,
    pub umap_out: PathBuf,
    pub means_out: PathBuf,
    pub cell_type_key: String,
    pub gene_name_key: String,
    pub embedding_key: String,
    pub sample_size: usize,
    pub seed: u64,
    pub threads: usize,
    pub collision: CollisionPolicy,
    pub strategy: ReduceStrategy,
    pub progress_every: usize,
    pub pretty: bool,
}

impl ExportConfig {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            umap_out: PathBuf::from("umap_data.json"),
            means_out: PathBuf::from("cellxgene_data.json"),
            cell_type_key: "cell_type".to_string(),
            gene_name_key: "feature_name".to_string(),
            embedding_key: "X_umap".to_string(),
            sample_size: 20000,
            seed: 0,
            threads: 0,
            collision: CollisionPolicy::LastWins,
            strategy: ReduceStrategy::Sparse,
            progress_every: 1000,
            pretty: false,
        }
    }

    pub fn from_run_args(args: &RunArgs) -> Result<Self> {
        let config = Self {
            input: args.input.clone(),
            umap_out: args.umap_out.clone(),
            means_out: args.means_out.clone(),
            cell_type_key: args.keys.cell_type_key.clone(),
            gene_name_key: args.keys.gene_name_key.clone(),
            embedding_key: args.keys.embedding_key.clone(),
            sample_size: args.sample_size,
            seed: args.seed,
            threads: args.threads,
            collision: match args.collision {
                CollisionArg::LastWins => CollisionPolicy::LastWins,
                CollisionArg::FirstWins => CollisionPolicy::FirstWins,
                CollisionArg::Mean => CollisionPolicy::Mean,
            },
            strategy: match args.strategy {
                StrategyArg::Sparse => ReduceStrategy::Sparse,
                StrategyArg::Dense => ReduceStrategy::Dense,
            },
            progress_every: args.progress_every,
            pretty: args.pretty,
        };
        config.validate()?;
        Ok(config)
    }

    /// Config for commands that only inspect keys.
    pub fn from_key_args(input: PathBuf, keys: &KeyArgs) -> Result<Self> {
        let mut config = Self::new(input);
        config.cell_type_key = keys.cell_type_key.clone();
        config.gene_name_key = keys.gene_name_key.clone();
        config.embedding_key = keys.embedding_key.clone();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("cell type key", &self.cell_type_key),
            ("gene name key", &self.gene_name_key),
            ("embedding key", &self.embedding_key),
        ] {
            if value.trim().is_empty() {
                return Err(AtlasError::InvalidConfig(format!("{} must not be empty", name)));
            }
        }
        if self.umap_out == self.means_out {
            return Err(AtlasError::InvalidConfig(format!(
                "UMAP and means outputs must differ (both {})",
                self.umap_out.display()
            )));
        }
        if self.progress_every == 0 {
            return Err(AtlasError::InvalidConfig(
                "progress_every must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn required_keys(&self) -> RequiredKeys<'_> {
        RequiredKeys {
            cell_type: &self.cell_type_key,
            gene_name: &self.gene_name_key,
            embedding: &self.embedding_key,
        }
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            threads: self.threads,
            strategy: self.strategy,
            collision: self.collision,
            progress_every: self.progress_every,
        }
    }
}
