use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "kira-cellxgene",
    version,
    about = "Cell-type mean expression and UMAP exports from H5AD"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write the sampled UMAP document and the gene x cell-type means document
    Run(RunArgs),
    /// Check that the required keys exist without loading the matrix
    Validate(ValidateArgs),
    /// List obs columns, var columns and obsm keys
    Keys(KeysArgs),
}

#[derive(Debug, Clone, Args)]
pub struct KeyArgs {
    #[arg(long, default_value = "cell_type", help = "obs column holding cell-type labels")]
    pub cell_type_key: String,

    #[arg(long, default_value = "feature_name", help = "var column holding gene symbols")]
    pub gene_name_key: String,

    #[arg(long, default_value = "X_umap", help = "obsm key of the 2-D layout")]
    pub embedding_key: String,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Input .h5ad file")]
    pub input: PathBuf,

    #[arg(long, default_value = "umap_data.json")]
    pub umap_out: PathBuf,

    #[arg(long, default_value = "cellxgene_data.json")]
    pub means_out: PathBuf,

    #[command(flatten)]
    pub keys: KeyArgs,

    #[arg(long, default_value_t = 20000, help = "Maximum number of cells in the UMAP document")]
    pub sample_size: usize,

    #[arg(long, default_value_t = 0, help = "Seed for cell subsampling")]
    pub seed: u64,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,

    #[arg(long, value_enum, default_value_t = CollisionArg::LastWins)]
    pub collision: CollisionArg,

    #[arg(long, value_enum, default_value_t = StrategyArg::Sparse, help = "Per-gene reduction")]
    pub strategy: StrategyArg,

    #[arg(long, default_value_t = 1000, help = "Log progress every N genes")]
    pub progress_every: usize,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Input .h5ad file")]
    pub input: PathBuf,

    #[command(flatten)]
    pub keys: KeyArgs,
}

#[derive(Debug, Args)]
pub struct KeysArgs {
    #[arg(long, help = "Input .h5ad file")]
    pub input: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollisionArg {
    LastWins,
    FirstWins,
    Mean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Accumulate stored entries, divide by category size
    Sparse,
    /// Expand each gene to a dense column first
    Dense,
}
