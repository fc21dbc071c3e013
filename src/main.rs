use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kira_cellxgene::cli::{Cli, Commands};
use kira_cellxgene::config::ExportConfig;
use kira_cellxgene::ctx::Ctx;
use kira_cellxgene::dataset::{DatasetKeys, validate_keys};
use kira_cellxgene::io;
use kira_cellxgene::pipeline::Pipeline;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = ExportConfig::from_run_args(&args)?;
            let mut ctx = Ctx::new(config);
            Pipeline::export().run(&mut ctx)?;
            print_summary(&ctx)?;
        }
        Commands::Validate(args) => {
            let config = ExportConfig::from_key_args(args.input, &args.keys)?;
            let keys = io::h5ad::read_keys(&config.input)?;
            validate_keys(&keys, &config.required_keys())?;
            print_validate_summary(&config, &keys);
        }
        Commands::Keys(args) => {
            let keys = io::h5ad::read_keys(&args.input)?;
            print_keys(&keys);
        }
    }

    Ok(())
}

fn print_summary(ctx: &Ctx) -> Result<()> {
    let summary = io::summary::format_summary(ctx)?;
    print!("{}", summary);
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
    Ok(())
}

fn print_validate_summary(config: &ExportConfig, keys: &DatasetKeys) {
    println!("kira-cellxgene validate ok");
    println!("cells: {}", keys.n_cells);
    println!("genes: {}", keys.n_genes);
    println!("nnz: {}", keys.nnz);
    println!("cell type key: {}", config.cell_type_key);
    println!("gene name key: {}", config.gene_name_key);
    println!("embedding key: {}", config.embedding_key);
}

fn print_keys(keys: &DatasetKeys) {
    println!("cells: {}", keys.n_cells);
    println!("genes: {}", keys.n_genes);
    println!("obs columns:");
    for name in &keys.obs_columns {
        println!("\t{}", name);
    }
    println!("var columns:");
    for name in &keys.var_columns {
        println!("\t{}", name);
    }
    println!("obsm keys:");
    for name in &keys.obsm_keys {
        println!("\t{}", name);
    }
}
