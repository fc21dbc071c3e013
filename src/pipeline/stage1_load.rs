use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::dataset::validate_keys;
use crate::io::h5ad;
use crate::pipeline::Stage;

pub struct Stage1Load;

impl Stage1Load {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Stage1Load {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Stage1Load {
    fn name(&self) -> &'static str {
        "stage1_load"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        // A dataset handed in by the caller skips the reader but not the key check.
        if let Some(dataset) = &ctx.dataset {
            let keys = dataset.keys();
            validate_keys(&keys, &ctx.config.required_keys())?;
            ctx.keys = Some(keys);
            return Ok(());
        }

        let keys = h5ad::read_keys(&ctx.config.input)?;
        info!(
            input = %ctx.config.input.display(),
            cells = keys.n_cells,
            genes = keys.n_genes,
            nnz = keys.nnz,
            "h5ad_keys"
        );
        validate_keys(&keys, &ctx.config.required_keys())?;

        let dataset = h5ad::load_dataset(&ctx.config.input, &ctx.config.required_keys())?;
        info!(
            cells = dataset.cell_count(),
            genes = dataset.gene_count(),
            nnz = dataset.nnz(),
            "dataset_loaded"
        );
        ctx.keys = Some(keys);
        ctx.dataset = Some(dataset);
        Ok(())
    }
}
