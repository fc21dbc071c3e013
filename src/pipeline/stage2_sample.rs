use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::sample;

pub struct Stage2Sample;

impl Stage2Sample {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Stage2Sample {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Stage2Sample {
    fn name(&self) -> &'static str {
        "stage2_sample"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let dataset = ctx.dataset()?;
        let mut rng = StdRng::seed_from_u64(ctx.config.seed);
        let records = sample::sample(
            dataset,
            &ctx.config.embedding_key,
            &ctx.config.cell_type_key,
            ctx.config.sample_size,
            &mut rng,
        )?;
        info!(
            sampled = records.len(),
            cells = dataset.cell_count(),
            seed = ctx.config.seed,
            "cells_sampled"
        );
        if records.is_empty() {
            ctx.warnings
                .push("dataset has no cells; UMAP document is empty".to_string());
        }
        ctx.samples = Some(records);
        Ok(())
    }
}
