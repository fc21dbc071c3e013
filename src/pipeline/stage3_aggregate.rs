use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::error::AtlasError;
use crate::math::{AggregationResult, TracingProgress, aggregate};
use crate::pipeline::Stage;

pub struct Stage3Aggregate;

impl Stage3Aggregate {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Stage3Aggregate {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Stage3Aggregate {
    fn name(&self) -> &'static str {
        "stage3_aggregate"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let dataset = ctx.dataset()?;
        let options = ctx.config.aggregate_options();
        let mut progress = TracingProgress::new();
        let outcome = aggregate(
            dataset,
            &ctx.config.cell_type_key,
            &ctx.config.gene_name_key,
            &options,
            &mut progress,
        );

        let result = match outcome {
            Ok(result) => result,
            Err(AtlasError::EmptyDataset { cells, genes }) => {
                warn!(cells, genes, "empty dataset; writing empty means document");
                ctx.warnings.push(format!(
                    "dataset is empty ({} cells, {} genes); means document is empty",
                    cells, genes
                ));
                AggregationResult::empty()
            }
            Err(err) => return Err(err.into()),
        };

        if result.collisions() > 0 {
            ctx.warnings.push(format!(
                "{} gene name(s) collided after uppercasing; policy {:?}",
                result.collisions(),
                ctx.config.collision
            ));
        }
        info!(
            genes = result.len(),
            categories = result.categories().len(),
            collisions = result.collisions(),
            "aggregation_ready"
        );
        ctx.aggregation = Some(result);
        Ok(())
    }
}
