use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::io::json_writer;
use crate::pipeline::Stage;

pub struct Stage4Output;

impl Stage4Output {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Stage4Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Stage4Output {
    fn name(&self) -> &'static str {
        "stage4_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let samples = ctx.samples.as_ref().context("samples missing")?;
        let aggregation = ctx.aggregation.as_ref().context("aggregation missing")?;
        let pretty = ctx.config.pretty;

        // Each artifact is written independently; one failure does not block the other.
        let mut failures = Vec::new();
        let mut written = Vec::new();
        let umap = json_writer::write_umap(&ctx.config.umap_out, samples, pretty);
        let means = json_writer::write_means(&ctx.config.means_out, aggregation, pretty);
        for (path, outcome) in [(&ctx.config.umap_out, umap), (&ctx.config.means_out, means)] {
            match outcome {
                Ok(()) => written.push(path.clone()),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "output_failed");
                    failures.push(err.to_string());
                }
            }
        }
        ctx.written.extend(written);

        if !failures.is_empty() {
            bail!("failed to write outputs:\n- {}", failures.join("\n- "));
        }
        info!("stage4_output_ready");
        Ok(())
    }
}
