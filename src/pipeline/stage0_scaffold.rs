use anyhow::{Context, Result};
use std::fs;
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage0Scaffold;

impl Stage0Scaffold {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Stage0Scaffold {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Stage0Scaffold {
    fn name(&self) -> &'static str {
        "stage0_scaffold"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.config.validate()?;
        for path in [&ctx.config.umap_out, &ctx.config.means_out] {
            if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
                info!(out_dir = %dir.display(), "output_dir_ready");
            }
        }
        Ok(())
    }
}
