use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::Ctx;

pub mod stage0_scaffold;
pub mod stage1_load;
pub mod stage2_sample;
pub mod stage3_aggregate;
pub mod stage4_output;

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<()>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Load, sample, aggregate and write both documents.
    pub fn export() -> Self {
        Self::new(vec![
            Box::new(stage0_scaffold::Stage0Scaffold::new()),
            Box::new(stage1_load::Stage1Load::new()),
            Box::new(stage2_sample::Stage2Sample::new()),
            Box::new(stage3_aggregate::Stage3Aggregate::new()),
            Box::new(stage4_output::Stage4Output::new()),
        ])
    }

    pub fn run(&self, ctx: &mut Ctx) -> Result<()> {
        for stage in &self.stages {
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
        }
        Ok(())
    }
}
