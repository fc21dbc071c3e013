use std::path::PathBuf;

use anyhow::Context;

use crate::config::ExportConfig;
use crate::dataset::{Dataset, DatasetKeys};
use crate::math::AggregationResult;
use crate::sample::SampleRecord;

#[derive(Debug)]
pub struct Ctx {
    pub config: ExportConfig,
    pub keys: Option<DatasetKeys>,
    pub dataset: Option<Dataset>,
    pub samples: Option<Vec<SampleRecord>>,
    pub aggregation: Option<AggregationResult>,
    pub written: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl Ctx {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            keys: None,
            dataset: None,
            samples: None,
            aggregation: None,
            written: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn dataset(&self) -> anyhow::Result<&Dataset> {
        self.dataset.as_ref().context("dataset not loaded")
    }
}
