use std::time::Instant;

use tracing::info;

/// Receives aggregation progress; called from the driving thread only.
pub trait ProgressObserver {
    fn on_progress(&mut self, genes_done: usize, genes_total: usize);
}

pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _genes_done: usize, _genes_total: usize) {}
}

pub struct TracingProgress {
    start: Instant,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for TracingProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for TracingProgress {
    fn on_progress(&mut self, genes_done: usize, genes_total: usize) {
        info!(
            genes_done,
            genes_total,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            "aggregation_progress"
        );
    }
}
