use std::ops::Range;

use rayon::ThreadPool;
use rayon::prelude::*;

use crate::error::{AtlasError, Result};
use crate::expr::SparseColumns;
use crate::math::reduce::GeneMeanReducer;

const GENE_SHARD: usize = 64;

/// `threads == 0` lets rayon size the pool from the available cores.
pub fn build_pool(threads: usize) -> Result<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| AtlasError::InvalidConfig(format!("failed to build thread pool: {}", e)))
}

/// Same output as [`GeneMeanReducer::block_means`]; shards are rejoined in gene order.
pub fn block_means_mt<M: SparseColumns>(
    pool: &ThreadPool,
    reducer: &GeneMeanReducer<'_, M>,
    genes: Range<usize>,
) -> Result<Vec<Vec<f64>>> {
    let start = genes.start;
    let len = genes.len();
    let shard_count = len.div_ceil(GENE_SHARD);

    let shards: Vec<Result<Vec<Vec<f64>>>> = pool.install(|| {
        (0..shard_count)
            .into_par_iter()
            .map(|shard_id| {
                let shard_start = start + shard_id * GENE_SHARD;
                let shard_end = (shard_start + GENE_SHARD).min(genes.end);
                reducer.block_means(shard_start..shard_end)
            })
            .collect()
    });

    let mut out = Vec::with_capacity(len);
    for shard in shards {
        out.extend(shard?);
    }
    Ok(out)
}
