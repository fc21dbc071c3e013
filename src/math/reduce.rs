use tracing::{info, warn};

use crate::dataset::Dataset;
use crate::error::{AtlasError, KeyKind, Result};
use crate::expr::SparseColumns;
use crate::math::partition::CategoryIndex;
use crate::math::progress::ProgressObserver;
#[cfg(feature = "mt")]
use crate::math::reduce_mt;
use crate::math::result::{AggregationResult, CollisionPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReduceStrategy {
    /// Accumulates non-zeros per category, then divides by the category size.
    #[default]
    Sparse,
    /// Materialises each gene as a dense vector and gathers per category.
    Dense,
}

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// 1 runs on the calling thread; 0 lets the pool pick.
    pub threads: usize,
    pub strategy: ReduceStrategy,
    pub collision: CollisionPolicy,
    pub progress_every: usize,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            strategy: ReduceStrategy::Sparse,
            collision: CollisionPolicy::LastWins,
            progress_every: 1000,
        }
    }
}

/// Per-gene category means over one matrix and one partition.
pub struct GeneMeanReducer<'a, M: SparseColumns> {
    pub matrix: &'a M,
    pub index: &'a CategoryIndex,
    pub strategy: ReduceStrategy,
    counts: Vec<f64>,
}

impl<'a, M: SparseColumns> GeneMeanReducer<'a, M> {
    pub fn new(matrix: &'a M, index: &'a CategoryIndex, strategy: ReduceStrategy) -> Result<Self> {
        if index.cell_count() != matrix.n_rows() {
            return Err(AtlasError::InvalidDataset(format!(
                "partition covers {} cells but matrix has {}",
                index.cell_count(),
                matrix.n_rows()
            )));
        }
        let counts = index.counts().into_iter().map(|c| c as f64).collect();
        Ok(Self {
            matrix,
            index,
            strategy,
            counts,
        })
    }

    /// Scratch buffer sized for [`Self::gene_means`].
    pub fn scratch(&self) -> Vec<f64> {
        match self.strategy {
            ReduceStrategy::Sparse => vec![0.0; self.index.len()],
            ReduceStrategy::Dense => vec![0.0; self.matrix.n_rows()],
        }
    }

    pub fn gene_means(&self, gene: usize, scratch: &mut [f64]) -> Result<Vec<f64>> {
        let column = self.matrix.column(gene)?;
        let mut means = vec![0.0f64; self.index.len()];
        match self.strategy {
            ReduceStrategy::Sparse => {
                let sums = scratch;
                sums.fill(0.0);
                for (cell, value) in column.iter() {
                    sums[self.index.category_of(cell)] += value;
                }
                for (c, mean) in means.iter_mut().enumerate() {
                    *mean = sums[c] / self.counts[c];
                }
            }
            ReduceStrategy::Dense => {
                let dense = scratch;
                column.densify_into(dense);
                for (c, mean) in means.iter_mut().enumerate() {
                    let sum: f64 = self
                        .index
                        .members(c)
                        .iter()
                        .map(|&cell| dense[cell as usize])
                        .sum();
                    *mean = sum / self.counts[c];
                }
            }
        }
        Ok(means)
    }

    pub fn block_means(&self, genes: std::ops::Range<usize>) -> Result<Vec<Vec<f64>>> {
        let mut scratch = self.scratch();
        genes.map(|g| self.gene_means(g, &mut scratch)).collect()
    }
}

/// Mean expression of every gene within every category of `label_key`.
pub fn aggregate(
    dataset: &Dataset,
    label_key: &str,
    gene_name_key: &str,
    options: &AggregateOptions,
    observer: &mut dyn ProgressObserver,
) -> Result<AggregationResult> {
    let labels = dataset
        .cell_metadata
        .column(label_key, KeyKind::CellMetadata)?;
    let gene_names = dataset
        .gene_metadata
        .column(gene_name_key, KeyKind::GeneMetadata)?;

    let n_cells = dataset.cell_count();
    let n_genes = dataset.gene_count();
    if n_cells == 0 || n_genes == 0 {
        return Err(AtlasError::EmptyDataset {
            cells: n_cells,
            genes: n_genes,
        });
    }
    if options.progress_every == 0 {
        return Err(AtlasError::InvalidConfig(
            "progress_every must be greater than 0".to_string(),
        ));
    }

    let index = CategoryIndex::from_column(labels);
    info!(
        cells = n_cells,
        genes = n_genes,
        categories = index.len(),
        "partition_ready"
    );

    let reducer = GeneMeanReducer::new(&dataset.expression, &index, options.strategy)?;
    let mut result = AggregationResult::new(index.labels().to_vec());

    #[cfg(feature = "mt")]
    let pool = if options.threads != 1 {
        Some(reduce_mt::build_pool(options.threads)?)
    } else {
        None
    };

    let mut done = 0usize;
    while done < n_genes {
        let end = (done + options.progress_every).min(n_genes);

        #[cfg(feature = "mt")]
        let block = match &pool {
            Some(pool) => reduce_mt::block_means_mt(pool, &reducer, done..end)?,
            None => reducer.block_means(done..end)?,
        };
        #[cfg(not(feature = "mt"))]
        let block = reducer.block_means(done..end)?;

        for (gene, means) in (done..end).zip(block) {
            let name = gene_names.label_at(gene).to_uppercase();
            if result.insert(name, means, options.collision) {
                warn!(
                    gene = %gene_names.label_at(gene),
                    column = gene,
                    policy = ?options.collision,
                    "gene_name_collision"
                );
            }
        }
        done = end;
        observer.on_progress(done, n_genes);
    }

    Ok(result)
}
