#[cfg(feature = "mt")]
mod mt_tests {
    use kira_cellxgene::dataset::{Column, Dataset, EmbeddingSet, Table};
    use kira_cellxgene::expr::CscMatrix;
    use kira_cellxgene::math::{AggregateOptions, CollisionPolicy, NoProgress, aggregate};

    /// 300 cells x 200 genes with a deterministic sparsity pattern and a few
    /// case-colliding gene names.
    fn synthetic() -> Dataset {
        let n_cells = 300usize;
        let n_genes = 200usize;
        let mut col_ptr = vec![0u64];
        let mut rows = Vec::new();
        let mut values = Vec::new();
        for g in 0..n_genes {
            for c in 0..n_cells {
                if (c * 7 + g * 13) % 11 == 0 {
                    rows.push(c as u32);
                    values.push(((c + g) % 17) as f64 * 0.5 + 0.25);
                }
            }
            col_ptr.push(rows.len() as u64);
        }
        let matrix = CscMatrix::new(n_cells, n_genes, col_ptr, rows, values).unwrap();

        let labels = ["T", "B", "NK", "Mono", "DC"];
        let mut obs = Table::new(Vec::new());
        obs.insert(
            "cell_type",
            Column::Strings((0..n_cells).map(|c| labels[c % 5].to_string()).collect()),
        );
        let mut var = Table::new(Vec::new());
        var.insert(
            "feature_name",
            Column::Strings(
                (0..n_genes)
                    .map(|g| {
                        if g % 50 == 49 {
                            format!("gene{}", g - 1)
                        } else {
                            format!("Gene{}", g)
                        }
                    })
                    .collect(),
            ),
        );
        Dataset::new(matrix, obs, var, EmbeddingSet::default()).unwrap()
    }

    #[test]
    fn mt_equivalence_scalar() {
        let ds = synthetic();
        for policy in [
            CollisionPolicy::LastWins,
            CollisionPolicy::FirstWins,
            CollisionPolicy::Mean,
        ] {
            let scalar = aggregate(
                &ds,
                "cell_type",
                "feature_name",
                &AggregateOptions {
                    threads: 1,
                    collision: policy,
                    progress_every: 37,
                    ..AggregateOptions::default()
                },
                &mut NoProgress,
            )
            .unwrap();
            let parallel = aggregate(
                &ds,
                "cell_type",
                "feature_name",
                &AggregateOptions {
                    threads: 4,
                    collision: policy,
                    progress_every: 37,
                    ..AggregateOptions::default()
                },
                &mut NoProgress,
            )
            .unwrap();
            assert_eq!(scalar.collisions(), 4);
            assert_eq!(
                serde_json::to_vec(&scalar).unwrap(),
                serde_json::to_vec(&parallel).unwrap()
            );
        }
    }
}
