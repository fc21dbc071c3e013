use kira_cellxgene::error::AtlasError;
use kira_cellxgene::expr::{CscMatrix, SparseColumns};

fn column_pairs(m: &CscMatrix, g: usize) -> Vec<(usize, f64)> {
    m.column(g).unwrap().iter().collect()
}

#[test]
fn csr_is_transposed_to_gene_major() {
    // 3 cells x 4 genes
    // cell0: g1=1, g3=2
    // cell1: g0=3
    // cell2: g1=4, g2=5
    let indptr = [0u64, 2, 3, 5];
    let indices = [1u32, 3, 0, 1, 2];
    let data = [1.0f64, 2.0, 3.0, 4.0, 5.0];
    let m = CscMatrix::from_csr(3, 4, &indptr, &indices, &data).unwrap();

    assert_eq!(m.n_rows(), 3);
    assert_eq!(m.n_cols(), 4);
    assert_eq!(m.nnz(), 5);
    assert_eq!(column_pairs(&m, 0), vec![(1, 3.0)]);
    assert_eq!(column_pairs(&m, 1), vec![(0, 1.0), (2, 4.0)]);
    assert_eq!(column_pairs(&m, 2), vec![(2, 5.0)]);
    assert_eq!(column_pairs(&m, 3), vec![(0, 2.0)]);
}

#[test]
fn dense_input_keeps_nonzeros() {
    let dense = [0.0f64, 1.5, 2.0, 0.0, 0.0, 3.0];
    let m = CscMatrix::from_dense(3, 2, &dense).unwrap();
    assert_eq!(m.nnz(), 3);
    assert_eq!(column_pairs(&m, 0), vec![(1, 2.0)]);
    assert_eq!(column_pairs(&m, 1), vec![(0, 1.5), (2, 3.0)]);
}

#[test]
fn unsorted_csc_columns_are_sorted() {
    let m = CscMatrix::from_csc(3, 1, vec![0, 3], vec![2, 0, 1], vec![3.0, 1.0, 2.0]).unwrap();
    assert_eq!(column_pairs(&m, 0), vec![(0, 1.0), (1, 2.0), (2, 3.0)]);
}

#[test]
fn densify_sums_repeated_entries() {
    let m = CscMatrix::new(3, 1, vec![0, 3], vec![0, 2, 2], vec![1.0, 2.0, 0.5]).unwrap();
    let mut dense = vec![9.0f64; 3];
    m.column(0).unwrap().densify_into(&mut dense);
    assert_eq!(dense, vec![1.0, 0.0, 2.5]);
}

#[test]
fn column_view_is_restartable() {
    let m = CscMatrix::new(4, 1, vec![0, 2], vec![1, 3], vec![1.0, 2.0]).unwrap();
    let view = m.column(0).unwrap();
    let first: Vec<_> = view.iter().collect();
    let second: Vec<_> = view.iter().collect();
    assert_eq!(first, second);
    assert_eq!(view.nnz(), 2);
}

#[test]
fn invalid_structures_are_rejected() {
    let bad_ptr = CscMatrix::new(2, 2, vec![0, 1], vec![0], vec![1.0]);
    assert!(matches!(bad_ptr, Err(AtlasError::InvalidDataset(_))));

    let out_of_range = CscMatrix::new(2, 1, vec![0, 1], vec![5], vec![1.0]);
    assert!(matches!(out_of_range, Err(AtlasError::InvalidDataset(_))));

    let unsorted = CscMatrix::new(3, 1, vec![0, 2], vec![2, 0], vec![1.0, 1.0]);
    assert!(matches!(unsorted, Err(AtlasError::InvalidDataset(_))));

    let nan = CscMatrix::new(2, 1, vec![0, 1], vec![0], vec![f64::NAN]);
    assert!(matches!(nan, Err(AtlasError::InvalidDataset(_))));

    let bad_gene = CscMatrix::from_csr(1, 2, &[0, 1], &[7], &[1.0]);
    assert!(matches!(bad_gene, Err(AtlasError::InvalidDataset(_))));

    let m = CscMatrix::empty(2, 1);
    assert!(m.column(1).is_err());
}
