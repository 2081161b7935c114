//! Integration tests for COO/CSC conversion and batched sparse tensors

mod common;

use common::{assert_allclose_f64, random_batch, random_mask, rng};
use rand::Rng;
use spsolve::error::Error;
use spsolve::sparse::{CooData, CscData, DuplicatePolicy, SparseStorage, SparseTensor};
use spsolve::tensor::Tensor;

#[test]
fn test_round_trip_with_empty_columns() {
    // [0 1 0 0]
    // [0 0 0 2]
    // [0 3 0 0]
    let dense = [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 3.0, 0.0, 0.0];
    let csc = CooData::from_dense(&dense, [3, 4]).unwrap().to_csc().unwrap();

    assert_eq!(csc.col_ptrs(), &[0, 0, 2, 2, 3]);
    assert_eq!(csc.row_indices(), &[0, 2, 1]);
    assert_eq!(csc.to_dense(), dense.to_vec());
}

#[test]
fn test_round_trip_random_unsorted() {
    let mut rng = rng(7);
    for _ in 0..20 {
        let (m, n) = (rng.gen_range(1..12), rng.gen_range(1..12));
        let mut dense = vec![0.0; m * n];
        let mut entries = Vec::new();
        for r in 0..m {
            for c in 0..n {
                if rng.gen_bool(0.3) {
                    let v = rng.gen_range(-5.0..5.0);
                    dense[r * n + c] = v;
                    entries.push((r as i64, c as i64, v));
                }
            }
        }
        // Scramble input order
        for i in (1..entries.len()).rev() {
            entries.swap(i, rng.gen_range(0..=i));
        }
        let rows: Vec<i64> = entries.iter().map(|e| e.0).collect();
        let cols: Vec<i64> = entries.iter().map(|e| e.1).collect();
        let vals: Vec<f64> = entries.iter().map(|e| e.2).collect();

        let csc = CooData::from_slices(&rows, &cols, &vals, [m, n])
            .unwrap()
            .to_csc()
            .unwrap();

        assert_eq!(csc.nnz(), entries.len());
        for j in 0..n {
            let (col_rows, _) = csc.column(j);
            assert!(col_rows.windows(2).all(|w| w[0] < w[1]), "column {j} not sorted");
        }
        assert_eq!(csc.to_dense(), dense);
    }
}

#[test]
fn test_duplicates_summed_or_rejected() {
    let coo = CooData::from_slices(
        &[1, 0, 1, 1],
        &[0, 1, 0, 0],
        &[1.0, 5.0, 2.0, 4.0],
        [2, 2],
    )
    .unwrap();

    let summed = coo.to_csc().unwrap();
    assert_eq!(summed.nnz(), 2);
    assert_eq!(summed.get(1, 0), 7.0);
    assert_eq!(summed.to_dense(), coo.to_dense());

    let err = coo.to_csc_with(DuplicatePolicy::Reject).unwrap_err();
    assert!(matches!(err, Error::DuplicateEntry { row: 1, col: 0 }));
    assert!(err.is_usage_error());
}

#[test]
fn test_empty_input() {
    let csc = CooData::from_slices(&[], &[], &[], [3, 3])
        .unwrap()
        .to_csc()
        .unwrap();

    assert_eq!(csc.col_ptrs(), &[0, 0, 0, 0]);
    assert!(csc.is_empty());
    assert_eq!(csc.to_dense(), vec![0.0; 9]);
}

#[test]
fn test_out_of_range_index() {
    let err = CooData::from_slices(&[0, 3], &[0, 0], &[1.0, 1.0], [3, 3]).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfBounds { index: 3, size: 3 }));

    let err = CooData::from_slices(&[0], &[-1], &[1.0], [3, 3]).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfBounds { index: -1, .. }));
}

#[test]
fn test_transpose_matches_dense_transpose() {
    let mut rng = rng(11);
    let mask = random_mask(&mut rng, 6, 0.4);
    let a = random_batch(&mut rng, 1, 6, &mask, 0.0);
    let csc = a.batch_elements().unwrap()[0].to_csc().unwrap();

    let dense = csc.to_dense();
    let dense_t = csc.transpose().to_dense();
    for r in 0..6 {
        for c in 0..6 {
            assert_eq!(dense_t[c * 6 + r], dense[r * 6 + c]);
        }
    }
}

#[test]
fn test_csc_constructor_validation() {
    // Unsorted rows in a column
    assert!(CscData::new(vec![0, 2], vec![1, 0], vec![1.0, 2.0], [2, 1]).is_err());
    // col_ptrs does not end at nnz
    assert!(CscData::new(vec![0, 1], vec![0, 1], vec![1.0, 2.0], [2, 1]).is_err());
    // Row out of range
    assert!(CscData::new(vec![0, 1], vec![2], vec![1.0], [2, 1]).is_err());
    // Interior column pointer past nnz
    let err = CscData::new(vec![0, 5, 3], vec![0, 1, 0], vec![1.0, 2.0, 3.0], [2, 2]).unwrap_err();
    assert!(err.is_usage_error());
    assert!(CscData::new(vec![0, 1], vec![1], vec![1.0], [2, 1]).is_ok());
}

#[test]
fn test_pattern_key_ignores_values() {
    let a = CooData::from_slices(&[0, 1], &[0, 1], &[1.0, 2.0], [2, 2])
        .unwrap()
        .to_csc()
        .unwrap();
    let b = a.with_values(vec![-3.0, 9.0]).unwrap();
    let c = CooData::from_slices(&[0, 1], &[1, 0], &[1.0, 2.0], [2, 2])
        .unwrap()
        .to_csc()
        .unwrap();

    assert_eq!(a.pattern_key(), b.pattern_key());
    assert_ne!(a.pattern_key(), c.pattern_key());
}

#[test]
fn test_sparse_tensor_batch_split_and_rebuild() {
    let mut rng = rng(3);
    let mask = random_mask(&mut rng, 5, 0.3);
    let a = random_batch(&mut rng, 3, 5, &mask, 1.0);

    let elements = a.batch_elements().unwrap();
    assert_eq!(elements.len(), 3);
    assert!(elements.iter().all(|e| e.shape() == [5, 5] && e.nnz() == mask.len()));

    let rebuilt = SparseTensor::from_batch(&elements).unwrap();
    assert!(rebuilt.same_pattern(&a));
    assert_eq!(
        rebuilt.values().to_vec::<f64>(),
        a.values().to_vec::<f64>()
    );

    let dense = a.to_dense().unwrap();
    let from_elements: Vec<f64> = elements.iter().flat_map(|e| e.to_dense()).collect();
    assert_allclose_f64(&dense.to_vec::<f64>(), &from_elements, 0.0, 0.0, "to_dense");
}

#[test]
fn test_sparse_tensor_dense_round_trip() {
    let dense = Tensor::from_slice(
        &[1.0f64, 0.0, 0.0, 2.0, 0.0, 3.0, 4.0, 0.0],
        &[2, 2, 2],
    );
    let sparse = SparseTensor::from_dense(&dense).unwrap();

    assert_eq!(sparse.nnz(), 4);
    assert_eq!(sparse.coords(0).unwrap(), &[0, 0, 1, 1]);
    assert_eq!(
        sparse.to_dense().unwrap().to_vec::<f64>(),
        dense.to_vec::<f64>()
    );
}

#[test]
fn test_sparse_tensor_rejects_bad_indices() {
    // Batch index 2 out of range for B = 2
    let err = SparseTensor::from_slices(&[2, 0, 0], &[1.0], &[2, 2, 2]).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfBounds { index: 2, size: 2 }));

    // Indices block too short for nnz = 2
    assert!(SparseTensor::from_slices(&[0, 0, 0], &[1.0, 2.0], &[2, 2, 2]).is_err());
}
