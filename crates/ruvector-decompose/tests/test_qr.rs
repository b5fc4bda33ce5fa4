//! Integration tests for Householder QR decomposition.

mod helpers;

use approx::assert_abs_diff_eq;
use helpers::{max_abs_diff, max_abs_diff_complex, random_complex, random_dense};
use num_complex::Complex64;
use ruvector_decompose::dense::DenseMatrix;
use ruvector_decompose::engine::DecompositionEngine;
use ruvector_decompose::qr::{dense_qr, default_tolerance, QrFactors};
use ruvector_decompose::types::Matrix;

const TOL: f64 = 1e-10;

fn check_real(a: &DenseMatrix<f64>) {
    let (m, n) = a.size();
    let QrFactors { q, r } = dense_qr(a.clone(), TOL).unwrap();
    assert_eq!(q.size(), (m, m));
    assert_eq!(r.size(), (m, n));

    let qqt = q.matmul(&q.conj_transpose()).unwrap();
    assert!(max_abs_diff(&qqt, &DenseMatrix::identity(m)) < 1e-12, "{m}x{n}: Q not orthogonal");

    let qr = q.matmul(&r).unwrap();
    assert!(max_abs_diff(&qr, a) < 1e-12, "{m}x{n}: QR != A");

    for j in 0..n {
        for i in j + 1..m {
            assert_eq!(r.get(i, j), 0.0, "{m}x{n}: R[{i}][{j}] below diagonal");
        }
        if j < m {
            assert!(r.get(j, j) >= 0.0);
        }
    }
}

#[test]
fn test_square_real() {
    for (n, seed) in [(1, 1), (2, 2), (5, 3), (16, 4)] {
        check_real(&random_dense(n, n, seed));
    }
}

#[test]
fn test_tall_and_wide_real() {
    check_real(&random_dense(7, 3, 10));
    check_real(&random_dense(3, 7, 11));
    check_real(&random_dense(9, 1, 12));
}

#[test]
fn test_known_factorization() {
    // Classic example with integer R.
    let a = DenseMatrix::from_rows(vec![
        vec![12.0, -51.0, 4.0],
        vec![6.0, 167.0, -68.0],
        vec![-4.0, 24.0, -41.0],
    ])
    .unwrap();
    let QrFactors { r, .. } = dense_qr(a.clone(), TOL).unwrap();
    let expected = [[14.0, 21.0, -14.0], [0.0, 175.0, -70.0], [0.0, 0.0, 35.0]];
    for (i, row) in expected.iter().enumerate() {
        for (j, &e) in row.iter().enumerate() {
            assert_abs_diff_eq!(r.get(i, j), e, epsilon = 1e-9);
        }
    }
    check_real(&a);
}

#[test]
fn test_zero_column_is_left_alone() {
    let a = DenseMatrix::from_rows(vec![
        vec![0.0, 1.0],
        vec![0.0, 2.0],
        vec![0.0, 2.0],
    ])
    .unwrap();
    let QrFactors { q, r } = dense_qr(a.clone(), TOL).unwrap();
    // Column 0 produces no reflection, so column 1 is reduced over rows 1..3.
    assert_eq!(r.get(0, 0), 0.0);
    assert_eq!(r.get(0, 1), 1.0);
    assert_abs_diff_eq!(r.get(1, 1), 8.0_f64.sqrt(), epsilon = 1e-12);
    assert!(max_abs_diff(&q.matmul(&r).unwrap(), &a) < 1e-12);
}

#[test]
fn test_complex_unitary_and_reconstruction() {
    for (m, n, seed) in [(3, 3, 5), (5, 2, 6), (2, 4, 7)] {
        let a = random_complex(m, n, seed);
        let QrFactors { q, r } = dense_qr(a.clone(), TOL).unwrap();

        let qqh = q.matmul(&q.conj_transpose()).unwrap();
        assert!(
            max_abs_diff_complex(&qqh, &DenseMatrix::identity(m)) < 1e-12,
            "{m}x{n}: Q not unitary"
        );
        assert!(max_abs_diff_complex(&q.matmul(&r).unwrap(), &a) < 1e-12);

        for j in 0..n.min(m) {
            let d = r.get(j, j);
            assert_abs_diff_eq!(d.im, 0.0, epsilon = 1e-12);
            assert!(d.re >= 0.0);
            for i in j + 1..m {
                assert_eq!(r.get(i, j), Complex64::new(0.0, 0.0));
            }
        }
    }
}

#[test]
fn test_input_is_consumed_not_shared() {
    let a = random_dense(4, 4, 99);
    let copy = a.clone();
    let _ = dense_qr(a, TOL).unwrap();
    assert_eq!(copy, random_dense(4, 4, 99));
}

// ---------------------------------------------------------------------------
// Single precision
// ---------------------------------------------------------------------------

#[test]
fn test_single_precision_through_default_engine() {
    let engine = DecompositionEngine::default();
    for (m, n) in [(4, 4), (16, 16), (12, 5), (3, 9)] {
        for seed in 1..=20 {
            let a: DenseMatrix<f32> = random_dense(m, n, seed).map(|v| *v as f32);
            let QrFactors { q, r } = engine
                .qr(&Matrix::Dense(a.clone()))
                .unwrap_or_else(|e| panic!("{m}x{n} seed {seed}: {e}"));

            let qr = q.matmul(&r).unwrap();
            for i in 0..m {
                for j in 0..n {
                    assert!((qr.get(i, j) - a.get(i, j)).abs() < 1e-4, "{m}x{n} seed {seed}");
                    if i > j {
                        assert_eq!(r.get(i, j), 0.0);
                    }
                }
            }
        }
    }
}

#[test]
fn test_single_precision_tolerance_is_looser() {
    assert!(default_tolerance::<f32>(4, 4) > default_tolerance::<f64>(4, 4) * 1e8);
    // Double precision keeps the check tight enough to catch real defects.
    assert!(default_tolerance::<f64>(100, 100) < 1e-11);
}
