//! Integration tests for dense and sparse LU decomposition.

mod helpers;

use approx::assert_relative_eq;
use helpers::{max_abs_diff, random_dense, random_sparse, Lcg};
use ruvector_decompose::csc::CscMatrix;
use ruvector_decompose::dense::DenseMatrix;
use ruvector_decompose::lu::{dense_lu, sparse_lu};
use ruvector_decompose::scalar::Scalar;

// ---------------------------------------------------------------------------
// Exact rational scalar
// ---------------------------------------------------------------------------

/// Reduced fraction with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frac {
    num: i128,
    den: i128,
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Frac {
    fn new(num: i128, den: i128) -> Self {
        assert!(den != 0, "zero denominator");
        let sign = if den < 0 { -1 } else { 1 };
        let g = gcd(num, den).max(1);
        Self {
            num: sign * num / g,
            den: sign * den / g,
        }
    }

    fn int(v: i64) -> Self {
        Self::new(v as i128, 1)
    }
}

impl Scalar for Frac {
    fn zero() -> Self {
        Self::int(0)
    }
    fn one() -> Self {
        Self::int(1)
    }
    fn add(&self, rhs: &Self) -> Self {
        Self::new(self.num * rhs.den + rhs.num * self.den, self.den * rhs.den)
    }
    fn sub(&self, rhs: &Self) -> Self {
        Self::new(self.num * rhs.den - rhs.num * self.den, self.den * rhs.den)
    }
    fn mul(&self, rhs: &Self) -> Self {
        Self::new(self.num * rhs.num, self.den * rhs.den)
    }
    fn div(&self, rhs: &Self) -> Self {
        Self::new(self.num * rhs.den, self.den * rhs.num)
    }
    fn neg(&self) -> Self {
        Self::new(-self.num, self.den)
    }
    fn magnitude_gt(&self, other: &Self) -> bool {
        self.num.abs() * other.den > other.num.abs() * self.den
    }
    fn is_zero(&self) -> bool {
        self.num == 0
    }
    fn signum(&self) -> Self {
        Self::new(self.num.signum(), 1)
    }
    fn sqrt(&self) -> Self {
        unimplemented!("square roots of rationals are not rational in general")
    }
    fn conj(&self) -> Self {
        *self
    }
    fn from_f64(v: f64) -> Self {
        Self::new((v * 1e9).round() as i128, 1_000_000_000)
    }
    fn epsilon() -> f64 {
        0.0
    }
}

fn frac_matrix(rows: &[&[i64]]) -> DenseMatrix<Frac> {
    DenseMatrix::from_rows(
        rows.iter()
            .map(|r| r.iter().map(|&v| Frac::int(v)).collect())
            .collect(),
    )
    .unwrap()
}

fn random_int_sparse(n: usize, seed: u64) -> DenseMatrix<Frac> {
    let mut rng = Lcg::new(seed);
    let mut m = DenseMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            if i == j || rng.next_f64() < 0.4 {
                let v = (rng.next_u64() % 9) as i64 - 4;
                m.set(i, j, Frac::int(v));
            }
        }
    }
    m
}

// ---------------------------------------------------------------------------
// Concrete scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_two_by_two_scenario_dense_and_sparse() {
    let a = DenseMatrix::from_rows(vec![vec![2.0, 1.0], vec![1.0, 4.0]]).unwrap();

    let dense = dense_lu(a.clone());
    assert_eq!(dense.l.to_rows(), vec![vec![1.0, 0.0], vec![0.5, 1.0]]);
    assert_eq!(dense.u.to_rows(), vec![vec![2.0, 1.0], vec![0.0, 3.5]]);
    assert_eq!(dense.p.as_slice(), &[0, 1]);

    let sparse = sparse_lu(&a.to_csc());
    assert_eq!(sparse.l.to_dense(), dense.l);
    assert_eq!(sparse.u.to_dense(), dense.u);
    assert_eq!(sparse.p, dense.p);
}

#[test]
fn test_exact_rational_reconstruction() {
    let a = frac_matrix(&[&[2, 1, 1], &[4, -6, 0], &[-2, 7, 2]]);

    let f = dense_lu(a.clone());
    let lu = f.l.matmul(&f.u).unwrap();
    assert_eq!(lu, f.p.permute_rows(&a));
    // Largest |a_i0| is 4, in row 1.
    assert_eq!(f.p.as_slice()[0], 1);
    assert_eq!(f.l.get(1, 0), Frac::new(1, 2));

    let s = sparse_lu(&a.to_csc());
    assert_eq!(s.l.to_dense(), f.l);
    assert_eq!(s.u.to_dense(), f.u);
    assert_eq!(s.p, f.p);
}

#[test]
fn test_sparse_matches_dense_exactly_on_rationals() {
    for seed in 1..=6 {
        let a = random_int_sparse(6, seed);
        let dense = dense_lu(a.clone());
        let sparse = sparse_lu(&a.to_csc());
        assert_eq!(sparse.p, dense.p, "seed {seed}");
        assert_eq!(sparse.l.to_dense(), dense.l, "seed {seed}");
        assert_eq!(sparse.u.to_dense(), dense.u, "seed {seed}");
        assert_eq!(
            dense.l.matmul(&dense.u).unwrap(),
            dense.p.permute_rows(&a),
            "seed {seed}"
        );
    }
}

// ---------------------------------------------------------------------------
// Reconstruction on floating-point input
// ---------------------------------------------------------------------------

#[test]
fn test_dense_reconstruction_square() {
    for (n, seed) in [(1, 3), (4, 7), (12, 11), (25, 13)] {
        let a = random_dense(n, n, seed);
        let f = dense_lu(a.clone());
        let lu = f.l.matmul(&f.u).unwrap();
        assert!(
            max_abs_diff(&lu, &f.p.permute_rows(&a)) < 1e-10,
            "n = {n}"
        );
        // Partial pivoting bounds every multiplier by one.
        for i in 0..n {
            assert_eq!(f.l.get(i, i), 1.0);
            for j in 0..i {
                assert!(f.l.get(i, j).abs() <= 1.0);
            }
            for j in 0..i {
                assert_eq!(f.u.get(i, j), 0.0);
            }
        }
    }
}

#[test]
fn test_dense_reconstruction_rectangular() {
    for (rows, cols) in [(6, 3), (3, 6), (5, 1), (1, 5)] {
        let a = random_dense(rows, cols, (rows * 31 + cols) as u64);
        let f = dense_lu(a.clone());
        let k = rows.min(cols);
        assert_eq!(f.l.size(), (rows, k));
        assert_eq!(f.u.size(), (k, cols));
        let lu = f.l.matmul(&f.u).unwrap();
        assert!(max_abs_diff(&lu, &f.p.permute_rows(&a)) < 1e-12);
    }
}

#[test]
fn test_sparse_reconstruction_random() {
    for (n, density, seed) in [(10, 0.3, 1), (40, 0.08, 2), (80, 0.03, 3)] {
        let a = random_sparse(n, density, seed);
        let f = sparse_lu(&a);
        assert!(f.l.has_sorted_indices());
        assert!(f.u.has_sorted_indices());

        // Unit diagonal stored first in every column of L.
        for j in 0..n {
            let (row, value) = f.l.col_entries(j).next().unwrap();
            assert_eq!(row, j);
            assert_eq!(*value, 1.0);
        }

        let lu = f.l.to_dense().matmul(&f.u.to_dense()).unwrap();
        let pa = f.p.permute_rows(&a.to_dense());
        assert!(max_abs_diff(&lu, &pa) < 1e-9, "n = {n}");
    }
}

#[test]
fn test_sparse_rectangular_shapes() {
    let wide = random_dense(3, 5, 21).to_csc();
    let f = sparse_lu(&wide);
    assert_eq!(f.l.size(), (3, 3));
    assert_eq!(f.u.size(), (3, 5));
    let lu = f.l.to_dense().matmul(&f.u.to_dense()).unwrap();
    assert!(max_abs_diff(&lu, &f.p.permute_rows(&wide.to_dense())) < 1e-12);

    let tall = random_dense(5, 3, 22).to_csc();
    let f = sparse_lu(&tall);
    assert_eq!(f.l.size(), (5, 3));
    assert_eq!(f.u.size(), (3, 3));
    let lu = f.l.to_dense().matmul(&f.u.to_dense()).unwrap();
    assert!(max_abs_diff(&lu, &f.p.permute_rows(&tall.to_dense())) < 1e-12);
}

#[test]
fn test_sparse_lu_does_not_fill_structural_zeros() {
    // Block-diagonal input: elimination never couples the two blocks.
    let a = CscMatrix::from_triplets(
        4,
        4,
        vec![
            (0, 0, 4.0),
            (1, 0, 1.0),
            (0, 1, 2.0),
            (1, 1, 3.0),
            (2, 2, 5.0),
            (3, 3, 6.0),
        ],
    )
    .unwrap();
    let f = sparse_lu(&a);
    assert_eq!(f.l.nnz(), 5);
    assert_eq!(f.u.nnz(), 5);
    assert_relative_eq!(f.u.get(1, 1), 2.5);
    assert_relative_eq!(f.l.get(1, 0), 0.25);
}

// ---------------------------------------------------------------------------
// Singular input
// ---------------------------------------------------------------------------

#[test]
fn test_singular_input_factors_without_error() {
    let a = DenseMatrix::from_rows(vec![
        vec![1.0, 2.0, 3.0],
        vec![2.0, 4.0, 6.0],
        vec![1.0, 0.0, 1.0],
    ])
    .unwrap();
    let f = dense_lu(a.clone());
    let lu = f.l.matmul(&f.u).unwrap();
    assert!(max_abs_diff(&lu, &f.p.permute_rows(&a)) < 1e-12);
    assert!((0..3).any(|i| f.u.get(i, i) == 0.0));

    let s = sparse_lu(&a.to_csc());
    let lu = s.l.to_dense().matmul(&s.u.to_dense()).unwrap();
    assert!(max_abs_diff(&lu, &s.p.permute_rows(&a)) < 1e-12);
}

#[test]
fn test_zero_column_is_skipped() {
    let a = frac_matrix(&[&[0, 1], &[0, 2]]);
    let f = dense_lu(a.clone());
    assert!(f.p.is_identity());
    assert_eq!(f.l.matmul(&f.u).unwrap(), a);
    let s = sparse_lu(&a.to_csc());
    assert_eq!(s.u.to_dense(), f.u);
}
