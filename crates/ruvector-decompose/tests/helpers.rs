//! Shared test helpers for the ruvector-decompose integration test suite.
//!
//! Provides deterministic random matrix generators and element-wise
//! comparison utilities used across all test modules.

#![allow(dead_code)]

use num_complex::Complex64;
use ruvector_decompose::csc::CscMatrix;
use ruvector_decompose::dense::DenseMatrix;

// ---------------------------------------------------------------------------
// Random number generator (simple LCG for deterministic reproducibility)
// ---------------------------------------------------------------------------

/// A minimal linear congruential generator for deterministic test data.
///
/// Uses the Knuth MMIX LCG parameters. Not cryptographically secure, but
/// perfectly adequate for generating reproducible test matrices.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Create a new LCG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next u64 value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Generate a uniform f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a uniform f64 in [lo, hi).
    pub fn next_f64_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

// ---------------------------------------------------------------------------
// Matrix generators
// ---------------------------------------------------------------------------

/// Dense `rows x cols` matrix with entries uniform in [-1, 1).
pub fn random_dense(rows: usize, cols: usize, seed: u64) -> DenseMatrix<f64> {
    let mut rng = Lcg::new(seed);
    let data = (0..rows * cols)
        .map(|_| rng.next_f64_range(-1.0, 1.0))
        .collect();
    DenseMatrix::new(rows, cols, data).unwrap()
}

/// Dense complex matrix with real and imaginary parts uniform in [-1, 1).
pub fn random_complex(rows: usize, cols: usize, seed: u64) -> DenseMatrix<Complex64> {
    let mut rng = Lcg::new(seed);
    let data = (0..rows * cols)
        .map(|_| Complex64::new(rng.next_f64_range(-1.0, 1.0), rng.next_f64_range(-1.0, 1.0)))
        .collect();
    DenseMatrix::new(rows, cols, data).unwrap()
}

/// Random sparse square matrix with a non-zero diagonal.
///
/// Each off-diagonal entry is present with probability `density`. The
/// diagonal is deliberately small relative to the off-diagonal entries so
/// that partial pivoting actually has to swap rows.
pub fn random_sparse(n: usize, density: f64, seed: u64) -> CscMatrix<f64> {
    let mut rng = Lcg::new(seed);
    let mut entries = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                entries.push((i, j, rng.next_f64_range(0.1, 0.5)));
            } else if rng.next_f64() < density {
                entries.push((i, j, rng.next_f64_range(-2.0, 2.0)));
            }
        }
    }
    CscMatrix::from_triplets(n, n, entries).unwrap()
}

/// Random vector with entries uniform in [-1, 1).
pub fn random_vector(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = Lcg::new(seed);
    (0..n).map(|_| rng.next_f64_range(-1.0, 1.0)).collect()
}

/// Random lower-triangular dense matrix with diagonal entries bounded away
/// from zero.
pub fn random_lower(n: usize, seed: u64) -> DenseMatrix<f64> {
    let mut rng = Lcg::new(seed);
    let mut m = DenseMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..i {
            if rng.next_f64() < 0.5 {
                m.set(i, j, rng.next_f64_range(-1.0, 1.0));
            }
        }
        m.set(i, i, rng.next_f64_range(1.0, 2.0));
    }
    m
}

// ---------------------------------------------------------------------------
// Comparison helpers
// ---------------------------------------------------------------------------

/// Maximum absolute element-wise difference between two dense matrices.
///
/// # Panics
///
/// Panics if the shapes differ.
pub fn max_abs_diff(a: &DenseMatrix<f64>, b: &DenseMatrix<f64>) -> f64 {
    assert_eq!(a.size(), b.size(), "shape mismatch");
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Complex variant of [`max_abs_diff`].
pub fn max_abs_diff_complex(a: &DenseMatrix<Complex64>, b: &DenseMatrix<Complex64>) -> f64 {
    assert_eq!(a.size(), b.size(), "shape mismatch");
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

/// `m * x` for a dense matrix and a vector.
pub fn dense_matvec(m: &DenseMatrix<f64>, x: &[f64]) -> Vec<f64> {
    (0..m.rows())
        .map(|i| m.row(i).iter().zip(x).map(|(a, b)| a * b).sum())
        .collect()
}
