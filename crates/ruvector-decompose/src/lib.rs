//! Direct decompositions and triangular solvers for the ruvector ecosystem.
//!
//! This crate factors matrices stored densely or in compressed sparse form,
//! and solves the triangular systems the factors produce. Every algorithm is
//! generic over the [`Scalar`](scalar::Scalar) contract, so the same code runs
//! on `f32`, `f64`, complex numbers or any exact type that implements it.
//!
//! # Available Operations
//!
//! | Operation | Storage | Entry point |
//! |-----------|---------|-------------|
//! | LU with partial pivoting | dense | [`dense_lu`](lu::dense_lu) |
//! | LU with partial pivoting | CSC | [`sparse_lu`](lu::sparse_lu) |
//! | Householder QR | dense | [`dense_qr`](qr::dense_qr) |
//! | Forward substitution | dense, CSC, CSR | [`substitution`] |
//! | Backward substitution | dense, CSC | [`substitution`] |
//!
//! [`DecompositionEngine`](engine::DecompositionEngine) dispatches all of
//! these over the [`Matrix`](types::Matrix) storage union.
//!
//! # Example
//!
//! ```rust
//! use ruvector_decompose::dense::DenseMatrix;
//! use ruvector_decompose::engine::{DecompositionEngine, EngineConfig};
//! use ruvector_decompose::types::{Matrix, StorageKind};
//!
//! let a: DenseMatrix<f64> = DenseMatrix::from_rows(vec![vec![2.0, 1.0], vec![1.0, 4.0]]).unwrap();
//! let b: DenseMatrix<f64> = DenseMatrix::column(vec![3.0, 9.0]);
//!
//! let engine = DecompositionEngine::new(EngineConfig::default());
//! let x = engine
//!     .lusolve(&Matrix::from_dense(StorageKind::Csc, a), &Matrix::Dense(b))
//!     .unwrap();
//! let x = x.to_dense();
//! assert!((x.get(0, 0) - 1.0).abs() < 1e-12);
//! assert!((x.get(1, 0) - 2.0).abs() < 1e-12);
//! ```

pub mod csc;
pub mod csr;
pub mod dense;
pub mod engine;
pub mod error;
pub mod heap;
pub mod lu;
pub mod qr;
pub mod scalar;
pub mod spa;
pub mod substitution;
pub mod types;
pub mod validation;
