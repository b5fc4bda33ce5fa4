//! Storage-dispatching front end.
//!
//! [`DecompositionEngine`] accepts [`Matrix`] values, switches on their
//! [`StorageKind`] once, and forwards to the monomorphic routines in
//! [`lu`](crate::lu), [`qr`](crate::qr) and
//! [`substitution`](crate::substitution).
//!
//! # Dispatch table
//!
//! | Operation | Dense | CSC | CSR |
//! |-----------|-------|-----|-----|
//! | `lu` | [`dense_lu`] | [`sparse_lu`] | unsupported |
//! | `qr` | [`dense_qr`] | unsupported | unsupported |
//! | `lsolve` | [`forward_dense`] | [`forward_csc`] | [`forward_csr`] |
//! | `usolve` | [`backward_dense`] | [`backward_csc`] | unsupported |
//! | `lusolve` | LU + both solves | LU + both solves | unsupported |
//!
//! Right-hand sides are `n x 1` matrices in any storage.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::DecompError;
use crate::lu::{dense_lu, sparse_lu, LuFactors};
use crate::qr::{default_tolerance, dense_qr, QrFactors};
use crate::scalar::Scalar;
use crate::substitution::{backward_csc, backward_dense, forward_csc, forward_csr, forward_dense};
use crate::types::{Matrix, MatrixStorage, StorageKind};
use crate::validation::{check_rhs, check_square, validate_csc, validate_csr};

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Engine configuration.
///
/// # Example
///
/// ```rust
/// use ruvector_decompose::engine::EngineConfig;
///
/// let config = EngineConfig {
///     qr_residual_tolerance: Some(1e-12),
///     ..Default::default()
/// };
/// assert!(config.validate_inputs);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Relative threshold for the QR triangularity check.
    ///
    /// A sub-diagonal entry of `R` whose magnitude is at most
    /// `qr_residual_tolerance * max|a_ij|` is set to zero; anything larger
    /// is reported as [`DecompError::InvariantViolation`]. `None` derives the
    /// tolerance from the scalar's precision and the matrix shape via
    /// [`default_tolerance`].
    ///
    /// Default: `None`.
    pub qr_residual_tolerance: Option<f64>,

    /// Run structural validation on sparse operands before computing.
    ///
    /// Default: `true`.
    pub validate_inputs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            qr_residual_tolerance: None,
            validate_inputs: true,
        }
    }
}

// ---------------------------------------------------------------------------
// DecompositionEngine
// ---------------------------------------------------------------------------

/// Decomposition and substitution over any supported storage.
#[derive(Debug, Clone, Default)]
pub struct DecompositionEngine {
    config: EngineConfig,
}

impl DecompositionEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// LU decomposition with partial pivoting.
    ///
    /// Dense input is cloned, so `a` is left untouched. `L` and `U` come back
    /// in the storage of `a`.
    ///
    /// # Errors
    ///
    /// [`DecompError::UnsupportedStorage`] for CSR input;
    /// [`DecompError::InvalidInput`] for malformed sparse input.
    #[instrument(skip(self, a), fields(kind = %a.storage_kind(), rows = a.size().0, cols = a.size().1))]
    pub fn lu<T: Scalar>(&self, a: &Matrix<T>) -> Result<LuFactors<Matrix<T>>, DecompError> {
        self.validate(a)?;
        let factors = match a {
            Matrix::Dense(d) => {
                let f = dense_lu(d.clone());
                LuFactors {
                    l: Matrix::Dense(f.l),
                    u: Matrix::Dense(f.u),
                    p: f.p,
                }
            }
            Matrix::Csc(c) => {
                let f = sparse_lu(c);
                LuFactors {
                    l: Matrix::Csc(f.l),
                    u: Matrix::Csc(f.u),
                    p: f.p,
                }
            }
            Matrix::Csr(_) => {
                return Err(DecompError::UnsupportedStorage {
                    kind: StorageKind::Csr,
                    operation: "lu",
                })
            }
        };
        info!(pivoted = !factors.p.is_identity(), "LU decomposition complete");
        Ok(factors)
    }

    /// Householder QR decomposition of a dense matrix.
    ///
    /// # Errors
    ///
    /// [`DecompError::UnsupportedStorage`] for sparse input;
    /// [`DecompError::InvariantViolation`] if the triangularity check fails.
    #[instrument(skip(self, a), fields(kind = %a.storage_kind(), rows = a.size().0, cols = a.size().1))]
    pub fn qr<T: Scalar>(&self, a: &Matrix<T>) -> Result<QrFactors<T>, DecompError> {
        match a {
            Matrix::Dense(d) => {
                let (rows, cols) = d.size();
                let tolerance = self
                    .config
                    .qr_residual_tolerance
                    .unwrap_or_else(|| default_tolerance::<T>(rows, cols));
                let f = dense_qr(d.clone(), tolerance)?;
                info!("QR decomposition complete");
                Ok(f)
            }
            other => Err(DecompError::UnsupportedStorage {
                kind: other.storage_kind(),
                operation: "qr",
            }),
        }
    }

    /// Forward substitution `L x = b`; `x` is returned in the storage of `l`.
    ///
    /// # Errors
    ///
    /// [`DecompError::DimensionMismatch`] for incompatible shapes,
    /// [`DecompError::Singular`] for a zero diagonal entry.
    #[instrument(skip(self, l, b), fields(kind = %l.storage_kind(), n = l.size().0))]
    pub fn lsolve<T: Scalar>(&self, l: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>, DecompError> {
        self.validate(l)?;
        let rhs = self.rhs_values(b)?;
        Ok(match l {
            Matrix::Dense(d) => Matrix::Dense(forward_dense(d, &rhs)?),
            Matrix::Csc(c) => Matrix::Csc(forward_csc(c, &rhs)?),
            Matrix::Csr(r) => Matrix::Csr(forward_csr(r, &rhs)?),
        })
    }

    /// Backward substitution `U x = b`; `x` is returned in the storage of `u`.
    ///
    /// # Errors
    ///
    /// As [`lsolve`](Self::lsolve), plus [`DecompError::UnsupportedStorage`]
    /// for CSR input.
    #[instrument(skip(self, u, b), fields(kind = %u.storage_kind(), n = u.size().0))]
    pub fn usolve<T: Scalar>(&self, u: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>, DecompError> {
        self.validate(u)?;
        let rhs = self.rhs_values(b)?;
        match u {
            Matrix::Dense(d) => Ok(Matrix::Dense(backward_dense(d, &rhs)?)),
            Matrix::Csc(c) => Ok(Matrix::Csc(backward_csc(c, &rhs)?)),
            Matrix::Csr(_) => Err(DecompError::UnsupportedStorage {
                kind: StorageKind::Csr,
                operation: "usolve",
            }),
        }
    }

    /// Solve `A x = b` through LU: factor, reorder `b` by `p`, then forward
    /// and backward substitution.
    ///
    /// # Errors
    ///
    /// Any error of [`lu`](Self::lu), [`lsolve`](Self::lsolve) or
    /// [`usolve`](Self::usolve); `A` must be square.
    #[instrument(skip(self, a, b), fields(kind = %a.storage_kind(), n = a.size().0))]
    pub fn lusolve<T: Scalar>(&self, a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>, DecompError> {
        check_square(a.size(), "lusolve")?;
        let rhs = self.rhs_values(b)?;
        check_rhs(a.size().0, rhs.len())?;

        let LuFactors { l, u, p } = self.lu(a)?;
        let pb = p.permute_vec(&rhs);
        match (&l, &u) {
            (Matrix::Dense(l), Matrix::Dense(u)) => {
                let y = forward_dense(l, &pb)?;
                Ok(Matrix::Dense(backward_dense(u, y.as_slice())?))
            }
            (Matrix::Csc(l), Matrix::Csc(u)) => {
                let y = forward_csc(l, &pb)?;
                Ok(Matrix::Csc(backward_csc(u, &y.column_values())?))
            }
            _ => Err(DecompError::UnsupportedStorage {
                kind: a.storage_kind(),
                operation: "lusolve",
            }),
        }
    }

    fn validate<T: Scalar>(&self, m: &Matrix<T>) -> Result<(), DecompError> {
        if !self.config.validate_inputs {
            return Ok(());
        }
        match m {
            Matrix::Dense(_) => {}
            Matrix::Csc(c) => validate_csc(c)?,
            Matrix::Csr(r) => validate_csr(r)?,
        }
        Ok(())
    }

    /// Densified values of an `n x 1` right-hand side.
    fn rhs_values<T: Scalar>(&self, b: &Matrix<T>) -> Result<Vec<T>, DecompError> {
        self.validate(b)?;
        b.column_values().ok_or_else(|| {
            let (rows, cols) = b.size();
            DecompError::DimensionMismatch(format!(
                "right-hand side must be a column vector, got {rows}x{cols}"
            ))
        })
    }
}
