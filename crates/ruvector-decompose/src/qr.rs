//! Householder QR decomposition for dense matrices.
//!
//! For an `m x n` input `A`, [`dense_qr`] returns a unitary `Q` (`m x m`) and
//! an upper-triangular `R` (`m x n`) with `A == Q * R`. Reflections are built
//! with the sign opposite to the pivot's phase, so the diagonal of `R` comes
//! out real and non-negative. All sums are conjugate-aware, which makes the
//! same code correct for complex scalars.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dense::DenseMatrix;
use crate::error::DecompError;
use crate::scalar::Scalar;

/// Result of a QR decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrFactors<T> {
    /// Unitary factor, `m x m`.
    pub q: DenseMatrix<T>,
    /// Upper-triangular factor, `m x n`.
    pub r: DenseMatrix<T>,
}

/// Relative tolerance used when the caller does not supply one:
/// `16 * (rows + cols)` rounding units of `T`, zero for exact types.
pub fn default_tolerance<T: Scalar>(rows: usize, cols: usize) -> f64 {
    16.0 * (rows + cols) as f64 * T::epsilon()
}

/// Householder QR decomposition.
///
/// After the reflections, each strictly sub-diagonal entry of `R` is checked
/// against `tolerance * max|a_ij|`: entries within the threshold are set to
/// exactly zero, anything larger is reported. See [`default_tolerance`] for
/// a precision-aware choice.
///
/// # Errors
///
/// Returns [`DecompError::InvariantViolation`] if a sub-diagonal residual
/// exceeds the threshold.
pub fn dense_qr<T: Scalar>(a: DenseMatrix<T>, tolerance: f64) -> Result<QrFactors<T>, DecompError> {
    let (rows, cols) = a.size();
    let threshold = largest_magnitude(&a).mul(&T::from_f64(tolerance));
    debug!(?threshold, "QR residual threshold");

    let mut q: DenseMatrix<T> = DenseMatrix::identity(rows);
    let mut r = a;
    let mut w = vec![T::zero(); rows];

    for k in 0..rows.min(cols) {
        let pivot = r[(k, k)].clone();
        let phase = if pivot.is_zero() {
            T::one()
        } else {
            pivot.signum()
        };
        let sgn = phase.neg();
        let conj_sgn = sgn.conj();

        let mut alpha_sq = T::zero();
        for i in k..rows {
            alpha_sq = alpha_sq.add(&r[(i, k)].mul(&r[(i, k)].conj()));
        }
        let alpha = sgn.mul(&alpha_sq.sqrt());

        if alpha.is_zero() {
            continue;
        }

        // Householder vector with w[k] == 1.
        let u1 = pivot.sub(&alpha);
        w[k] = T::one();
        for i in k + 1..rows {
            w[i] = r[(i, k)].div(&u1);
        }
        let tau = u1.div(&alpha).conj().neg();

        for j in k..cols {
            let mut s = T::zero();
            for i in k..rows {
                s = s.add(&w[i].conj().mul(&r[(i, j)]));
            }
            s = tau.mul(&s);
            for i in k..rows {
                r[(i, j)] = r[(i, j)].sub(&w[i].mul(&s)).mul(&conj_sgn);
            }
        }

        for i in 0..rows {
            let mut s = T::zero();
            for j in k..rows {
                s = s.add(&q[(i, j)].mul(&w[j]));
            }
            s = tau.mul(&s);
            for j in k..rows {
                q[(i, j)] = q[(i, j)].sub(&s.mul(&w[j].conj())).div(&conj_sgn);
            }
        }
    }

    clean_lower_triangle(&mut r, &threshold)?;

    Ok(QrFactors { q, r })
}

/// `max|a_ij|` as a non-negative real value of `T` (zero for an empty
/// matrix).
fn largest_magnitude<T: Scalar>(m: &DenseMatrix<T>) -> T {
    let mut best = T::zero();
    for v in m.as_slice() {
        if v.magnitude_gt(&best) {
            best = v.clone();
        }
    }
    // v * conj(v / |v|) == |v|
    best.mul(&best.signum().conj())
}

/// Coerce sub-diagonal residuals within `threshold` to zero.
pub(crate) fn clean_lower_triangle<T: Scalar>(
    r: &mut DenseMatrix<T>,
    threshold: &T,
) -> Result<(), DecompError> {
    let (rows, cols) = r.size();
    for j in 0..cols {
        for i in j + 1..rows {
            let v = &r[(i, j)];
            if v.is_zero() {
                continue;
            }
            if v.magnitude_gt(threshold) {
                return Err(DecompError::InvariantViolation(format!(
                    "QR residual at ({i}, {j}) is {v:?}, exceeds threshold {threshold:?}"
                )));
            }
            debug!(row = i, col = j, "coercing QR residual to zero");
            r[(i, j)] = T::zero();
        }
    }
    Ok(())
}
