//! Forward and backward triangular substitution.
//!
//! Each solver takes a triangular matrix `T` and a right-hand side `b`, and
//! returns `x` with `T * x == b` as an `n x 1` matrix in the same storage
//! family as `T`. Sparse results store only non-zero entries.
//!
//! | Solver | Triangle | Storage |
//! |--------|----------|---------|
//! | [`forward_dense`] | lower | dense |
//! | [`forward_csc`] | lower | CSC |
//! | [`forward_csr`] | lower | CSR |
//! | [`backward_dense`] | upper | dense |
//! | [`backward_csc`] | upper | CSC |
//!
//! Entries on the wrong side of the diagonal are ignored. A zero or missing
//! diagonal entry fails with [`DecompError::Singular`] whatever the value of
//! `b`; when `b[j]` is zero the division and the column update are skipped.
//! Duplicate sparse entries are summed before solving, matching `to_dense`.

use std::borrow::Cow;

use tracing::debug;

use crate::csc::CscMatrix;
use crate::csr::CsrMatrix;
use crate::dense::DenseMatrix;
use crate::error::DecompError;
use crate::scalar::Scalar;
use crate::validation::{check_rhs, check_square};

/// Solve `L x = b` for dense lower-triangular `L`.
///
/// # Errors
///
/// [`DecompError::DimensionMismatch`] for a non-square `L` or a `b` of the
/// wrong length; [`DecompError::Singular`] for a zero diagonal entry.
pub fn forward_dense<T: Scalar>(l: &DenseMatrix<T>, b: &[T]) -> Result<DenseMatrix<T>, DecompError> {
    check_square(l.size(), "forward substitution")?;
    let n = l.rows();
    check_rhs(n, b.len())?;

    let mut x = b.to_vec();
    for j in 0..n {
        let diag = &l[(j, j)];
        if diag.is_zero() {
            return Err(DecompError::Singular { index: j });
        }
        if x[j].is_zero() {
            continue;
        }
        let xj = x[j].div(diag);
        for i in j + 1..n {
            let lij = &l[(i, j)];
            if !lij.is_zero() {
                x[i] = x[i].sub(&xj.mul(lij));
            }
        }
        x[j] = xj;
    }
    Ok(DenseMatrix::column(x))
}

/// Solve `U x = b` for dense upper-triangular `U`.
///
/// # Errors
///
/// Same conditions as [`forward_dense`].
pub fn backward_dense<T: Scalar>(u: &DenseMatrix<T>, b: &[T]) -> Result<DenseMatrix<T>, DecompError> {
    check_square(u.size(), "backward substitution")?;
    let n = u.rows();
    check_rhs(n, b.len())?;

    let mut x = b.to_vec();
    for j in (0..n).rev() {
        let diag = &u[(j, j)];
        if diag.is_zero() {
            return Err(DecompError::Singular { index: j });
        }
        if x[j].is_zero() {
            continue;
        }
        let xj = x[j].div(diag);
        for i in 0..j {
            let uij = &u[(i, j)];
            if !uij.is_zero() {
                x[i] = x[i].sub(&xj.mul(uij));
            }
        }
        x[j] = xj;
    }
    Ok(DenseMatrix::column(x))
}

/// Solve `L x = b` for lower-triangular `L` in CSC form.
///
/// # Errors
///
/// Same conditions as [`forward_dense`]; a diagonal entry that is not stored
/// counts as zero.
pub fn forward_csc<T: Scalar>(l: &CscMatrix<T>, b: &[T]) -> Result<CscMatrix<T>, DecompError> {
    check_square(l.size(), "forward substitution")?;
    let n = l.rows;
    check_rhs(n, b.len())?;
    let l = sorted_csc(l);

    let mut x = b.to_vec();
    for j in 0..n {
        let start = l.col_ptr[j];
        let end = l.col_ptr[j + 1];
        let rows = &l.row_indices[start..end];
        // First entry at or below the diagonal.
        let d = start + rows.partition_point(|&r| r < j);
        let diag = match (d < end).then(|| (l.row_indices[d], &l.values[d])) {
            Some((r, v)) if r == j && !v.is_zero() => v,
            _ => return Err(DecompError::Singular { index: j }),
        };
        if x[j].is_zero() {
            continue;
        }
        let xj = x[j].div(diag);
        for k in d + 1..end {
            let i = l.row_indices[k];
            x[i] = x[i].sub(&xj.mul(&l.values[k]));
        }
        x[j] = xj;
    }
    Ok(CscMatrix::column(&x))
}

/// Solve `U x = b` for upper-triangular `U` in CSC form.
///
/// # Errors
///
/// Same conditions as [`forward_csc`].
pub fn backward_csc<T: Scalar>(u: &CscMatrix<T>, b: &[T]) -> Result<CscMatrix<T>, DecompError> {
    check_square(u.size(), "backward substitution")?;
    let n = u.rows;
    check_rhs(n, b.len())?;
    let u = sorted_csc(u);

    let mut x = b.to_vec();
    for j in (0..n).rev() {
        let start = u.col_ptr[j];
        let end = u.col_ptr[j + 1];
        let rows = &u.row_indices[start..end];
        // One past the last entry at or above the diagonal.
        let past = start + rows.partition_point(|&r| r <= j);
        let diag = match (past > start).then(|| (u.row_indices[past - 1], &u.values[past - 1])) {
            Some((r, v)) if r == j && !v.is_zero() => v,
            _ => return Err(DecompError::Singular { index: j }),
        };
        if x[j].is_zero() {
            continue;
        }
        let xj = x[j].div(diag);
        for k in start..past - 1 {
            let i = u.row_indices[k];
            x[i] = x[i].sub(&xj.mul(&u.values[k]));
        }
        x[j] = xj;
    }
    Ok(CscMatrix::column(&x))
}

/// Solve `L x = b` for lower-triangular `L` in CSR form.
///
/// Rows are processed top to bottom as dot products against the part of `x`
/// already solved.
///
/// # Errors
///
/// Same conditions as [`forward_csc`].
pub fn forward_csr<T: Scalar>(l: &CsrMatrix<T>, b: &[T]) -> Result<CsrMatrix<T>, DecompError> {
    check_square(l.size(), "forward substitution")?;
    let n = l.rows;
    check_rhs(n, b.len())?;
    let l = sorted_csr(l);

    let mut x: Vec<T> = vec![T::zero(); n];
    for i in 0..n {
        let mut numerator = b[i].clone();
        let mut diag = None;
        for (c, v) in l.row_entries(i) {
            if c < i {
                if !x[c].is_zero() {
                    numerator = numerator.sub(&v.mul(&x[c]));
                }
            } else {
                if c == i {
                    diag = Some(v);
                }
                break;
            }
        }
        let diag = match diag {
            Some(v) if !v.is_zero() => v,
            _ => return Err(DecompError::Singular { index: i }),
        };
        if !numerator.is_zero() {
            x[i] = numerator.div(diag);
        }
    }

    let mut row_ptr = Vec::with_capacity(n + 1);
    let mut col_indices = Vec::new();
    let mut values = Vec::new();
    row_ptr.push(0);
    for xi in x {
        if !xi.is_zero() {
            col_indices.push(0);
            values.push(xi);
        }
        row_ptr.push(values.len());
    }
    Ok(CsrMatrix {
        row_ptr,
        col_indices,
        values,
        rows: n,
        cols: 1,
    })
}

/// Borrow `m` if its columns are strictly ascending, otherwise sort a
/// private copy and sum its duplicate entries.
fn sorted_csc<T: Scalar>(m: &CscMatrix<T>) -> Cow<'_, CscMatrix<T>> {
    if m.has_sorted_indices() {
        Cow::Borrowed(m)
    } else {
        debug!("unsorted CSC input, sorting a private copy");
        let mut owned = m.clone();
        owned.sum_duplicates();
        Cow::Owned(owned)
    }
}

/// Borrow `m` if its rows are strictly ascending, otherwise sort a private
/// copy and sum its duplicate entries.
fn sorted_csr<T: Scalar>(m: &CsrMatrix<T>) -> Cow<'_, CsrMatrix<T>> {
    if m.has_sorted_indices() {
        Cow::Borrowed(m)
    } else {
        debug!("unsorted CSR input, sorting a private copy");
        // Both scatter passes emit indices in ascending order.
        let mut columns = m.to_csc();
        columns.sum_duplicates();
        Cow::Owned(columns.to_csr())
    }
}
