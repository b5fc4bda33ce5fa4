//! LU decomposition with partial pivoting.
//!
//! Both variants return `{L, U, p}` with `A[p, :] == L * U`, where
//! `p[i]` is the original row now at position `i`:
//!
//! - `L` is `m x min(m, n)` unit lower triangular,
//! - `U` is `min(m, n) x n` upper triangular.
//!
//! Neither variant fails on singular input. A zero pivot is left in `U` and
//! the substitution that later divides by it reports
//! [`DecompError::Singular`](crate::error::DecompError::Singular).
//!
//! The dense variant is a Crout-style in-place elimination over a private
//! buffer. The sparse variant is left-looking: each column of `A` is
//! scattered into a [`Spa`], reduced by the already-finished columns of `L`
//! in ascending row order, and gathered straight into append-only CSC
//! buffers for `L` and `U`.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::csc::CscMatrix;
use crate::dense::DenseMatrix;
use crate::scalar::Scalar;
use crate::spa::Spa;
use crate::types::Permutation;

/// Result of an LU decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuFactors<M> {
    /// Unit lower-triangular factor.
    pub l: M,
    /// Upper-triangular factor.
    pub u: M,
    /// Row permutation, current position to original row.
    pub p: Permutation,
}

/// Dense LU decomposition with partial pivoting.
///
/// `a` is consumed and used as the working buffer.
pub fn dense_lu<T: Scalar>(mut a: DenseMatrix<T>) -> LuFactors<DenseMatrix<T>> {
    let (rows, cols) = a.size();
    let mut p = Permutation::identity(rows);

    for j in 0..cols {
        if j > 0 {
            // Apply the finished columns to column j.
            for i in 0..rows {
                let kmax = i.min(j);
                let mut s = T::zero();
                for k in 0..kmax {
                    s = s.add(&a[(i, k)].mul(&a[(k, j)]));
                }
                a[(i, j)] = a[(i, j)].sub(&s);
            }
        }

        let mut pivot_row = j;
        let mut pivot = T::zero();
        for i in j..rows {
            if a[(i, j)].magnitude_gt(&pivot) {
                pivot = a[(i, j)].clone();
                pivot_row = i;
            }
        }

        if pivot_row != j {
            debug!(column = j, pivot_row, "dense LU row swap");
            p.swap(j, pivot_row);
            a.swap_rows(j, pivot_row);
        }

        if j < rows {
            if pivot.is_zero() {
                debug!(column = j, "zero pivot, factorization is singular");
            }
            for i in j + 1..rows {
                if !a[(i, j)].is_zero() {
                    a[(i, j)] = a[(i, j)].div(&pivot);
                }
            }
        }
    }

    let n = rows.min(cols);
    let mut l: DenseMatrix<T> = DenseMatrix::zeros(rows, n);
    let mut u: DenseMatrix<T> = DenseMatrix::zeros(n, cols);
    for i in 0..rows {
        for k in 0..n {
            if i == k {
                l[(i, k)] = T::one();
            } else if i > k {
                l[(i, k)] = a[(i, k)].clone();
            }
        }
    }
    for i in 0..n {
        for j in i..cols {
            u[(i, j)] = a[(i, j)].clone();
        }
    }

    LuFactors { l, u, p }
}

/// Sparse left-looking LU decomposition with partial pivoting.
///
/// Every column of the returned `L` starts with its explicit unit diagonal,
/// and every column of `L` and `U` lists its rows in ascending order.
pub fn sparse_lu<T: Scalar>(a: &CscMatrix<T>) -> LuFactors<CscMatrix<T>> {
    let (rows, cols) = a.size();
    let n = rows.min(cols);

    let mut l: CscMatrix<T> = CscMatrix::with_rows(rows, a.nnz());
    let mut u: CscMatrix<T> = CscMatrix::with_rows(n, a.nnz());
    let mut perm = Permutation::identity(rows);
    let mut spa: Spa<T> = Spa::new(rows);

    for j in 0..cols {
        spa.clear();
        for (r, v) in a.col_entries(j) {
            spa.accumulate(perm.inverse()[r], v.clone());
        }

        if j > 0 {
            // Rows are visited in ascending order, so every contribution to
            // spa[k] is in place before column k of L is applied.
            while let Some((k, vkj)) = spa.next_up_to(j - 1) {
                for (i, lik) in l.col_entries(k) {
                    if i > k {
                        spa.accumulate(i, lik.mul(&vkj).neg());
                    }
                }
            }
            spa.restore();
        }

        let mut pivot_row = j;
        let mut pivot = T::zero();
        if j < rows {
            pivot = spa.get(j);
            spa.for_each(j + 1, rows - 1, |r, v| {
                if v.magnitude_gt(&pivot) {
                    pivot = v.clone();
                    pivot_row = r;
                }
            });

            if pivot_row != j {
                debug!(column = j, pivot_row, "sparse LU row swap");
                // Columns of U finished so far only reach row j - 1.
                l.swap_rows(j, pivot_row);
                spa.swap(j, pivot_row);
                perm.swap(j, pivot_row);
            }
            if pivot.is_zero() {
                debug!(column = j, "zero pivot, factorization is singular");
            }
            l.push_entry(j, T::one());
        }

        for (row, value) in spa.drain() {
            if row <= j {
                u.push_entry(row, value);
            } else {
                let multiplier = value.div(&pivot);
                if !multiplier.is_zero() {
                    l.push_entry(row, multiplier);
                }
            }
        }

        if j < rows {
            l.close_column();
        }
        u.close_column();

        trace!(column = j, l_nnz = l.nnz(), u_nnz = u.nnz(), "column factored");
    }

    LuFactors { l, u, p: perm }
}
