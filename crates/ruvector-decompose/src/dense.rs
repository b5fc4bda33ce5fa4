//! Dense row-major matrix storage.
//!
//! [`DenseMatrix`] owns a flat buffer of `rows * cols` scalars. Decompositions
//! take it by value and mutate that buffer in place, so callers that need the
//! original must clone first.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::csc::CscMatrix;
use crate::csr::CsrMatrix;
use crate::error::{DecompError, ValidationError};
use crate::scalar::Scalar;

/// Dense matrix stored in row-major order.
///
/// # Layout
///
/// Entry `(i, j)` lives at `data[i * cols + j]`. Every row therefore has
/// exactly `cols` elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T> DenseMatrix<T> {
    /// Wrap a row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DimensionMismatch`] if
    /// `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, ValidationError> {
        if data.len() != rows * cols {
            return Err(ValidationError::DimensionMismatch(format!(
                "buffer of length {} cannot hold a {}x{} matrix",
                data.len(),
                rows,
                cols,
            )));
        }
        Ok(Self { data, rows, cols })
    }

    /// Build from a nested array literal, one `Vec` per row.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RaggedRows`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, ValidationError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(ValidationError::RaggedRows {
                    row: i,
                    expected: n_cols,
                    got: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            rows: n_rows,
            cols: n_cols,
        })
    }

    /// Build an `n x 1` column vector.
    pub fn column(values: Vec<T>) -> Self {
        let rows = values.len();
        Self {
            data: values,
            rows,
            cols: 1,
        }
    }

    /// Wrap a buffer whose length the caller has already established.
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Row-major view of the whole buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consume the matrix and return its row-major buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Borrow row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows`.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Swap rows `a` and `b` in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let cols = self.cols;
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.data.split_at_mut(hi * cols);
        head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
    }

    /// Apply `f` to every entry.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> DenseMatrix<U> {
        DenseMatrix {
            data: self.data.iter().map(f).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl<T: Clone> DenseMatrix<T> {
    /// Nested-row representation, the inverse of [`from_rows`](Self::from_rows).
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }

    /// `A^T`.
    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.data[i * self.cols + j].clone());
            }
        }
        Self {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }
}

impl<T: Scalar> DenseMatrix<T> {
    /// All-zero `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::zero(); rows * cols],
            rows,
            cols,
        }
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = T::one();
        }
        m
    }

    /// Clone of entry `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self[(i, j)].clone()
    }

    /// Overwrite entry `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self[(i, j)] = value;
    }

    /// Conjugate transpose `A^H`.
    pub fn conj_transpose(&self) -> Self {
        let mut t = self.transpose();
        for v in &mut t.data {
            *v = v.conj();
        }
        t
    }

    /// Matrix product `self * rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`DecompError::DimensionMismatch`] if `self.cols != rhs.rows`.
    pub fn matmul(&self, rhs: &Self) -> Result<Self, DecompError> {
        if self.cols != rhs.rows {
            return Err(DecompError::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols,
            )));
        }
        let mut out = Self::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = &self.data[i * self.cols + k];
                if a.is_zero() {
                    continue;
                }
                for j in 0..rhs.cols {
                    let idx = i * rhs.cols + j;
                    out.data[idx] = out.data[idx].add(&a.mul(&rhs.data[k * rhs.cols + j]));
                }
            }
        }
        Ok(out)
    }

    /// Compressed-column copy. Zero entries are not stored.
    pub fn to_csc(&self) -> CscMatrix<T> {
        let mut col_ptr = Vec::with_capacity(self.cols + 1);
        let mut row_indices = Vec::new();
        let mut values = Vec::new();
        col_ptr.push(0);
        for j in 0..self.cols {
            for i in 0..self.rows {
                let v = &self.data[i * self.cols + j];
                if !v.is_zero() {
                    row_indices.push(i);
                    values.push(v.clone());
                }
            }
            col_ptr.push(values.len());
        }
        CscMatrix {
            values,
            row_indices,
            col_ptr,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Compressed-row copy. Zero entries are not stored.
    pub fn to_csr(&self) -> CsrMatrix<T> {
        let mut row_ptr = Vec::with_capacity(self.rows + 1);
        let mut col_indices = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for i in 0..self.rows {
            for (j, v) in self.row(i).iter().enumerate() {
                if !v.is_zero() {
                    col_indices.push(j);
                    values.push(v.clone());
                }
            }
            row_ptr.push(values.len());
        }
        CsrMatrix {
            row_ptr,
            col_indices,
            values,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl<T> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols,
        );
        &self.data[i * self.cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for DenseMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols,
        );
        &mut self.data[i * self.cols + j]
    }
}
