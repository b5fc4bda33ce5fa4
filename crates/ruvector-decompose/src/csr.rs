//! Compressed Sparse Row (CSR) storage.
//!
//! Only forward substitution consumes this format directly; the engine
//! converts it to [`CscMatrix`] wherever a column view is required.

use serde::{Deserialize, Serialize};

use crate::csc::CscMatrix;
use crate::dense::DenseMatrix;
use crate::error::ValidationError;
use crate::scalar::Scalar;
use crate::validation::validate_csr;

/// Compressed Sparse Row (CSR) matrix.
///
/// # Layout
///
/// For a matrix with `m` rows and `nnz` stored entries:
/// - `row_ptr` has length `m + 1`
/// - `col_indices` and `values` each have length `nnz`
/// - Row `i` spans indices `row_ptr[i]..row_ptr[i+1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix<T> {
    /// Row pointers: `row_ptr[i]` is the start index in `col_indices`/`values`
    /// for row `i`.
    pub row_ptr: Vec<usize>,
    /// Column indices for each stored entry.
    pub col_indices: Vec<usize>,
    /// Values for each stored entry.
    pub values: Vec<T>,
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl<T> CsrMatrix<T> {
    /// Assemble a CSR matrix from raw parts.
    ///
    /// # Errors
    ///
    /// Returns the first structural violation reported by
    /// [`validate_csr`](crate::validation::validate_csr).
    pub fn new(
        rows: usize,
        cols: usize,
        row_ptr: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, ValidationError> {
        let m = Self {
            row_ptr,
            col_indices,
            values,
            rows,
            cols,
        };
        validate_csr(&m)?;
        Ok(m)
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
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

    /// Iterate over `(col_index, &value)` pairs for the given row.
    #[inline]
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, &T)> {
        let start = self.row_ptr[row];
        let end = self.row_ptr[row + 1];
        self.col_indices[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter())
    }

    /// `true` if every row lists its columns in strictly ascending order.
    pub fn has_sorted_indices(&self) -> bool {
        (0..self.rows).all(|i| {
            self.col_indices[self.row_ptr[i]..self.row_ptr[i + 1]]
                .windows(2)
                .all(|w| w[0] < w[1])
        })
    }
}

impl<T: Scalar> CsrMatrix<T> {
    /// Build a CSR matrix from COO (coordinate) triplets.
    ///
    /// Entries are sorted by (row, col) internally. Duplicate positions are
    /// summed and entries that cancel to zero are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IndexOutOfBounds`] for a triplet outside the
    /// declared shape.
    pub fn from_coo(
        rows: usize,
        cols: usize,
        entries: impl IntoIterator<Item = (usize, usize, T)>,
    ) -> Result<Self, ValidationError> {
        // Transposed triplets through the column builder give sorted rows.
        let t = CscMatrix::from_triplets(
            cols,
            rows,
            entries.into_iter().map(|(r, c, v)| (c, r, v)),
        )?;
        Ok(Self {
            row_ptr: t.col_ptr,
            col_indices: t.row_indices,
            values: t.values,
            rows,
            cols,
        })
    }

    /// Build a square identity matrix of dimension `n` in CSR format.
    pub fn identity(n: usize) -> Self {
        Self {
            row_ptr: (0..=n).collect(),
            col_indices: (0..n).collect(),
            values: vec![T::one(); n],
            rows: n,
            cols: n,
        }
    }

    /// Clone of entry `(i, j)`, or zero if not stored.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        self.row_entries(i)
            .find(|&(c, _)| c == j)
            .map_or_else(T::zero, |(_, v)| v.clone())
    }

    /// Write entry `(i, j)`; writing zero removes a stored entry.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        let start = self.row_ptr[i];
        let end = self.row_ptr[i + 1];
        let found = (start..end).find(|&k| self.col_indices[k] == j);
        match found {
            Some(k) if value.is_zero() => {
                self.col_indices.remove(k);
                self.values.remove(k);
                for p in &mut self.row_ptr[i + 1..] {
                    *p -= 1;
                }
            }
            Some(k) => self.values[k] = value,
            None if value.is_zero() => {}
            None => {
                let k = start + self.col_indices[start..end].partition_point(|&c| c < j);
                self.col_indices.insert(k, j);
                self.values.insert(k, value);
                for p in &mut self.row_ptr[i + 1..] {
                    *p += 1;
                }
            }
        }
    }

    /// Apply `f` to every stored value. Results that are zero are dropped.
    pub fn map<F: FnMut(&T) -> T>(&self, mut f: F) -> Self {
        let mut row_ptr = Vec::with_capacity(self.rows + 1);
        let mut col_indices = Vec::with_capacity(self.nnz());
        let mut values = Vec::with_capacity(self.nnz());
        row_ptr.push(0);
        for i in 0..self.rows {
            for (c, v) in self.row_entries(i) {
                let mapped = f(v);
                if !mapped.is_zero() {
                    col_indices.push(c);
                    values.push(mapped);
                }
            }
            row_ptr.push(values.len());
        }
        Self {
            row_ptr,
            col_indices,
            values,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Transpose: produces `A^T` in CSR form.
    pub fn transpose(&self) -> Self {
        let t = self.to_csc();
        Self {
            row_ptr: t.col_ptr,
            col_indices: t.row_indices,
            values: t.values,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Compressed-column copy of the same matrix.
    ///
    /// Uses a two-pass counting sort in O(nnz + rows + cols); rows of the
    /// result are ascending within each column.
    pub fn to_csc(&self) -> CscMatrix<T> {
        let nnz = self.nnz();

        // Pass 1: count entries per column.
        let mut col_ptr = vec![0usize; self.cols + 1];
        for &c in &self.col_indices {
            col_ptr[c + 1] += 1;
        }
        for j in 1..=self.cols {
            col_ptr[j] += col_ptr[j - 1];
        }

        // Pass 2: scatter entries into the column arrays.
        let mut row_indices = vec![0usize; nnz];
        let mut slots: Vec<Option<T>> = vec![None; nnz];
        let mut cursor = col_ptr.clone();
        for i in 0..self.rows {
            for (c, v) in self.row_entries(i) {
                let dest = cursor[c];
                row_indices[dest] = i;
                slots[dest] = Some(v.clone());
                cursor[c] += 1;
            }
        }

        CscMatrix {
            values: slots.into_iter().flatten().collect(),
            row_indices,
            col_ptr,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Dense copy.
    pub fn to_dense(&self) -> DenseMatrix<T> {
        let mut d: DenseMatrix<T> = DenseMatrix::zeros(self.rows, self.cols);
        for i in 0..self.rows {
            for (c, v) in self.row_entries(i) {
                d[(i, c)] = d[(i, c)].add(v);
            }
        }
        d
    }

    /// Dense values of an `n x 1` column.
    pub(crate) fn column_values(&self) -> Vec<T> {
        let mut out = vec![T::zero(); self.rows];
        for (i, slot) in out.iter_mut().enumerate() {
            for (_, v) in self.row_entries(i) {
                *slot = slot.add(v);
            }
        }
        out
    }
}
