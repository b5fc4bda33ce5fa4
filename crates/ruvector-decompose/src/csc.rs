//! Compressed Sparse Column (CSC) storage.
//!
//! The decomposition engine's native sparse format. Sparse LU builds its `L`
//! and `U` factors here one column at a time, and the substitution solvers
//! walk columns in ascending row order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::csr::CsrMatrix;
use crate::dense::DenseMatrix;
use crate::error::ValidationError;
use crate::scalar::Scalar;
use crate::validation::validate_csc;

/// Compressed Sparse Column matrix.
///
/// # Layout
///
/// For a matrix with `n` columns and `nnz` stored entries:
/// - `col_ptr` has length `n + 1`
/// - `row_indices` and `values` each have length `nnz`
/// - Column `j` spans indices `col_ptr[j]..col_ptr[j+1]`
///
/// Rows within a column need not be sorted in general. Everything this crate
/// produces keeps them ascending, and the substitution solvers rely on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CscMatrix<T> {
    /// Stored values, grouped by column.
    pub values: Vec<T>,
    /// Row index of each stored value.
    pub row_indices: Vec<usize>,
    /// Column pointers: `col_ptr[j]` is the start of column `j` in
    /// `row_indices`/`values`.
    pub col_ptr: Vec<usize>,
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl<T> CscMatrix<T> {
    /// Assemble a CSC matrix from raw parts.
    ///
    /// # Errors
    ///
    /// Returns the first structural violation reported by
    /// [`validate_csc`](crate::validation::validate_csc).
    pub fn new(
        rows: usize,
        cols: usize,
        col_ptr: Vec<usize>,
        row_indices: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, ValidationError> {
        let m = Self {
            values,
            row_indices,
            col_ptr,
            rows,
            cols,
        };
        validate_csc(&m)?;
        Ok(m)
    }

    /// Empty matrix with `rows` rows and no columns yet, ready to be grown
    /// through [`push_entry`](Self::push_entry) /
    /// [`close_column`](Self::close_column).
    pub(crate) fn with_rows(rows: usize, nnz_hint: usize) -> Self {
        Self {
            values: Vec::with_capacity(nnz_hint),
            row_indices: Vec::with_capacity(nnz_hint),
            col_ptr: vec![0],
            rows,
            cols: 0,
        }
    }

    /// Append an entry to the column currently being built.
    #[inline]
    pub(crate) fn push_entry(&mut self, row: usize, value: T) {
        self.row_indices.push(row);
        self.values.push(value);
    }

    /// Seal the column currently being built.
    #[inline]
    pub(crate) fn close_column(&mut self) {
        self.col_ptr.push(self.values.len());
        self.cols += 1;
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

    /// Iterate over `(row_index, &value)` pairs of column `j`, in storage order.
    #[inline]
    pub fn col_entries(&self, j: usize) -> impl Iterator<Item = (usize, &T)> {
        let start = self.col_ptr[j];
        let end = self.col_ptr[j + 1];
        self.row_indices[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter())
    }

    /// `true` if every column lists its rows in strictly ascending order.
    pub fn has_sorted_indices(&self) -> bool {
        (0..self.cols).all(|j| {
            self.row_indices[self.col_ptr[j]..self.col_ptr[j + 1]]
                .windows(2)
                .all(|w| w[0] < w[1])
        })
    }

    /// Sort each column's entries by row index.
    pub fn sort_indices(&mut self) {
        for j in 0..self.cols {
            let start = self.col_ptr[j];
            let end = self.col_ptr[j + 1];
            let mut order: Vec<usize> = (start..end).collect();
            order.sort_by_key(|&k| self.row_indices[k]);
            if order.iter().enumerate().all(|(i, &k)| k == start + i) {
                continue;
            }
            // Apply the permutation by cycle-following so values never need
            // to be cloned.
            let mut placed = vec![false; order.len()];
            for first in 0..order.len() {
                if placed[first] {
                    continue;
                }
                let mut cur = first;
                loop {
                    placed[cur] = true;
                    let src = order[cur] - start;
                    if src == first {
                        break;
                    }
                    self.row_indices.swap(start + cur, start + src);
                    self.values.swap(start + cur, start + src);
                    cur = src;
                }
            }
        }
    }

    /// Exchange the labels of rows `a` and `b` in every column.
    ///
    /// Columns keep ascending row order if they had it: an entry whose label
    /// changes is shifted to its new sorted position within the column.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            let start = self.col_ptr[j];
            let end = self.col_ptr[j + 1];
            let mut pos_a = None;
            let mut pos_b = None;
            for k in start..end {
                if self.row_indices[k] == a {
                    pos_a = Some(k);
                } else if self.row_indices[k] == b {
                    pos_b = Some(k);
                }
            }
            match (pos_a, pos_b) {
                (Some(pa), Some(pb)) => self.values.swap(pa, pb),
                (Some(p), None) => {
                    self.row_indices[p] = b;
                    self.resettle(p, start, end);
                }
                (None, Some(p)) => {
                    self.row_indices[p] = a;
                    self.resettle(p, start, end);
                }
                (None, None) => {}
            }
        }
    }

    /// Move the entry at `pos` to its ordered place within `start..end`.
    fn resettle(&mut self, mut pos: usize, start: usize, end: usize) {
        while pos + 1 < end && self.row_indices[pos + 1] < self.row_indices[pos] {
            self.row_indices.swap(pos, pos + 1);
            self.values.swap(pos, pos + 1);
            pos += 1;
        }
        while pos > start && self.row_indices[pos - 1] > self.row_indices[pos] {
            self.row_indices.swap(pos, pos - 1);
            self.values.swap(pos, pos - 1);
            pos -= 1;
        }
    }

    /// Position of `(i, j)` in the storage arrays, if stored.
    fn find(&self, i: usize, j: usize) -> Option<usize> {
        let start = self.col_ptr[j];
        let end = self.col_ptr[j + 1];
        (start..end).find(|&k| self.row_indices[k] == i)
    }
}

impl<T: Scalar> CscMatrix<T> {
    /// All-zero `rows x cols` matrix (no stored entries).
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            values: Vec::new(),
            row_indices: Vec::new(),
            col_ptr: vec![0; cols + 1],
            rows,
            cols,
        }
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        Self {
            values: vec![T::one(); n],
            row_indices: (0..n).collect(),
            col_ptr: (0..=n).collect(),
            rows: n,
            cols: n,
        }
    }

    /// Build a CSC matrix from `(row, col, value)` triplets.
    ///
    /// Entries are sorted by `(col, row)`. Duplicate positions are summed and
    /// entries that end up zero are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IndexOutOfBounds`] for a triplet outside the
    /// declared shape.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        entries: impl IntoIterator<Item = (usize, usize, T)>,
    ) -> Result<Self, ValidationError> {
        let mut sorted: Vec<_> = entries.into_iter().collect();
        for &(r, c, _) in &sorted {
            if c >= cols {
                return Err(ValidationError::IndexOutOfBounds {
                    index: c,
                    line: r,
                    bound: cols,
                });
            }
            if r >= rows {
                return Err(ValidationError::IndexOutOfBounds {
                    index: r,
                    line: c,
                    bound: rows,
                });
            }
        }
        sorted.sort_by_key(|(r, c, _)| (*c, *r));

        let mut m = Self::with_rows(rows, sorted.len());
        let mut iter = sorted.into_iter().peekable();
        for j in 0..cols {
            while let Some((r, _, v)) = iter.next_if(|(_, c, _)| *c == j) {
                let mut acc = v;
                while let Some((_, _, dup)) = iter.next_if(|(r2, c2, _)| *r2 == r && *c2 == j) {
                    acc = acc.add(&dup);
                }
                if !acc.is_zero() {
                    m.push_entry(r, acc);
                }
            }
            m.close_column();
        }
        Ok(m)
    }

    /// Build an `n x 1` sparse column from dense values, dropping zeros.
    pub fn column(values: &[T]) -> Self {
        let mut m = Self::with_rows(values.len(), 0);
        for (i, v) in values.iter().enumerate() {
            if !v.is_zero() {
                m.push_entry(i, v.clone());
            }
        }
        m.close_column();
        m
    }

    /// Clone of entry `(i, j)`, or zero if not stored.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        self.find(i, j)
            .map_or_else(T::zero, |k| self.values[k].clone())
    }

    /// Write entry `(i, j)`.
    ///
    /// A new entry is inserted at its ordered position in the column; writing
    /// zero removes a stored entry.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        match self.find(i, j) {
            Some(k) if value.is_zero() => {
                self.row_indices.remove(k);
                self.values.remove(k);
                for p in &mut self.col_ptr[j + 1..] {
                    *p -= 1;
                }
            }
            Some(k) => self.values[k] = value,
            None if value.is_zero() => {}
            None => {
                let start = self.col_ptr[j];
                let end = self.col_ptr[j + 1];
                let k = start + self.row_indices[start..end].partition_point(|&r| r < i);
                self.row_indices.insert(k, i);
                self.values.insert(k, value);
                for p in &mut self.col_ptr[j + 1..] {
                    *p += 1;
                }
            }
        }
    }

    /// Apply `f` to every stored value. Results that are zero are dropped.
    pub fn map<F: FnMut(&T) -> T>(&self, mut f: F) -> Self {
        let mut m = Self::with_rows(self.rows, self.nnz());
        for j in 0..self.cols {
            for (i, v) in self.col_entries(j) {
                let mapped = f(v);
                if !mapped.is_zero() {
                    m.push_entry(i, mapped);
                }
            }
            m.close_column();
        }
        m
    }

    /// Sort every column and merge entries that share a row by summing
    /// them, the same reading [`to_dense`](Self::to_dense) gives duplicates.
    pub fn sum_duplicates(&mut self) {
        self.sort_indices();
        let nnz = self.nnz();
        let rows = std::mem::take(&mut self.row_indices);
        let values = std::mem::take(&mut self.values);
        let mut entries = rows.into_iter().zip(values);

        let mut col_ptr = Vec::with_capacity(self.cols + 1);
        col_ptr.push(0);
        for j in 0..self.cols {
            let len = self.col_ptr[j + 1] - self.col_ptr[j];
            let col_start = self.row_indices.len();
            for (r, v) in entries.by_ref().take(len) {
                let repeat =
                    self.row_indices.len() > col_start && self.row_indices.last() == Some(&r);
                if repeat {
                    if let Some(last) = self.values.last_mut() {
                        *last = last.add(&v);
                    }
                } else {
                    self.row_indices.push(r);
                    self.values.push(v);
                }
            }
            col_ptr.push(self.row_indices.len());
        }
        if self.row_indices.len() < nnz {
            debug!(merged = nnz - self.row_indices.len(), "summed duplicate CSC entries");
        }
        self.col_ptr = col_ptr;
    }

    /// Dense copy.
    pub fn to_dense(&self) -> DenseMatrix<T> {
        let mut d: DenseMatrix<T> = DenseMatrix::zeros(self.rows, self.cols);
        for j in 0..self.cols {
            for (i, v) in self.col_entries(j) {
                d[(i, j)] = d[(i, j)].add(v);
            }
        }
        d
    }

    /// `A^T`, again in CSC form.
    pub fn transpose(&self) -> Self {
        let t = self.to_csr();
        Self {
            values: t.values,
            row_indices: t.col_indices,
            col_ptr: t.row_ptr,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Compressed-row copy of the same matrix.
    ///
    /// Uses a two-pass counting sort in O(nnz + rows + cols); columns of the
    /// result are ascending within each row.
    pub fn to_csr(&self) -> CsrMatrix<T> {
        let nnz = self.nnz();
        let mut row_ptr = vec![0usize; self.rows + 1];
        for &r in &self.row_indices {
            row_ptr[r + 1] += 1;
        }
        for i in 1..=self.rows {
            row_ptr[i] += row_ptr[i - 1];
        }

        let mut col_indices = vec![0usize; nnz];
        let mut slots: Vec<Option<T>> = vec![None; nnz];
        let mut cursor = row_ptr.clone();
        for j in 0..self.cols {
            for (i, v) in self.col_entries(j) {
                let dest = cursor[i];
                col_indices[dest] = j;
                slots[dest] = Some(v.clone());
                cursor[i] += 1;
            }
        }

        CsrMatrix {
            row_ptr,
            col_indices,
            values: slots.into_iter().flatten().collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Dense values of an `n x 1` column.
    pub(crate) fn column_values(&self) -> Vec<T> {
        let mut out = vec![T::zero(); self.rows];
        if self.cols > 0 {
            for (i, v) in self.col_entries(0) {
                out[i] = out[i].add(v);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CscMatrix<f64> {
        // [ 4  0  1 ]
        // [ 0  5  0 ]
        // [ 2  0  6 ]
        CscMatrix::from_triplets(
            3,
            3,
            vec![
                (2, 0, 2.0),
                (0, 0, 4.0),
                (1, 1, 5.0),
                (0, 2, 1.0),
                (2, 2, 6.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn triplets_are_sorted_per_column() {
        let m = sample();
        assert_eq!(m.col_ptr, vec![0, 2, 3, 5]);
        assert_eq!(m.row_indices, vec![0, 2, 1, 0, 2]);
        assert!(m.has_sorted_indices());
    }

    #[test]
    fn duplicate_triplets_sum_and_cancellations_drop() {
        let m = CscMatrix::from_triplets(
            2,
            2,
            vec![(0, 0, 1.0), (0, 0, 2.0), (1, 1, 3.0), (1, 1, -3.0)],
        )
        .unwrap();
        assert_eq!(m.get(0, 0), 3.0);
        assert_eq!(m.nnz(), 1);
    }

    #[test]
    fn set_inserts_in_order_and_zero_removes() {
        let mut m = sample();
        m.set(1, 0, 7.0);
        assert_eq!(m.row_indices[..3], [0, 1, 2]);
        assert_eq!(m.get(1, 0), 7.0);
        m.set(0, 2, 0.0);
        assert_eq!(m.get(0, 2), 0.0);
        assert_eq!(m.nnz(), 5);
        assert!(m.has_sorted_indices());
    }

    #[test]
    fn swap_rows_keeps_columns_sorted() {
        let mut m = sample();
        m.swap_rows(0, 1);
        assert!(m.has_sorted_indices());
        assert_eq!(m.get(1, 0), 4.0);
        assert_eq!(m.get(0, 1), 5.0);
        assert_eq!(m.get(2, 0), 2.0);
        assert_eq!(m.get(1, 2), 1.0);
    }

    #[test]
    fn sort_indices_restores_order() {
        let mut m = CscMatrix {
            values: vec![3.0, 1.0, 2.0],
            row_indices: vec![2, 0, 1],
            col_ptr: vec![0, 3],
            rows: 3,
            cols: 1,
        };
        assert!(!m.has_sorted_indices());
        m.sort_indices();
        assert_eq!(m.row_indices, vec![0, 1, 2]);
        assert_eq!(m.values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn sum_duplicates_merges_repeated_rows() {
        // Column 0 holds row 0 twice, out of order; column 1 holds row 1 three times.
        let mut m = CscMatrix {
            values: vec![1.0, 5.0, 1.0, 1.0, 2.0, 3.0],
            row_indices: vec![0, 1, 0, 1, 1, 1],
            col_ptr: vec![0, 3, 6],
            rows: 2,
            cols: 2,
        };
        let dense = m.to_dense();
        m.sum_duplicates();
        assert_eq!(m.col_ptr, vec![0, 2, 3]);
        assert_eq!(m.row_indices, vec![0, 1, 1]);
        assert_eq!(m.values, vec![2.0, 5.0, 6.0]);
        assert!(m.has_sorted_indices());
        assert_eq!(m.to_dense(), dense);
    }

    #[test]
    fn out_of_bounds_triplet_rejected() {
        let err = CscMatrix::from_triplets(2, 2, vec![(2, 0, 1.0)]).unwrap_err();
        assert!(matches!(err, ValidationError::IndexOutOfBounds { index: 2, .. }));
    }
}
