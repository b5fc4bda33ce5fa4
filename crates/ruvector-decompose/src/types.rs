//! Storage tags, the tagged matrix union and permutation vectors.
//!
//! [`Matrix`] is the value the engine dispatches on. Each variant owns one
//! concrete storage; the engine switches on [`StorageKind`] once at the API
//! boundary and then runs monomorphic code.

use serde::{Deserialize, Serialize};

use crate::csc::CscMatrix;
use crate::csr::CsrMatrix;
use crate::dense::DenseMatrix;
use crate::error::ValidationError;
use crate::scalar::Scalar;

// ---------------------------------------------------------------------------
// StorageKind
// ---------------------------------------------------------------------------

/// Storage format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKind {
    /// Row-major dense buffer.
    Dense,
    /// Compressed sparse column.
    Csc,
    /// Compressed sparse row.
    Csr,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Dense => write!(f, "dense"),
            StorageKind::Csc => write!(f, "csc"),
            StorageKind::Csr => write!(f, "csr"),
        }
    }
}

// ---------------------------------------------------------------------------
// MatrixStorage
// ---------------------------------------------------------------------------

/// Primitive element access shared by every storage format.
pub trait MatrixStorage<T> {
    /// Tag of the concrete storage.
    fn storage_kind(&self) -> StorageKind;

    /// `(rows, cols)`.
    fn size(&self) -> (usize, usize);

    /// Clone of entry `(i, j)`; zero when a sparse format does not store it.
    fn get(&self, i: usize, j: usize) -> T;

    /// Overwrite entry `(i, j)`.
    fn set(&mut self, i: usize, j: usize, value: T);

    /// Apply `f` to every stored entry, keeping the storage format.
    fn map(&self, f: &mut dyn FnMut(&T) -> T) -> Self
    where
        Self: Sized;
}

impl<T: Scalar> MatrixStorage<T> for DenseMatrix<T> {
    fn storage_kind(&self) -> StorageKind {
        StorageKind::Dense
    }
    fn size(&self) -> (usize, usize) {
        DenseMatrix::size(self)
    }
    fn get(&self, i: usize, j: usize) -> T {
        DenseMatrix::get(self, i, j)
    }
    fn set(&mut self, i: usize, j: usize, value: T) {
        DenseMatrix::set(self, i, j, value);
    }
    fn map(&self, f: &mut dyn FnMut(&T) -> T) -> Self {
        DenseMatrix::map(self, f)
    }
}

impl<T: Scalar> MatrixStorage<T> for CscMatrix<T> {
    fn storage_kind(&self) -> StorageKind {
        StorageKind::Csc
    }
    fn size(&self) -> (usize, usize) {
        CscMatrix::size(self)
    }
    fn get(&self, i: usize, j: usize) -> T {
        CscMatrix::get(self, i, j)
    }
    fn set(&mut self, i: usize, j: usize, value: T) {
        CscMatrix::set(self, i, j, value);
    }
    fn map(&self, f: &mut dyn FnMut(&T) -> T) -> Self {
        CscMatrix::map(self, f)
    }
}

impl<T: Scalar> MatrixStorage<T> for CsrMatrix<T> {
    fn storage_kind(&self) -> StorageKind {
        StorageKind::Csr
    }
    fn size(&self) -> (usize, usize) {
        CsrMatrix::size(self)
    }
    fn get(&self, i: usize, j: usize) -> T {
        CsrMatrix::get(self, i, j)
    }
    fn set(&mut self, i: usize, j: usize, value: T) {
        CsrMatrix::set(self, i, j, value);
    }
    fn map(&self, f: &mut dyn FnMut(&T) -> T) -> Self {
        CsrMatrix::map(self, f)
    }
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

/// A matrix in one of the supported storage formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Matrix<T> {
    Dense(DenseMatrix<T>),
    Csc(CscMatrix<T>),
    Csr(CsrMatrix<T>),
}

impl<T: Scalar> Matrix<T> {
    /// Build a matrix of the requested storage kind from dense data.
    ///
    /// This is the constructor table for storage formats: every kind is
    /// reachable from here without any registration step.
    pub fn from_dense(kind: StorageKind, dense: DenseMatrix<T>) -> Self {
        match kind {
            StorageKind::Dense => Matrix::Dense(dense),
            StorageKind::Csc => Matrix::Csc(dense.to_csc()),
            StorageKind::Csr => Matrix::Csr(dense.to_csr()),
        }
    }

    /// Re-encode in another storage kind. Converting to the current kind
    /// returns the matrix unchanged.
    pub fn convert(self, kind: StorageKind) -> Self {
        match (self, kind) {
            (m @ Matrix::Dense(_), StorageKind::Dense)
            | (m @ Matrix::Csc(_), StorageKind::Csc)
            | (m @ Matrix::Csr(_), StorageKind::Csr) => m,
            (Matrix::Csc(c), StorageKind::Csr) => Matrix::Csr(c.to_csr()),
            (Matrix::Csr(r), StorageKind::Csc) => Matrix::Csc(r.to_csc()),
            (m, kind) => Matrix::from_dense(kind, m.to_dense()),
        }
    }

    /// Dense copy regardless of the current storage.
    pub fn to_dense(&self) -> DenseMatrix<T> {
        match self {
            Matrix::Dense(d) => d.clone(),
            Matrix::Csc(c) => c.to_dense(),
            Matrix::Csr(r) => r.to_dense(),
        }
    }

    /// Values of an `n x 1` column, densified.
    ///
    /// Returns `None` if the matrix has more than one column.
    pub(crate) fn column_values(&self) -> Option<Vec<T>> {
        if self.size().1 != 1 {
            return None;
        }
        Some(match self {
            Matrix::Dense(d) => d.as_slice().to_vec(),
            Matrix::Csc(c) => c.column_values(),
            Matrix::Csr(r) => r.column_values(),
        })
    }
}

impl<T: Scalar> MatrixStorage<T> for Matrix<T> {
    fn storage_kind(&self) -> StorageKind {
        match self {
            Matrix::Dense(_) => StorageKind::Dense,
            Matrix::Csc(_) => StorageKind::Csc,
            Matrix::Csr(_) => StorageKind::Csr,
        }
    }

    fn size(&self) -> (usize, usize) {
        match self {
            Matrix::Dense(d) => d.size(),
            Matrix::Csc(c) => c.size(),
            Matrix::Csr(r) => r.size(),
        }
    }

    fn get(&self, i: usize, j: usize) -> T {
        match self {
            Matrix::Dense(d) => d.get(i, j),
            Matrix::Csc(c) => c.get(i, j),
            Matrix::Csr(r) => r.get(i, j),
        }
    }

    fn set(&mut self, i: usize, j: usize, value: T) {
        match self {
            Matrix::Dense(d) => d.set(i, j, value),
            Matrix::Csc(c) => c.set(i, j, value),
            Matrix::Csr(r) => r.set(i, j, value),
        }
    }

    fn map(&self, f: &mut dyn FnMut(&T) -> T) -> Self {
        match self {
            Matrix::Dense(d) => Matrix::Dense(d.map(f)),
            Matrix::Csc(c) => Matrix::Csc(c.map(f)),
            Matrix::Csr(r) => Matrix::Csr(r.map(f)),
        }
    }
}

impl<T> From<DenseMatrix<T>> for Matrix<T> {
    fn from(m: DenseMatrix<T>) -> Self {
        Matrix::Dense(m)
    }
}

impl<T> From<CscMatrix<T>> for Matrix<T> {
    fn from(m: CscMatrix<T>) -> Self {
        Matrix::Csc(m)
    }
}

impl<T> From<CsrMatrix<T>> for Matrix<T> {
    fn from(m: CsrMatrix<T>) -> Self {
        Matrix::Csr(m)
    }
}

// ---------------------------------------------------------------------------
// Permutation
// ---------------------------------------------------------------------------

/// Row permutation produced by pivoting.
///
/// `forward[i]` is the original row now sitting at position `i`;
/// `inverse[r]` is the current position of original row `r`. Both vectors are
/// kept in sync by every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permutation {
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    /// The identity on `[0, n)`.
    pub fn identity(n: usize) -> Self {
        Self {
            forward: (0..n).collect(),
            inverse: (0..n).collect(),
        }
    }

    /// Wrap a current-to-original mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotAPermutation`] if `forward` is not a
    /// bijection on `[0, forward.len())`.
    pub fn from_vec(forward: Vec<usize>) -> Result<Self, ValidationError> {
        let n = forward.len();
        let mut inverse = vec![usize::MAX; n];
        for (pos, &orig) in forward.iter().enumerate() {
            if orig >= n {
                return Err(ValidationError::NotAPermutation(format!(
                    "entry {orig} at position {pos} exceeds length {n}"
                )));
            }
            if inverse[orig] != usize::MAX {
                return Err(ValidationError::NotAPermutation(format!(
                    "row {orig} appears more than once"
                )));
            }
            inverse[orig] = pos;
        }
        Ok(Self { forward, inverse })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Exchange the rows at current positions `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.forward.swap(a, b);
        self.inverse[self.forward[a]] = a;
        self.inverse[self.forward[b]] = b;
    }

    /// Current position to original row.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.forward
    }

    /// Original row to current position.
    #[inline]
    pub fn inverse(&self) -> &[usize] {
        &self.inverse
    }

    /// Consume and return the current-to-original vector.
    pub fn into_vec(self) -> Vec<usize> {
        self.forward
    }

    /// `true` if no row has moved.
    pub fn is_identity(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &r)| i == r)
    }

    /// `out[i] = values[forward[i]]`: reorder a right-hand side so it lines
    /// up with the pivoted rows.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != self.len()`.
    pub fn permute_vec<T: Clone>(&self, values: &[T]) -> Vec<T> {
        assert_eq!(values.len(), self.len(), "permutation length mismatch");
        self.forward.iter().map(|&r| values[r].clone()).collect()
    }

    /// Row `i` of the result is row `forward[i]` of `m`.
    ///
    /// # Panics
    ///
    /// Panics if `m.rows() != self.len()`.
    pub fn permute_rows<T: Clone>(&self, m: &DenseMatrix<T>) -> DenseMatrix<T> {
        assert_eq!(m.rows(), self.len(), "permutation length mismatch");
        let mut data = Vec::with_capacity(m.rows() * m.cols());
        for &r in &self.forward {
            data.extend_from_slice(m.row(r));
        }
        DenseMatrix::from_parts(m.rows(), m.cols(), data)
    }
}
