//! Error types for the decomposition engine.
//!
//! Every failure is a deterministic function of the input: nothing is retried
//! internally. All errors implement `std::error::Error` via `thiserror`.

use crate::types::StorageKind;

/// Primary error type for decomposition and substitution operations.
#[derive(Debug, thiserror::Error)]
pub enum DecompError {
    /// Operand shapes are incompatible (matrix vs. vector, matrix vs. matrix).
    ///
    /// Raised before any computation begins.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A diagonal entry needed as a divisor during substitution is zero.
    ///
    /// Decompositions never raise this; only the solves that consume them do.
    #[error("linear system cannot be solved since matrix is singular (zero pivot at index {index})")]
    Singular {
        /// Pivot index whose diagonal entry is the additive identity.
        index: usize,
    },

    /// A post-condition of an algorithm does not hold. This indicates a
    /// defect in the arithmetic, not a property of the input.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// The operation has no implementation for the given storage format.
    #[error("unsupported storage format `{kind}` for {operation}")]
    UnsupportedStorage {
        /// Storage tag of the offending operand.
        kind: StorageKind,
        /// Operation that rejected it.
        operation: &'static str,
    },

    /// The caller supplied structurally invalid storage.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
}

/// Structural validation errors for matrix storage and permutations.
///
/// These are raised eagerly, at construction time or at the engine boundary,
/// so that callers get clear diagnostics rather than out-of-bounds panics deep
/// inside an elimination loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Buffer lengths are inconsistent with the declared shape.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A stored index exceeds its bound.
    #[error("index {index} out of bounds for {bound} (in line {line})")]
    IndexOutOfBounds {
        /// Offending index.
        index: usize,
        /// Column (CSC) or row (CSR) holding the entry.
        line: usize,
        /// Exclusive upper bound.
        bound: usize,
    },

    /// A compressed pointer array decreases.
    #[error("pointer array is not monotonically non-decreasing at position {position}")]
    NonMonotonicPointers {
        /// Position where the violation was detected.
        position: usize,
    },

    /// A row of a nested dense literal has the wrong length.
    #[error("row {row} has {got} elements, expected {expected}")]
    RaggedRows {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        got: usize,
    },

    /// A permutation vector is not a bijection on `[0, n)`.
    #[error("not a permutation: {0}")]
    NotAPermutation(String),
}
