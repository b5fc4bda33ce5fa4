//! Input validation for decomposition and substitution.
//!
//! Structural checks on compressed storage run eagerly, before any
//! elimination begins, so malformed input produces a [`ValidationError`]
//! (converted into [`DecompError::InvalidInput`] via `From`) instead of an
//! out-of-bounds panic deep inside a loop. Shape checks between operands
//! produce [`DecompError::DimensionMismatch`].

use crate::csc::CscMatrix;
use crate::csr::CsrMatrix;
use crate::error::{DecompError, ValidationError};

// ---------------------------------------------------------------------------
// Compressed storage validation
// ---------------------------------------------------------------------------

/// Validate the structural integrity of a CSC matrix.
///
/// Performs the following checks in order:
///
/// 1. `col_ptr` length equals `cols + 1`.
/// 2. `col_ptr` is monotonically non-decreasing.
/// 3. `col_ptr[0] == 0` and `col_ptr[cols] == nnz`.
/// 4. `row_indices` length equals `values` length.
/// 5. All row indices are less than `rows`.
/// 6. Row indices are strictly ascending within each column (emits a
///    [`tracing::warn`] if not, but does not error; duplicates are summed).
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first violation found.
pub fn validate_csc<T>(matrix: &CscMatrix<T>) -> Result<(), ValidationError> {
    validate_compressed(
        "col_ptr",
        &matrix.col_ptr,
        matrix.cols,
        &matrix.row_indices,
        matrix.rows,
        matrix.values.len(),
    )
}

/// Validate the structural integrity of a CSR matrix.
///
/// Same checks as [`validate_csc`] with the roles of rows and columns
/// exchanged.
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first violation found.
pub fn validate_csr<T>(matrix: &CsrMatrix<T>) -> Result<(), ValidationError> {
    validate_compressed(
        "row_ptr",
        &matrix.row_ptr,
        matrix.rows,
        &matrix.col_indices,
        matrix.cols,
        matrix.values.len(),
    )
}

/// Shared body of the CSC/CSR checks. `major` counts the compressed
/// dimension, `minor` bounds the stored indices.
fn validate_compressed(
    ptr_name: &str,
    ptr: &[usize],
    major: usize,
    indices: &[usize],
    minor: usize,
    nnz: usize,
) -> Result<(), ValidationError> {
    // 1. Pointer array length
    if ptr.len() != major + 1 {
        return Err(ValidationError::DimensionMismatch(format!(
            "{ptr_name} length {} does not equal {} + 1",
            ptr.len(),
            major,
        )));
    }

    // 2. Monotonicity
    for i in 1..ptr.len() {
        if ptr[i] < ptr[i - 1] {
            return Err(ValidationError::NonMonotonicPointers { position: i });
        }
    }

    // 3. Boundary values
    if ptr[0] != 0 {
        return Err(ValidationError::DimensionMismatch(format!(
            "{ptr_name}[0] = {} (expected 0)",
            ptr[0],
        )));
    }
    if ptr[major] != nnz {
        return Err(ValidationError::DimensionMismatch(format!(
            "values length {nnz} does not match {ptr_name}[{major}] = {}",
            ptr[major],
        )));
    }

    // 4. Index array length
    if indices.len() != nnz {
        return Err(ValidationError::DimensionMismatch(format!(
            "index array length {} does not match values length {nnz}",
            indices.len(),
        )));
    }

    // 5. Index bounds + 6. sorted check (warn only)
    for line in 0..major {
        let mut prev: Option<usize> = None;
        for &index in &indices[ptr[line]..ptr[line + 1]] {
            if index >= minor {
                return Err(ValidationError::IndexOutOfBounds {
                    index,
                    line,
                    bound: minor,
                });
            }
            if let Some(p) = prev {
                if index <= p {
                    tracing::warn!(
                        line,
                        "indices not strictly ascending ({index} follows {p}); \
                         solvers will sort a private copy and sum duplicates",
                    );
                }
            }
            prev = Some(index);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Operand shape checks
// ---------------------------------------------------------------------------

/// Require a square matrix.
///
/// # Errors
///
/// Returns [`DecompError::DimensionMismatch`] naming `operation`.
pub fn check_square(size: (usize, usize), operation: &str) -> Result<(), DecompError> {
    if size.0 != size.1 {
        return Err(DecompError::DimensionMismatch(format!(
            "{operation} requires a square matrix, got {}x{}",
            size.0, size.1,
        )));
    }
    Ok(())
}

/// Require a right-hand side of length `n`.
///
/// # Errors
///
/// Returns [`DecompError::DimensionMismatch`] if the lengths differ.
pub fn check_rhs(n: usize, rhs_len: usize) -> Result<(), DecompError> {
    if rhs_len != n {
        return Err(DecompError::DimensionMismatch(format!(
            "right-hand side has {rhs_len} entries, matrix has {n} rows",
        )));
    }
    Ok(())
}
