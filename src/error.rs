//! Error types for spsolve

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using spsolve's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in spsolve operations
///
/// Variants fall into three groups: usage errors (malformed input, detected
/// before any numerical work), singularity failures raised by the
/// factorization, and wrappers that attach batch context to either.
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Wrong number of dimensions for an operand
    #[error("Invalid dimension count for '{arg}': expected {expected}, got {got}")]
    InvalidDimension {
        /// The operand name
        arg: &'static str,
        /// Expected number of dimensions
        expected: usize,
        /// Actual number of dimensions
        got: usize,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// DType mismatch between operands
    #[error("DType mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// Left-hand side dtype
        lhs: DType,
        /// Right-hand side dtype
        rhs: DType,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: i64,
        /// Size of the dimension
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Duplicate coordinate entry rejected by the COO converter
    #[error("Duplicate entry at ({row}, {col})")]
    DuplicateEntry {
        /// Row of the duplicated entry
        row: usize,
        /// Column of the duplicated entry
        col: usize,
    },

    /// No row/column permutation avoids a zero pivot
    #[error("Structurally singular matrix (structural rank {rank}{})", column_suffix(.column))]
    StructurallySingular {
        /// Column where elimination ran out of candidate rows, if known
        column: Option<usize>,
        /// Structural rank (size of the maximum matching), if computed
        rank: usize,
    },

    /// Pivot below the stability threshold during factorization
    #[error("Numerically singular matrix: pivot {pivot:e} in column {column}")]
    NumericallySingular {
        /// Column being eliminated
        column: usize,
        /// Magnitude of the best available pivot
        pivot: f64,
    },

    /// Symbolic analysis applied to a matrix with a different sparsity pattern
    #[error("Sparsity pattern mismatch: {reason}")]
    PatternMismatch {
        /// Description of the mismatch
        reason: String,
    },

    /// Failure of one element of a batched call
    #[error("Batch element {index} failed: {source}")]
    BatchElement {
        /// Batch index of the failing element
        index: usize,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },

    /// Saved forward state was already consumed by a previous backward pass
    #[error("Saved state for '{op}' was already released by a previous backward pass")]
    SavedStateReleased {
        /// The operation name
        op: &'static str,
    },

    /// Missing gradient in backward pass
    #[error("Missing gradient for tensor")]
    MissingGradient,

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn column_suffix(column: &Option<usize>) -> String {
    column
        .map(|c| format!(", no pivot candidate in column {c}"))
        .unwrap_or_default()
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Attach a batch index to an error
    pub fn in_batch(self, index: usize) -> Self {
        Self::BatchElement {
            index,
            source: Box::new(self),
        }
    }

    /// Strip batch wrappers and return the underlying error
    pub fn root(&self) -> &Error {
        match self {
            Self::BatchElement { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns true for malformed-input errors detected before numerical work
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self.root(),
            Self::ShapeMismatch { .. }
                | Self::InvalidDimension { .. }
                | Self::UnsupportedDType { .. }
                | Self::DTypeMismatch { .. }
                | Self::IndexOutOfBounds { .. }
                | Self::InvalidArgument { .. }
                | Self::DuplicateEntry { .. }
                | Self::SavedStateReleased { .. }
        )
    }

    /// Returns true for structural or numerical singularity
    pub fn is_singular(&self) -> bool {
        matches!(
            self.root(),
            Self::StructurallySingular { .. } | Self::NumericallySingular { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_looks_through_batch() {
        let err = Error::NumericallySingular {
            column: 2,
            pivot: 0.0,
        }
        .in_batch(3);

        assert!(err.is_singular());
        assert!(!err.is_usage_error());
        assert!(matches!(err, Error::BatchElement { index: 3, .. }));
    }

    #[test]
    fn test_usage_error() {
        let err = Error::invalid_argument("A", "expected a sparse tensor");
        assert!(err.is_usage_error());
        assert!(!err.is_singular());
        assert_eq!(
            err.to_string(),
            "Invalid argument 'A': expected a sparse tensor"
        );
    }

    #[test]
    fn test_structural_message() {
        let err = Error::StructurallySingular {
            column: Some(1),
            rank: 2,
        };
        assert_eq!(
            err.to_string(),
            "Structurally singular matrix (structural rank 2, no pivot candidate in column 1)"
        );

        let err = Error::StructurallySingular {
            column: None,
            rank: 2,
        };
        assert_eq!(err.to_string(), "Structurally singular matrix (structural rank 2)");
    }
}
