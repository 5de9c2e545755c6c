//! Error types for the anofox-ensemble library.

use thiserror::Error;

/// Result type alias for ensemble operations.
pub type Result<T> = std::result::Result<T, EnsembleError>;

/// Errors that can occur while combining or scoring ensemble predictions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnsembleError {
    /// The ensemble stack has no members.
    #[error("empty ensemble stack")]
    EmptyStack,

    /// A stack member does not share the shape of member 0.
    #[error("shape mismatch at member {member}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        member: usize,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Weight array is not broadcastable against the stack.
    #[error("weight shape mismatch: expected leading dimension {expected_members} with rank 1 or 3, got shape {got:?}")]
    WeightShapeMismatch {
        expected_members: usize,
        got: Vec<usize>,
    },

    /// A vote input holds a value outside the discrete label set.
    #[error("non-discrete value {value} in member {member}")]
    NonDiscreteInput { member: usize, value: f64 },

    /// Input collection is empty.
    #[error("empty input data")]
    EmptyData,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Computation error (e.g., a predictor failed).
    #[error("computation error: {0}")]
    ComputationError(String),
}
