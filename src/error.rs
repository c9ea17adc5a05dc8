//! Error types for the CLT solver

use thiserror::Error;

/// Main error type for laminate analysis operations
#[derive(Error, Debug)]
pub enum CltError {
    #[error("Material '{0}' not found in database")]
    UnknownMaterial(String),

    #[error("Invalid stacking sequence: {0}")]
    InvalidSequence(String),

    #[error("Singular stiffness matrix - laminate stack is degenerate or empty")]
    SingularStiffness,

    #[error("Parameter '{name}' out of range ({value}): {reason}")]
    OutOfRangeParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },

    #[error("Tolerance study produced no valid samples out of {0} trials")]
    NoValidSamples(usize),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CltError {
    /// Shorthand for an out-of-range parameter error
    pub fn out_of_range(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self::OutOfRangeParameter {
            name,
            value,
            reason: reason.into(),
        }
    }
}

/// Result type for CLT operations
pub type CltResult<T> = Result<T, CltError>;
