//! Error handling for BioSignal Studio
//!
//! Every failure in the synthesis and filtering pipeline is a deterministic
//! usage error, so the taxonomy is small and carries enough context to tell
//! the caller which argument was rejected.

use core::fmt;

/// Result type alias for BioSignal Studio operations
pub type BspResult<T> = Result<T, BspError>;

/// Error type shared by every pipeline stage
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BspError {
    /// A scalar argument is outside its valid domain
    InvalidParameter {
        /// Name of the offending argument
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Two series that must be index-aligned have different lengths
    ShapeMismatch {
        /// Length of the reference series (the time axis)
        expected: usize,
        /// Length of the series that did not match
        actual: usize,
    },

    /// A series is empty where at least one sample is required
    EmptyInput {
        /// Which input was empty
        what: &'static str,
    },
}

impl BspError {
    /// Shorthand for building an `InvalidParameter` error
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        BspError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for BspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BspError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter `{}`: {}", name, reason)
            }
            BspError::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected {} samples, got {}",
                       expected, actual)
            }
            BspError::EmptyInput { what } => {
                write!(f, "Empty input: {} must contain at least one sample", what)
            }
        }
    }
}

impl std::error::Error for BspError {}
