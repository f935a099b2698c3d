//! Error types for the analysis engine
//!
//! Core graph and metric computations never fail: they degrade to empty
//! results. Only caller-controlled contract violations and numerical
//! breakdowns surface as errors, and each has its own kind so callers can
//! tell "you passed bad input" apart from "the math could not be done".

use thiserror::Error;

/// Errors reported by statistics operations and configuration validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The caller violated an input contract (mismatched series lengths,
    /// ragged matrices, out-of-range configuration values).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not enough observations for the requested computation.
    #[error("Insufficient data: need at least {needed} observations, got {actual}")]
    InsufficientData { needed: usize, actual: usize },

    /// Deterministic numerical failure (singular or rank-deficient matrix,
    /// non-finite values). Retrying cannot change the outcome.
    #[error("Computation failed: {0}")]
    ComputationFailure(String),

    /// A configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self::ComputationFailure(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::InsufficientData { needed: 3, actual: 1 };
        assert_eq!(
            err.to_string(),
            "Insufficient data: need at least 3 observations, got 1"
        );
        assert!(AnalysisError::invalid("x")
            .to_string()
            .starts_with("Invalid input"));
    }
}
