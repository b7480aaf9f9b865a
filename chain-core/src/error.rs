//! Error types for chain-core.

use thiserror::Error;

/// Result type alias using chain-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or searching inference chains.
///
/// None of these cross the [`InferenceEngine::infer`](crate::InferenceEngine::infer)
/// boundary: the engine converts them into failed results.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller input was rejected (e.g. a blank premise)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A rule template was malformed and cannot produce a step
    #[error("Invalid template '{pattern_id}': {reason}")]
    InvalidTemplate { pattern_id: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Strict time budget exceeded during exploration
    #[error("Inference exceeded time budget of {budget_ms}ms")]
    Timeout { budget_ms: u64 },

    /// Circuit breaker is open
    #[error("Circuit breaker active after {failures} consecutive failures")]
    CircuitOpen { failures: u32 },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid template error.
    pub fn invalid_template(pattern_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            pattern_id: pattern_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a timeout error.
    pub fn timeout(budget_ms: u64) -> Self {
        Self::Timeout { budget_ms }
    }

    /// Create a circuit-open error.
    pub fn circuit_open(failures: u32) -> Self {
        Self::CircuitOpen { failures }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
