//! Error types for agent operations.
//!
//! Agents absorb failures at the narrowest scope and hand callers degraded
//! records instead of errors; this type exists for the seams where an error
//! still needs a name (data-source access, internal helpers).

use thiserror::Error;

/// Errors that can occur during agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Error from the LLM provider.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Error parsing an LLM response.
    #[error("Failed to parse LLM response: {0}")]
    ResponseParse(String),

    /// Error reading from the test data source.
    #[error("Data source error: {0}")]
    DataSource(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<crate::error::LlmError> for AgentError {
    fn from(err: crate::error::LlmError) -> Self {
        AgentError::Llm(err.to_string())
    }
}

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
