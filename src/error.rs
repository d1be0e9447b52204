//! Error types for testpilot operations.
//!
//! Defines error types for the two subsystems that are allowed to fail
//! loudly: the LLM client and agent construction. Everything downstream of
//! these converts failures into degraded-but-valid results instead of
//! propagating them.

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while assembling the agent configuration.
///
/// These are the only errors permitted to escape construction: a missing
/// credential must fail immediately rather than surface later as a degraded
/// analysis result.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required credential: {0} environment variable not set")]
    MissingCredential(String),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
