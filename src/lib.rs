//! testpilot: AI-assisted maintenance for Playwright test suites.
//!
//! This library reads Playwright run artifacts and spec files, then uses the
//! Anthropic API to analyze failures, generate tests, review suites, suggest
//! flaky-test fixes, and generate page objects.

// Core modules
pub mod agents;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod model;
pub mod parse;
pub mod source;

// Re-export commonly used error types
pub use error::{ConfigError, LlmError};
