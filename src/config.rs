//! Agent configuration.
//!
//! All runtime settings live in an [`AgentConfig`] value that is constructed
//! once at process start (from the environment and CLI flags) and passed down
//! to whichever component needs it. Components never reach into the
//! environment themselves.

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default Anthropic API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

/// Default model for all agent operations.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";

/// Default directory containing Playwright run artifacts.
pub const DEFAULT_RESULTS_PATH: &str = "test-results";

/// Default directory containing the test specs.
pub const DEFAULT_TEST_DIR: &str = "tests";

/// Default output directory for generated page objects.
pub const DEFAULT_PAGES_DIR: &str = "src/pages";

/// Configuration for the test automation agent.
///
/// Constructed once by the caller (see [`AgentConfig::from_env`]) and shared
/// by reference with the components that need it.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL for the Anthropic API.
    pub api_base: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier used for every completion request.
    pub model: String,
    /// Maximum output tokens per completion request.
    pub max_tokens: u32,
    /// HTTP timeout for completion requests, in seconds.
    pub timeout_secs: u64,
    /// Directory containing Playwright run artifacts (`results.json`).
    pub results_path: PathBuf,
    /// Directory containing test spec files.
    pub test_dir: PathBuf,
    /// Output directory for generated page object files.
    pub pages_dir: PathBuf,
}

impl AgentConfig {
    /// Creates a configuration from the environment.
    ///
    /// Reads:
    /// - `ANTHROPIC_API_KEY` (required)
    /// - `ANTHROPIC_API_BASE` (optional, defaults to the public endpoint)
    /// - `TESTPILOT_MODEL` (optional)
    /// - `TEST_RESULTS_PATH` (optional)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if `ANTHROPIC_API_KEY` is
    /// not set. This is the only failure mode that propagates out of agent
    /// construction.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ConfigError::MissingCredential("ANTHROPIC_API_KEY".to_string()))?;
        let api_base =
            env::var("ANTHROPIC_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let model = env::var("TESTPILOT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let results_path = env::var("TEST_RESULTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_RESULTS_PATH));

        Ok(Self {
            api_base,
            api_key,
            model,
            max_tokens: 2000,
            timeout_secs: 120,
            results_path,
            test_dir: PathBuf::from(DEFAULT_TEST_DIR),
            pages_dir: PathBuf::from(DEFAULT_PAGES_DIR),
        })
    }

    /// Creates a configuration with an explicit key and defaults elsewhere.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
            timeout_secs: 120,
            results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
            test_dir: PathBuf::from(DEFAULT_TEST_DIR),
            pages_dir: PathBuf::from(DEFAULT_PAGES_DIR),
        }
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum output tokens per request.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the directory containing Playwright run artifacts.
    pub fn with_results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = path.into();
        self
    }

    /// Sets the directory containing test spec files.
    pub fn with_test_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.test_dir = path.into();
        self
    }

    /// Sets the output directory for generated page objects.
    pub fn with_pages_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.pages_dir = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_api_key_defaults() {
        let config = AgentConfig::with_api_key("sk-test");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.test_dir, PathBuf::from("tests"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = AgentConfig::with_api_key("sk-test")
            .with_model("claude-3-5-haiku-latest")
            .with_max_tokens(500)
            .with_pages_dir("generated/pages");

        assert_eq!(config.model, "claude-3-5-haiku-latest");
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.pages_dir, PathBuf::from("generated/pages"));
    }
}
