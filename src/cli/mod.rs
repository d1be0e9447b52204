//! Command-line interface for testpilot.
//!
//! Provides commands for failure analysis, test generation, suite review,
//! flaky-test remediation, and page object generation.

mod commands;

pub use commands::{parse_cli, run, run_with_cli};
