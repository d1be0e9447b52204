//! Agents orchestrating prompt construction, completion calls, and
//! best-effort response parsing.
//!
//! Every agent follows one shape: render a fixed prompt template, issue one
//! completion per item (or one per batch for failure analysis), reduce the
//! reply to text, and decode-or-default into the typed result. Per-item
//! loops are strictly sequential and length-preserving.

pub mod error;
pub mod facade;
pub mod failure_analyzer;
pub mod flaky_fixer;
pub mod improvement_suggester;
pub mod page_object_generator;
pub mod scaffolding;
pub mod test_generator;

pub use error::{AgentError, AgentResult};
pub use facade::{TestAutomationAgent, TestDataSource};
pub use failure_analyzer::FailureAnalyzer;
pub use flaky_fixer::FlakyTestFixer;
pub use improvement_suggester::ImprovementSuggester;
pub use page_object_generator::PageObjectGenerator;
pub use test_generator::TestGenerator;
