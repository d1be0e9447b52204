//! Core data model for test analysis and generation.
//!
//! These records are transient: they are built from one test run or one LLM
//! reply, handed back to the caller, and not persisted (page object source
//! code being the one exception, written out as a side effect of
//! generation).

use serde::{Deserialize, Serialize};

/// Outcome of a single test from a Playwright run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Test completed and all assertions held.
    Passed,
    /// Test completed with a failure.
    Failed,
    /// Test was skipped.
    Skipped,
    /// Test exceeded its time budget.
    Timedout,
}

impl TestStatus {
    /// Parses a Playwright status string. Unknown statuses map to `Failed`,
    /// matching how the report consumer treats anything it cannot classify.
    pub fn parse(s: &str) -> TestStatus {
        match s.to_lowercase().trim() {
            "passed" => TestStatus::Passed,
            "skipped" => TestStatus::Skipped,
            "timedout" => TestStatus::Timedout,
            _ => TestStatus::Failed,
        }
    }

    /// Returns the lowercase wire name for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
            TestStatus::Timedout => "timedout",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single test outcome from the latest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Test title as declared in the spec file.
    pub title: String,
    /// Outcome of the test.
    pub status: TestStatus,
    /// Error message, present for failed and timed-out tests.
    pub error: Option<String>,
    /// Path to a failure screenshot, when captured.
    pub screenshot: Option<String>,
    /// Wall-clock duration in milliseconds.
    pub duration: Option<u64>,
    /// Spec file the test belongs to.
    pub file: Option<String>,
}

impl TestResult {
    /// Returns true if this result represents a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, TestStatus::Failed | TestStatus::Timedout)
    }
}

/// A historically unreliable test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlakyTest {
    /// Test name.
    pub name: String,
    /// Spec file the test lives in.
    pub file: String,
    /// Recurring failure symptom (e.g. "Timeout waiting for element").
    pub failure_pattern: String,
    /// Test source, when available.
    pub code: Option<String>,
    /// Observed failure rate in [0, 1], when known.
    pub failure_rate: Option<f64>,
}

/// Category of an improvement suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    /// Faster execution, cheaper selectors.
    Performance,
    /// Stability: waits, retries, robust assertions.
    Reliability,
    /// Readability, structure, duplication.
    Maintainability,
    /// Missing scenarios.
    Coverage,
}

impl SuggestionType {
    /// Parses a suggestion type, tolerating model-supplied casing.
    pub fn parse(s: &str) -> Option<SuggestionType> {
        match s.to_lowercase().trim() {
            "performance" | "perf" => Some(SuggestionType::Performance),
            "reliability" | "stability" => Some(SuggestionType::Reliability),
            "maintainability" => Some(SuggestionType::Maintainability),
            "coverage" => Some(SuggestionType::Coverage),
            _ => None,
        }
    }

    /// Returns the lowercase wire name for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionType::Performance => "performance",
            SuggestionType::Reliability => "reliability",
            SuggestionType::Maintainability => "maintainability",
            SuggestionType::Coverage => "coverage",
        }
    }
}

impl std::fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority of an improvement suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Parses a priority, tolerating model-supplied casing.
    pub fn parse(s: &str) -> Option<Priority> {
        match s.to_lowercase().trim() {
            "low" => Some(Priority::Low),
            "medium" | "med" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    /// Returns the lowercase wire name for this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One actionable recommendation for one test file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Category of the suggestion.
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    /// Human-readable description of the improvement.
    pub description: String,
    /// File the suggestion applies to.
    pub file: String,
    /// Line number, when the suggestion targets a specific spot.
    pub line: Option<u32>,
    /// Suggested replacement code, when provided.
    pub code: Option<String>,
    /// Priority, defaults to medium during normalization.
    pub priority: Priority,
}

/// Aggregate outcome of analyzing one batch of failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Summary of the analysis.
    pub message: String,
    /// Actionable suggestions, in the order the model produced them.
    pub suggestions: Vec<String>,
    /// Identified root causes, when available.
    pub root_causes: Option<Vec<String>>,
    /// Titles of the tests the analysis covers, when available.
    pub affected_tests: Option<Vec<String>>,
    /// Model confidence in [0, 1], when reported.
    pub confidence: Option<f64>,
}

impl AnalysisResult {
    /// The canned result for a run with no failures.
    pub fn all_passing() -> Self {
        Self {
            message: "No test failures found!".to_string(),
            suggestions: vec!["All tests are passing. Great job!".to_string()],
            root_causes: None,
            affected_tests: None,
            confidence: None,
        }
    }
}

/// A remediation suggestion for one flaky test. Always produced one-per-input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixResult {
    /// Spec file containing the flaky test.
    pub test_file: String,
    /// The failure pattern being addressed.
    pub issue: String,
    /// Free-text suggested fix.
    pub suggested_fix: String,
    /// Confidence in [0, 1]; lowered (never omitted) on degraded results.
    pub confidence: f64,
}

/// A generated page object: source text plus parsed metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageObjectModel {
    /// Output file name, derived from the lower-cased class name.
    pub file_name: String,
    /// Name of the generated class.
    pub class_name: String,
    /// URL the page object targets.
    pub url: String,
    /// Full generated source text.
    pub code: String,
    /// Method names parsed from the source, in declaration order.
    pub methods: Vec<String>,
}

/// Reporting scaffolding emitted for a suite: a custom reporter, an HTML
/// report template, notification glue, and a dashboard snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEnhancement {
    /// Source of a Playwright reporter collecting per-test metrics.
    pub reporter_code: String,
    /// HTML report template with `{{metric}}` placeholders.
    pub html_template: String,
    /// Source of a class that mails run summaries.
    pub notification_code: String,
    /// Dashboard markup snippet.
    pub dashboard_code: String,
    /// Human-readable list of what the scaffolding provides.
    pub features: Vec<String>,
}

/// Category of a suggested helper class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelperCategory {
    /// General-purpose test utilities.
    Utils,
    /// Test data construction and persistence.
    Database,
}

impl HelperCategory {
    /// Returns the lowercase wire name for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            HelperCategory::Utils => "utils",
            HelperCategory::Database => "database",
        }
    }
}

impl std::fmt::Display for HelperCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A suggested helper class for a business domain, with companion tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperClassSuggestion {
    /// Name of the suggested class.
    pub class_name: String,
    /// What the class is for.
    pub description: String,
    /// Full TypeScript source of the class.
    pub code: String,
    /// Companion test source for the class.
    pub test_code: String,
    /// Where the class belongs in the suite.
    pub category: HelperCategory,
}

/// Pass/fail counts for one test run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SuiteSummary {
    /// Builds a summary by counting the given results.
    pub fn from_results(results: &[TestResult]) -> Self {
        let mut summary = SuiteSummary {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.status {
                TestStatus::Passed => summary.passed += 1,
                TestStatus::Skipped => summary.skipped += 1,
                TestStatus::Failed | TestStatus::Timedout => summary.failed += 1,
            }
        }
        summary
    }

    /// Pass rate as a whole percentage; zero for an empty run.
    pub fn pass_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.passed as f64 / self.total as f64) * 100.0).round() as u32
    }
}
