//! Playwright suite state read from disk.
//!
//! Results come from the `results.json` a reporter writes into the results
//! directory; spec files are discovered by walking the test directory. Unlike
//! the agents, these readers do fail outward: the facade decides what to do
//! when suite state is unavailable.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::fs;
use walkdir::WalkDir;

use crate::agents::error::{AgentError, AgentResult};
use crate::agents::TestDataSource;
use crate::model::{FlakyTest, TestResult, TestStatus};

/// Report file name expected inside the results directory.
const RESULTS_FILE: &str = "results.json";

/// Spec files read in full as generation exemplars.
const MAX_EXEMPLAR_FILES: usize = 3;

/// On-disk report shape: suites of tests, one entry per attempt.
#[derive(Debug, Deserialize)]
struct PlaywrightReport {
    #[serde(default)]
    suites: Vec<ReportSuite>,
    #[serde(default)]
    stats: Option<ReportStats>,
}

/// Run-level stats the reporter records alongside the suites.
#[derive(Debug, Deserialize)]
struct ReportStats {
    #[serde(rename = "startTime", default)]
    start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ReportSuite {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    tests: Vec<ReportTest>,
}

#[derive(Debug, Deserialize)]
struct ReportTest {
    title: String,
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    screenshot: Option<String>,
    #[serde(default)]
    duration: Option<u64>,
    #[serde(default)]
    file: Option<String>,
}

/// Reads suite state from a Playwright project on disk.
pub struct PlaywrightDataSource {
    results_path: PathBuf,
    test_dir: PathBuf,
}

impl PlaywrightDataSource {
    /// Creates a data source rooted at the given directories.
    pub fn new(results_path: PathBuf, test_dir: PathBuf) -> Self {
        Self {
            results_path,
            test_dir,
        }
    }

    /// Reads and parses the report file.
    async fn read_report(&self) -> AgentResult<PlaywrightReport> {
        let path = self.results_path.join(RESULTS_FILE);
        let raw = fs::read_to_string(&path).await.map_err(|e| {
            AgentError::DataSource(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| AgentError::DataSource(format!("malformed {}: {}", path.display(), e)))
    }

    /// Start time the reporter recorded for the latest run, when present.
    pub async fn run_started_at(&self) -> AgentResult<Option<DateTime<Utc>>> {
        Ok(self
            .read_report()
            .await?
            .stats
            .and_then(|stats| stats.start_time))
    }

    /// Walks the test directory for spec files, in path order.
    fn spec_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.test_dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_spec_file(path))
            .collect();
        files.sort();
        files
    }
}

/// Matches Playwright's default spec naming.
fn is_spec_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".spec.ts") || name.ends_with(".test.ts"))
}

/// Flattens a report into per-attempt results, filling each test's file from
/// its suite when the test carries none.
fn flatten(report: PlaywrightReport) -> Vec<TestResult> {
    report
        .suites
        .into_iter()
        .flat_map(|suite| {
            let suite_file = suite.file;
            suite
                .tests
                .into_iter()
                .map(move |test| TestResult {
                    title: test.title,
                    status: TestStatus::parse(&test.status),
                    error: test.error,
                    screenshot: test.screenshot,
                    duration: test.duration,
                    file: test.file.or_else(|| suite_file.clone()),
                })
        })
        .collect()
}

/// Groups attempts by title and keeps the titles with mixed outcomes.
fn detect_flaky(results: &[TestResult]) -> Vec<FlakyTest> {
    let mut by_title: BTreeMap<&str, Vec<&TestResult>> = BTreeMap::new();
    for result in results {
        by_title.entry(&result.title).or_default().push(result);
    }

    by_title
        .into_iter()
        .filter_map(|(title, attempts)| {
            let total = attempts.len();
            let failed = attempts.iter().filter(|a| a.is_failure()).count();
            if failed == 0 || failed == total {
                return None;
            }

            let failure_pattern = attempts
                .iter()
                .find_map(|a| a.error.clone())
                .unwrap_or_else(|| "Intermittent failure".to_string());
            let file = attempts
                .iter()
                .find_map(|a| a.file.clone())
                .unwrap_or_default();

            Some(FlakyTest {
                name: title.to_string(),
                file,
                failure_pattern,
                code: None,
                failure_rate: Some(failed as f64 / total as f64),
            })
        })
        .collect()
}

#[async_trait]
impl TestDataSource for PlaywrightDataSource {
    async fn latest_test_results(&self) -> AgentResult<Vec<TestResult>> {
        Ok(flatten(self.read_report().await?))
    }

    async fn existing_tests(&self) -> AgentResult<Vec<String>> {
        let mut tests = Vec::new();
        for path in self.spec_files().into_iter().take(MAX_EXEMPLAR_FILES) {
            match fs::read_to_string(&path).await {
                Ok(content) => tests.push(content),
                Err(e) => tracing::warn!("Could not read {}: {}", path.display(), e),
            }
        }
        Ok(tests)
    }

    async fn all_test_files(&self) -> AgentResult<Vec<PathBuf>> {
        Ok(self.spec_files())
    }

    async fn flaky_tests(&self) -> AgentResult<Vec<FlakyTest>> {
        let results = self.latest_test_results().await?;
        Ok(detect_flaky(&results))
    }
}
