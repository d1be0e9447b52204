//! Remediation suggestions for flaky tests.
//!
//! One completion per flaky test, strictly in input order. The output is
//! always length-preserving: every input produces exactly one [`FixResult`],
//! with call failures reported as low-confidence fallback advice.

use std::sync::Arc;

use crate::config::AgentConfig;
use crate::llm::{extract_text, CompletionRequest, LlmProvider, Message};
use crate::model::{FixResult, FlakyTest};

/// Confidence assigned to a fix produced by the model.
const FIX_CONFIDENCE: f64 = 0.8;

/// Confidence assigned to the canned fallback advice.
const FALLBACK_CONFIDENCE: f64 = 0.3;

/// System prompt for flaky-test remediation.
const FIX_SYSTEM_PROMPT: &str = r#"You are an expert at fixing flaky Playwright tests.

Common flakiness causes include:
- Race conditions and missing waits
- Brittle selectors
- Test interdependence and shared state
- Network timing and animation timing

Provide a concrete, specific fix for the test you are given. Include code
where it helps. Respond in plain text."#;

/// User prompt template for one flaky test.
const FIX_USER_TEMPLATE: &str = r#"Fix this flaky Playwright test:

Test: {name}
File: {file}
Failure pattern: {failure_pattern}
Failure rate: {failure_rate}

Current code:
{code}

Explain the likely cause of the flakiness and give a corrected version."#;

/// Fallback advice used when the completion call fails.
const FALLBACK_ADVICE: &str =
    "Consider adding explicit waits and improving selectors.";

/// Produces one remediation suggestion per flaky test.
pub struct FlakyTestFixer {
    llm: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl FlakyTestFixer {
    /// Creates a new flaky-test fixer.
    pub fn new(llm: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self { llm, config }
    }

    /// Suggests a fix for each flaky test, in order. The returned vector has
    /// exactly one entry per input; a failed call yields fallback advice for
    /// that test and the loop continues.
    pub async fn fix_flaky_tests(&self, tests: &[FlakyTest]) -> Vec<FixResult> {
        let mut fixes = Vec::with_capacity(tests.len());

        for test in tests {
            let fix = match self.request_fix(test).await {
                Ok(suggested_fix) => FixResult {
                    test_file: test.file.clone(),
                    issue: test.failure_pattern.clone(),
                    suggested_fix,
                    confidence: FIX_CONFIDENCE,
                },
                Err(e) => {
                    tracing::warn!("Fix call failed for '{}': {}", test.name, e);
                    FixResult {
                        test_file: test.file.clone(),
                        issue: test.failure_pattern.clone(),
                        suggested_fix: format!("Error: {}. {}", e, FALLBACK_ADVICE),
                        confidence: FALLBACK_CONFIDENCE,
                    }
                }
            };
            fixes.push(fix);
        }

        fixes
    }

    /// Issues one completion for one flaky test.
    async fn request_fix(&self, test: &FlakyTest) -> Result<String, crate::error::LlmError> {
        let failure_rate = match test.failure_rate {
            Some(rate) => format!("{:.1}%", rate * 100.0),
            None => "Unknown".to_string(),
        };
        let code = test.code.as_deref().unwrap_or("Code not provided");

        let prompt = FIX_USER_TEMPLATE
            .replace("{name}", &test.name)
            .replace("{file}", &test.file)
            .replace("{failure_pattern}", &test.failure_pattern)
            .replace("{failure_rate}", &failure_rate)
            .replace("{code}", code);

        let request = CompletionRequest::new(
            &self.config.model,
            self.config.max_tokens,
            vec![Message::user(prompt)],
        )
        .with_system(FIX_SYSTEM_PROMPT);

        let envelope = self.llm.complete(request).await?;
        Ok(extract_text(&envelope))
    }
}
