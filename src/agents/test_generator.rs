//! Test generation from natural-language requirements.
//!
//! Up to three existing specs are embedded in the prompt as style exemplars
//! so generated tests match the suite's conventions. A failed call produces
//! a single commented stub so the caller always gets something to review.

use std::sync::Arc;

use crate::config::AgentConfig;
use crate::llm::{extract_text, CompletionRequest, LlmProvider, Message};
use crate::parse::extract_code_blocks;

/// Existing specs embedded in the prompt as style exemplars.
const MAX_EXEMPLARS: usize = 3;

/// System prompt for test generation.
const GENERATION_SYSTEM_PROMPT: &str = r#"You are an expert at writing Playwright tests in TypeScript.

Write complete, runnable test files that:
- Import from '@playwright/test'
- Use descriptive test titles
- Use web-first assertions (expect with auto-waiting)
- Avoid hard-coded sleeps
- Follow the conventions of the example tests when provided

Respond with one or more TypeScript code blocks, one per test file."#;

/// User prompt template for test generation.
const GENERATION_USER_TEMPLATE: &str = r#"Generate Playwright tests for these requirements:

{requirements}

{exemplars}"#;

/// Generates Playwright test sources from requirements text.
pub struct TestGenerator {
    llm: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl TestGenerator {
    /// Creates a new test generator.
    pub fn new(llm: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self { llm, config }
    }

    /// Generates test sources for the requirements, styled after up to three
    /// of the given existing tests. A failed call yields a single commented
    /// stub rather than an error.
    pub async fn generate_from_requirements(
        &self,
        requirements: &str,
        existing_tests: &[String],
    ) -> Vec<String> {
        let exemplars = render_exemplars(existing_tests);
        let prompt = GENERATION_USER_TEMPLATE
            .replace("{requirements}", requirements)
            .replace("{exemplars}", &exemplars);

        let request = CompletionRequest::new(
            &self.config.model,
            self.config.max_tokens,
            vec![Message::user(prompt)],
        )
        .with_system(GENERATION_SYSTEM_PROMPT);

        match self.llm.complete(request).await {
            Ok(envelope) => {
                let text = extract_text(&envelope);
                extract_code_blocks(&text, "typescript")
            }
            Err(e) => {
                tracing::warn!("Test generation call failed: {}", e);
                vec![fallback_stub(requirements, &e.to_string())]
            }
        }
    }
}

/// Renders the exemplar section of the prompt; empty input yields an
/// explicit "no examples" line so the template has no dangling header.
fn render_exemplars(existing_tests: &[String]) -> String {
    if existing_tests.is_empty() {
        return "No existing tests are available as examples.".to_string();
    }

    let examples = existing_tests
        .iter()
        .take(MAX_EXEMPLARS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n---\n");

    format!(
        "Use these existing tests as style examples:\n\n{}",
        examples
    )
}

/// The commented stub returned when the completion call fails.
fn fallback_stub(requirements: &str, error: &str) -> String {
    format!(
        r#"import {{ test, expect }} from '@playwright/test';

// Test generation failed: {error}
// Requirements: {requirements}
test('generated test placeholder', async ({{ page }}) => {{
  // TODO: implement test for the requirements above
  test.fixme();
}});
"#,
        error = error,
        requirements = requirements,
    )
}
