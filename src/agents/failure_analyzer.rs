//! Failure analysis over a batch of failed tests.
//!
//! One batched prompt per analysis: all failure records are embedded in a
//! single request, and the reply is decoded into an [`AnalysisResult`] or
//! degraded deterministically when the model ignores the requested shape.
//! This operation never fails outward.

use std::sync::Arc;

use serde::Deserialize;

use crate::config::AgentConfig;
use crate::llm::{extract_text, CompletionRequest, LlmProvider, Message};
use crate::model::{AnalysisResult, TestResult};
use crate::parse::extract_json;

/// System prompt for failure analysis.
const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an expert test automation engineer analyzing Playwright test failures.

For the failures you are given, identify:
1. Common patterns across the failures
2. Likely root causes
3. Specific suggestions to fix each failure
4. Recommendations to prevent similar issues

You MUST respond with ONLY a JSON object in this exact format:
{
  "message": "Summary of the analysis",
  "rootCauses": ["cause1", "cause2"],
  "suggestions": ["suggestion1", "suggestion2"],
  "affectedTests": ["test1", "test2"],
  "confidence": 0.0
}

Do not include any text outside the JSON object."#;

/// User prompt template for failure analysis.
const ANALYSIS_USER_TEMPLATE: &str = r#"Analyze these Playwright test failures:

{failures}

Provide patterns, root causes, per-failure fixes, and prevention advice."#;

/// Wire shape requested from the model.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisReply {
    message: String,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    root_causes: Option<Vec<String>>,
    #[serde(default)]
    affected_tests: Option<Vec<String>>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Analyzes batches of failed tests via the completion API.
pub struct FailureAnalyzer {
    llm: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl FailureAnalyzer {
    /// Creates a new failure analyzer.
    pub fn new(llm: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self { llm, config }
    }

    /// Analyzes a batch of failures, returning a structurally valid result
    /// even when the call or the parse goes wrong.
    ///
    /// An empty batch short-circuits to the canned all-passing result; the
    /// caller is expected to filter beforehand, but an accidental empty call
    /// must not reach the API.
    pub async fn analyze_failures(&self, failures: &[TestResult]) -> AnalysisResult {
        if failures.is_empty() {
            return AnalysisResult::all_passing();
        }

        let prompt = self.build_analysis_prompt(failures);

        let request = CompletionRequest::new(
            &self.config.model,
            self.config.max_tokens,
            vec![Message::user(prompt)],
        )
        .with_system(ANALYSIS_SYSTEM_PROMPT)
        .with_temperature(0.3);

        let envelope = match self.llm.complete(request).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Failure analysis call failed: {}", e);
                return AnalysisResult {
                    message: format!("Analysis failed: {}", e),
                    suggestions: vec![
                        "Please check your API configuration and try again".to_string()
                    ],
                    root_causes: Some(vec!["API or configuration error".to_string()]),
                    affected_tests: Some(failures.iter().map(|f| f.title.clone()).collect()),
                    confidence: None,
                };
            }
        };

        let text = extract_text(&envelope);
        self.decode_or_default(&text, failures)
    }

    /// Renders the batched user prompt.
    fn build_analysis_prompt(&self, failures: &[TestResult]) -> String {
        let details: Vec<serde_json::Value> = failures
            .iter()
            .map(|f| {
                serde_json::json!({
                    "testName": f.title,
                    "error": f.error,
                    "screenshot": f.screenshot,
                    "duration": f.duration,
                    "file": f.file,
                })
            })
            .collect();

        let rendered = serde_json::to_string_pretty(&details)
            .unwrap_or_else(|_| format!("{} failures (serialization unavailable)", failures.len()));

        ANALYSIS_USER_TEMPLATE.replace("{failures}", &rendered)
    }

    /// Strict decode of the reply; falls back to the documented degraded
    /// record carrying the raw text so no information is dropped.
    fn decode_or_default(&self, text: &str, failures: &[TestResult]) -> AnalysisResult {
        let decoded = extract_json(text)
            .and_then(|json| serde_json::from_str::<AnalysisReply>(&json).ok());

        match decoded {
            Some(reply) => AnalysisResult {
                message: reply.message,
                suggestions: reply.suggestions,
                root_causes: reply.root_causes,
                affected_tests: reply.affected_tests,
                confidence: reply.confidence.map(|c| c.clamp(0.0, 1.0)),
            },
            None => {
                tracing::warn!("Analysis reply was not the requested JSON shape");
                AnalysisResult {
                    message: "Analysis completed, but response format was unexpected".to_string(),
                    suggestions: vec![text.to_string()],
                    root_causes: Some(vec!["Parse error occurred".to_string()]),
                    affected_tests: Some(failures.iter().map(|f| f.title.clone()).collect()),
                    confidence: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::MockLlmProvider;
    use crate::model::TestStatus;

    fn failure(title: &str, error: &str) -> TestResult {
        TestResult {
            title: title.to_string(),
            status: TestStatus::Failed,
            error: Some(error.to_string()),
            screenshot: None,
            duration: Some(10_000),
            file: Some("tests/specs/login.spec.ts".to_string()),
        }
    }

    fn analyzer(llm: MockLlmProvider) -> FailureAnalyzer {
        FailureAnalyzer::new(Arc::new(llm), AgentConfig::with_api_key("sk-test"))
    }

    #[tokio::test]
    async fn test_well_formed_reply_is_decoded() {
        let reply = r#"{
            "message": "Selector timeouts dominate",
            "rootCauses": ["slow page load"],
            "suggestions": ["add explicit waits"],
            "affectedTests": ["login shows error"],
            "confidence": 0.9
        }"#;
        let analyzer = analyzer(MockLlmProvider::replying(reply));

        let result = analyzer
            .analyze_failures(&[failure("login shows error", "Timeout 10000ms")])
            .await;

        assert_eq!(result.message, "Selector timeouts dominate");
        assert_eq!(result.suggestions, vec!["add explicit waits"]);
        assert_eq!(result.confidence, Some(0.9));
    }

    #[tokio::test]
    async fn test_reply_wrapped_in_fence_is_decoded() {
        let reply = "Here you go:\n```json\n{\"message\": \"ok\", \"suggestions\": []}\n```";
        let analyzer = analyzer(MockLlmProvider::replying(reply));

        let result = analyzer.analyze_failures(&[failure("t", "e")]).await;
        assert_eq!(result.message, "ok");
    }

    #[tokio::test]
    async fn test_unparseable_reply_degrades_without_losing_text() {
        let analyzer = analyzer(MockLlmProvider::replying(
            "The failures look timing-related, no JSON for you.",
        ));

        let result = analyzer
            .analyze_failures(&[failure("a", "x"), failure("b", "y")])
            .await;

        assert!(!result.message.is_empty());
        assert_eq!(
            result.suggestions,
            vec!["The failures look timing-related, no JSON for you.".to_string()]
        );
        assert_eq!(
            result.root_causes.as_deref(),
            Some(&["Parse error occurred".to_string()][..])
        );
        assert_eq!(
            result.affected_tests,
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[tokio::test]
    async fn test_call_failure_yields_degraded_result_with_root_causes() {
        let analyzer = analyzer(MockLlmProvider::failing("connection refused"));

        let result = analyzer.analyze_failures(&[failure("t", "e")]).await;

        assert!(result.message.contains("Analysis failed"));
        assert!(result
            .root_causes
            .as_ref()
            .is_some_and(|causes| !causes.is_empty()));
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits_without_calling_api() {
        let mock = MockLlmProvider::failing("should never be called");
        let analyzer = FailureAnalyzer::new(
            Arc::new(mock),
            AgentConfig::with_api_key("sk-test"),
        );

        let result = analyzer.analyze_failures(&[]).await;
        assert_eq!(result.message, "No test failures found!");
    }

    #[tokio::test]
    async fn test_prompt_embeds_failure_fields() {
        let mock = Arc::new(MockLlmProvider::replying(
            r#"{"message": "ok", "suggestions": []}"#,
        ));
        let analyzer =
            FailureAnalyzer::new(mock.clone(), AgentConfig::with_api_key("sk-test"));

        analyzer
            .analyze_failures(&[failure("login shows error", "Timeout 10000ms")])
            .await;

        let prompts = mock.prompts().join("\n");
        assert!(prompts.contains("login shows error"));
        assert!(prompts.contains("Timeout 10000ms"));
        assert!(prompts.contains("login.spec.ts"));
    }
}
