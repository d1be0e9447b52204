//! Per-file improvement suggestions.
//!
//! Each test file is reviewed independently: missing files are skipped with
//! a warning, and any call or parse failure for one file degrades into a
//! single synthetic suggestion instead of aborting the batch.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tokio::fs;

use crate::config::AgentConfig;
use crate::llm::{extract_text, CompletionRequest, LlmProvider, Message};
use crate::model::{Priority, Suggestion, SuggestionType};
use crate::parse::extract_json;

/// Characters of raw reply preserved when a parse fails.
const RAW_REPLY_PREVIEW_LEN: usize = 100;

/// System prompt for test review.
const REVIEW_SYSTEM_PROMPT: &str = r#"You are an expert reviewer of Playwright TypeScript test suites.

Focus on:
- Test reliability and stability
- Performance optimizations
- Code maintainability
- Missing test coverage areas

You MUST respond with ONLY a JSON array in this exact format:
[{
  "type": "reliability",
  "description": "Description of the improvement",
  "line": 42,
  "code": "suggested code change",
  "priority": "medium"
}]

Do not include any text outside the JSON array."#;

/// User prompt template for test review.
const REVIEW_USER_TEMPLATE: &str = r#"Review this Playwright TypeScript test file and suggest improvements:

File: {file}
Content:
{content}"#;

/// One element of the array shape requested from the model. Every field
/// except the description is optional; normalization fills the gaps.
#[derive(Debug, Deserialize)]
struct SuggestionReply {
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
    line: Option<u32>,
    code: Option<String>,
    priority: Option<String>,
}

/// Reviews test files and produces normalized improvement suggestions.
pub struct ImprovementSuggester {
    llm: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl ImprovementSuggester {
    /// Creates a new improvement suggester.
    pub fn new(llm: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self { llm, config }
    }

    /// Reviews each file in input order. A file contributes zero suggestions
    /// only when it does not exist; call and parse failures degrade into one
    /// synthetic suggestion for that file and the loop continues.
    pub async fn suggest_improvements(&self, files: &[PathBuf]) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        for file in files {
            let display_path = file.display().to_string();

            let content = match fs::read_to_string(file).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!("File not found, skipping: {display_path}");
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Failed to read {display_path}: {e}");
                    suggestions.push(degraded_suggestion(
                        &display_path,
                        format!("Failed to analyze file: {}", e),
                        Priority::Low,
                    ));
                    continue;
                }
            };

            match self.review_file(&display_path, &content).await {
                Ok(mut file_suggestions) => suggestions.append(&mut file_suggestions),
                Err(e) => {
                    tracing::warn!("Review call failed for {display_path}: {e}");
                    suggestions.push(degraded_suggestion(
                        &display_path,
                        format!("Failed to analyze file: {}", e),
                        Priority::Low,
                    ));
                }
            }
        }

        suggestions
    }

    /// Issues one review call for a file and normalizes the reply.
    async fn review_file(
        &self,
        file: &str,
        content: &str,
    ) -> Result<Vec<Suggestion>, crate::error::LlmError> {
        let prompt = REVIEW_USER_TEMPLATE
            .replace("{file}", file)
            .replace("{content}", content);

        let request = CompletionRequest::new(
            &self.config.model,
            self.config.max_tokens,
            vec![Message::user(prompt)],
        )
        .with_system(REVIEW_SYSTEM_PROMPT)
        .with_temperature(0.3);

        let envelope = self.llm.complete(request).await?;
        let text = extract_text(&envelope);

        Ok(self.decode_or_default(&text, file))
    }

    /// Decodes the reply array, normalizing each element; a failed decode
    /// yields one suggestion carrying a truncated raw reply.
    fn decode_or_default(&self, text: &str, file: &str) -> Vec<Suggestion> {
        let decoded = extract_json(text)
            .and_then(|json| serde_json::from_str::<Vec<SuggestionReply>>(&json).ok());

        match decoded {
            Some(replies) => replies
                .into_iter()
                .map(|reply| normalize(reply, file))
                .collect(),
            None => {
                tracing::warn!("Review reply for {} was not the requested JSON array", file);
                vec![degraded_suggestion(
                    file,
                    format!(
                        "AI analysis completed but response format was unexpected: {}",
                        truncate(text, RAW_REPLY_PREVIEW_LEN)
                    ),
                    Priority::Medium,
                )]
            }
        }
    }
}

/// Applies the documented normalization defaults to one parsed element.
/// The file is always forced to the file under review, whatever the model
/// claimed.
fn normalize(reply: SuggestionReply, file: &str) -> Suggestion {
    Suggestion {
        kind: reply
            .kind
            .as_deref()
            .and_then(SuggestionType::parse)
            .unwrap_or(SuggestionType::Maintainability),
        description: reply
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "No description provided".to_string()),
        file: file.to_string(),
        line: reply.line,
        code: reply.code,
        priority: reply
            .priority
            .as_deref()
            .and_then(Priority::parse)
            .unwrap_or(Priority::Medium),
    }
}

/// Builds the synthetic maintainability suggestion used on degraded paths.
fn degraded_suggestion(file: &str, description: String, priority: Priority) -> Suggestion {
    Suggestion {
        kind: SuggestionType::Maintainability,
        description,
        file: file.to_string(),
        line: None,
        code: None,
        priority,
    }
}

/// Truncates on a character boundary, appending an ellipsis when cut.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}
