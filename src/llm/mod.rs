//! LLM integration for testpilot.
//!
//! Provides the completion client used by every agent and the response
//! envelope decoding that isolates agents from the exact wire shape of the
//! generative API.

pub mod client;
pub mod envelope;

pub use client::{AnthropicClient, CompletionRequest, LlmProvider, Message};
pub use envelope::{extract_text, ContentBlock, ResponseEnvelope, EXTRACTION_FAILED_SENTINEL};
