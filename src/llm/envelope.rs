//! Response envelope decoding.
//!
//! The generative API's reply shape has varied across SDK versions, and
//! agents should not care. The envelope is decoded at the boundary as a
//! tagged union over the shapes we actually tolerate, and [`extract_text`]
//! reduces any of them to a plain string without ever failing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel returned when no text can be recovered from a response.
pub const EXTRACTION_FAILED_SENTINEL: &str = "Error: Could not extract text from AI response";

/// One content block inside a block-sequence response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// A plain text block.
    Text {
        /// The block's text payload.
        text: String,
    },
    /// Any block type we do not interpret (tool use, thinking, images).
    #[serde(other)]
    Other,
}

/// The set of response shapes the extractor tolerates, in decode order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    /// A structured reply carrying an ordered sequence of typed blocks.
    Blocks {
        /// Ordered content blocks.
        content: Vec<ContentBlock>,
    },
    /// The reply is already a bare string.
    Text(String),
    /// Anything else; kept verbatim so nothing is silently dropped.
    Unknown(Value),
}

/// Pulls plain text out of a response envelope.
///
/// Preference order: the first text-typed block, then a bare string, then
/// the whole value serialized to JSON. Never panics and never errors; if
/// serialization of an unknown value fails the fixed sentinel is returned.
pub fn extract_text(envelope: &ResponseEnvelope) -> String {
    match envelope {
        ResponseEnvelope::Blocks { content } => {
            for block in content {
                if let ContentBlock::Text { text } = block {
                    return text.clone();
                }
            }
            // A block sequence with no text block still has to produce
            // something usable.
            serde_json::to_string(content).unwrap_or_else(|_| EXTRACTION_FAILED_SENTINEL.to_string())
        }
        ResponseEnvelope::Text(text) => text.clone(),
        ResponseEnvelope::Unknown(value) => {
            serde_json::to_string(value).unwrap_or_else(|_| EXTRACTION_FAILED_SENTINEL.to_string())
        }
    }
}
