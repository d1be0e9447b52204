//! Best-effort JSON extraction from model replies.
//!
//! Replies that were asked for JSON still arrive wrapped in markdown fences
//! or explanatory prose often enough that strict parsing alone is useless.
//! Strategies, in order: a ```json fence, any fence, then the first balanced
//! object or array found by a string-aware bracket scan. Returns `None` when
//! nothing parseable is present; callers fall back to their documented
//! degraded shapes.

use regex::Regex;
use serde_json::Value;

/// Extracts the first parseable JSON document from free-form text.
pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();

    if let Some(json) = extract_from_fence(trimmed, Some("json")) {
        return Some(json);
    }
    if let Some(json) = extract_from_fence(trimmed, None) {
        return Some(json);
    }

    // Try whichever of '{' or '[' appears first, then the other.
    let mut candidates: Vec<(usize, char)> = Vec::new();
    if let Some(o) = trimmed.find('{') {
        candidates.push((o, '}'));
    }
    if let Some(a) = trimmed.find('[') {
        candidates.push((a, ']'));
    }
    candidates.sort_by_key(|(start, _)| *start);

    for (start, close) in candidates {
        let substr = &trimmed[start..];
        if let Some(end) = find_balanced(substr, close) {
            let candidate = &substr[..=end];
            if serde_json::from_str::<Value>(candidate).is_ok() {
                return Some(candidate.to_string());
            }
        }
    }

    None
}

/// Extracts valid JSON from a fenced block, optionally requiring a tag.
fn extract_from_fence(text: &str, tag: Option<&str>) -> Option<String> {
    let pattern = match tag {
        Some(tag) => format!(r"```{}\s*\n?([\s\S]*?)```", regex::escape(tag)),
        None => r"```(?:\w+)?\s*\n?([\s\S]*?)```".to_string(),
    };
    let re = Regex::new(&pattern).expect("valid regex");
    for caps in re.captures_iter(text) {
        let content = caps.get(1)?.as_str().trim();
        if serde_json::from_str::<Value>(content).is_ok() {
            return Some(content.to_string());
        }
    }
    None
}

/// Finds the index of the bracket closing the document that starts at byte 0,
/// tracking string literals and escapes so braces inside strings don't count.
fn find_balanced(s: &str, close: char) -> Option<usize> {
    let open = match close {
        '}' => '{',
        ']' => '[',
        _ => return None,
    };

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_object() {
        let input = r#"{"key": "value"}"#;
        assert_eq!(extract_json(input).as_deref(), Some(input));
    }

    #[test]
    fn test_direct_array() {
        let input = r#"[{"key": "value"}]"#;
        assert_eq!(extract_json(input).as_deref(), Some(input));
    }

    #[test]
    fn test_json_fence() {
        let input = "Here is the analysis:\n```json\n{\"message\": \"ok\"}\n```\nHope this helps!";
        assert_eq!(extract_json(input).as_deref(), Some(r#"{"message": "ok"}"#));
    }

    #[test]
    fn test_generic_fence() {
        let input = "```\n[1, 2, 3]\n```";
        assert_eq!(extract_json(input).as_deref(), Some("[1, 2, 3]"));
    }

    #[test]
    fn test_object_embedded_in_prose() {
        let input = r#"Sure: {"name": "test", "count": 5} - done."#;
        assert_eq!(
            extract_json(input).as_deref(),
            Some(r#"{"name": "test", "count": 5}"#)
        );
    }

    #[test]
    fn test_array_before_stray_brace() {
        let input = r#"list: [1, 2] and an unmatched { here"#;
        assert_eq!(extract_json(input).as_deref(), Some("[1, 2]"));
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let input = r#"{"braces": "{ not a brace }"}"#;
        assert_eq!(extract_json(input).as_deref(), Some(input));
    }

    #[test]
    fn test_plain_text_yields_none() {
        assert_eq!(extract_json("no structured content here"), None);
    }

    #[test]
    fn test_truncated_json_yields_none() {
        assert_eq!(extract_json(r#"{"key": "value"#), None);
    }
}
