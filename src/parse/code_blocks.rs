//! Fenced code block extraction and identifier heuristics.
//!
//! Model output does not reliably tag its fences, so extraction is
//! three-tiered: blocks tagged with the expected language, then any fenced
//! block, then the whole trimmed reply as a single entry. The class/method
//! scanners are deliberately regex-based heuristics kept behind this narrow
//! interface so they could be swapped for a real parser without touching
//! callers.

use regex::Regex;

/// Identifiers that match the method-declaration pattern but are not methods.
const RESERVED_WORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "constructor", "super", "new",
];

/// Extracts fenced code blocks from free-form text.
///
/// Tier 1: fences tagged with `lang`. Tier 2: fences with any or no tag.
/// Tier 3: the entire trimmed input as a single-element sequence. Fence
/// delimiters and language tags are stripped from every returned block.
pub fn extract_code_blocks(text: &str, lang: &str) -> Vec<String> {
    let tagged =
        Regex::new(&format!(r"```{}\s*\n?([\s\S]*?)```", regex::escape(lang))).expect("valid regex");
    let blocks: Vec<String> = tagged
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect();
    if !blocks.is_empty() {
        return blocks;
    }

    let generic = Regex::new(r"```(?:\w+)?\s*\n?([\s\S]*?)```").expect("valid regex");
    let blocks: Vec<String> = generic
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect();
    if !blocks.is_empty() {
        return blocks;
    }

    vec![text.trim().to_string()]
}

/// Finds the first class declaration in the text and returns its name.
pub fn extract_class_name(text: &str) -> Option<String> {
    let re = Regex::new(r"class\s+(\w+)").expect("valid regex");
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Scans for function/method declarations and returns their identifiers.
///
/// Matches `name(...)` followed by a return type annotation or a body, which
/// keeps call expressions out. Reserved words and duplicates are skipped;
/// unparseable signatures simply contribute nothing.
pub fn extract_method_names(text: &str) -> Vec<String> {
    let re = Regex::new(r"(?:async\s+)?(\w+)\s*\([^)]*\)\s*[:{]").expect("valid regex");
    let mut methods = Vec::new();
    for caps in re.captures_iter(text) {
        let Some(name) = caps.get(1) else { continue };
        let name = name.as_str();
        if RESERVED_WORDS.contains(&name) {
            continue;
        }
        if methods.iter().any(|m| m == name) {
            continue;
        }
        methods.push(name.to_string());
    }
    methods
}
