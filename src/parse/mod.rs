//! Lightweight parsers for free-form model output.

pub mod code_blocks;
pub mod json;

pub use code_blocks::{extract_class_name, extract_code_blocks, extract_method_names};
pub use json::extract_json;
