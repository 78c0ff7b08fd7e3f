//! Built-in language definitions
//!
//! Each definition marks its foldable regions: braces are region 1,
//! block comments region 2, anything language specific starts at 3.

mod c;
mod markdown;
mod python;
mod rust;

use super::language::LanguageDefinition;
use crate::error::Result;

/// Fold region for `{ ... }` blocks
pub const BRACE_REGION: i16 = 1;
/// Fold region for block comments
pub const COMMENT_REGION: i16 = 2;

/// Get all built-in language definitions
pub fn all_languages() -> Vec<Result<LanguageDefinition>> {
    vec![
        rust::rust_language(),
        c::c_language(),
        python::python_language(),
        markdown::markdown_language(),
    ]
}

/// Build a `\b(word|word|...)\b` alternation
fn word_list(words: &[&str]) -> String {
    format!(r"\b({})\b", words.join("|"))
}
