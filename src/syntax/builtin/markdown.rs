//! Markdown language definition

use crate::error::Result;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{MultilineRule, PatternRule};
use crate::syntax::tokens::TokenType;

/// Fold region for fenced code blocks
pub const FENCE_REGION: i16 = 3;

/// Create Markdown language definition
pub fn markdown_language() -> Result<LanguageDefinition> {
    let mut lang = LanguageDefinition::new("Markdown");
    for ext in ["md", "markdown", "mkd"] {
        lang.add_extension(ext);
    }

    // A fence closes on a line starting with the same run of ` or ~
    lang.add_multiline(
        MultilineRule::dynamic("fence", r"^\s*(`{3,}|~{3,})", r"^\s*%1\s*$", TokenType::String, 1)?
            .with_fold(FENCE_REGION),
    );

    lang.add_pattern(PatternRule::new("header", r"^#{1,6}\s+.*$", TokenType::Heading, 100)?);
    lang.add_pattern(PatternRule::new("bold", r"\*\*[^*]+\*\*|__[^_]+__", TokenType::Type, 90)?);
    lang.add_pattern(PatternRule::new("inline_code", r"`[^`]+`", TokenType::String, 88)?);
    lang.add_pattern(PatternRule::new("italic", r"\*[^*]+\*|_[^_]+_", TokenType::Special, 85)?);
    lang.add_pattern(PatternRule::new("image", r"!\[[^\]]*\]\([^)]+\)", TokenType::Macro, 81)?);
    lang.add_pattern(PatternRule::new("link", r"\[[^\]]+\](?:\([^)]+\)|\[[^\]]*\])", TokenType::Function, 80)?);
    lang.add_pattern(PatternRule::new("list", r"^\s*(?:[-*+]|\d+\.)\s", TokenType::Keyword, 70)?);
    lang.add_pattern(PatternRule::new("quote", r"^\s*>.*$", TokenType::Comment, 70)?);

    Ok(lang)
}
