//! Python language definition

use super::word_list;
use crate::error::Result;
use crate::syntax::highlighter::FoldingStrategy;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{MultilineRule, PatternRule};
use crate::syntax::tokens::TokenType;

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Create Python language definition
pub fn python_language() -> Result<LanguageDefinition> {
    let mut lang = LanguageDefinition::new("Python");
    for ext in ["py", "pyw", "pyi"] {
        lang.add_extension(ext);
    }
    lang.set_indentation("python");
    lang.set_folding(FoldingStrategy::IndentationBased);

    lang.add_multiline(MultilineRule::new("triple_double", r#"""""#, r#"""""#, TokenType::String, 1)?);
    lang.add_multiline(MultilineRule::new("triple_single", "'''", "'''", TokenType::String, 2)?);
    lang.add_multiline(
        MultilineRule::new("double_string", "\"", "\"", TokenType::String, 3)?.with_escape('\\'),
    );
    lang.add_multiline(
        MultilineRule::new("single_string", "'", "'", TokenType::String, 4)?.with_escape('\\'),
    );

    lang.add_pattern(PatternRule::new("comment", r"#.*$", TokenType::Comment, 100)?);
    lang.add_pattern(PatternRule::new("decorator", r"@\w+", TokenType::Attribute, 95)?);
    lang.add_pattern(PatternRule::new("keyword", &word_list(KEYWORDS), TokenType::Keyword, 80)?);
    lang.add_pattern(PatternRule::new("function", r"\bdef\s+\w+", TokenType::Function, 85)?);
    lang.add_pattern(PatternRule::new(
        "number",
        r"\b(?:0[xX][0-9a-fA-F_]+|\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?j?)\b",
        TokenType::Number,
        65,
    )?);
    lang.add_pattern(PatternRule::new("operator", r"[+\-*/%&|^~<>=!]+", TokenType::Operator, 40)?);

    Ok(lang)
}
