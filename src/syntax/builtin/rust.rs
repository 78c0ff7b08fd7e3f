//! Rust language definition

use super::{word_list, BRACE_REGION, COMMENT_REGION};
use crate::error::Result;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{MultilineRule, PatternRule};
use crate::syntax::tokens::TokenType;

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "union", "unsafe", "use", "where", "while",
];

const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32",
    "i64", "i128", "isize", "f32", "f64",
];

/// Create Rust language definition
pub fn rust_language() -> Result<LanguageDefinition> {
    let mut lang = LanguageDefinition::new("Rust");
    lang.add_extension("rs");
    lang.set_indentation("cstyle");

    lang.add_multiline(
        MultilineRule::new("block_comment", r"/\*", r"\*/", TokenType::Comment, 1)?
            .with_fold(COMMENT_REGION),
    );
    // r"..", r#".."#, r##".."## ...: the closing quote needs the same hashes
    lang.add_multiline(MultilineRule::dynamic(
        "raw_string",
        r##"\br(#*)""##,
        "\"%1",
        TokenType::String,
        2,
    )?);
    lang.add_multiline(
        MultilineRule::new("string", "\"", "\"", TokenType::String, 3)?.with_escape('\\'),
    );

    lang.add_pattern(PatternRule::new("line_comment", r"//.*$", TokenType::Comment, 100)?);
    lang.add_pattern(PatternRule::new("attribute", r"#!?\[[^\]]*\]", TokenType::Attribute, 95)?);
    lang.add_pattern(PatternRule::new("char", r"'(?:[^'\\]|\\.)'", TokenType::Char, 90)?);
    lang.add_pattern(PatternRule::new("lifetime", r"'\w+", TokenType::Lifetime, 89)?);
    lang.add_pattern(PatternRule::new("macro", r"\b\w+!", TokenType::Macro, 85)?);
    lang.add_pattern(PatternRule::new("keyword", &word_list(KEYWORDS), TokenType::Keyword, 80)?);
    lang.add_pattern(PatternRule::new("primitive", &word_list(PRIMITIVES), TokenType::Type, 75)?);
    lang.add_pattern(PatternRule::new("type_name", r"\b[A-Z][a-zA-Z0-9_]*\b", TokenType::Type, 60)?);
    lang.add_pattern(PatternRule::new(
        "number",
        r"\b(?:0x[0-9a-fA-F_]+|0b[01_]+|0o[0-7_]+|\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?)\w*\b",
        TokenType::Number,
        65,
    )?);
    lang.add_pattern(
        PatternRule::new("open_brace", r"\{", TokenType::Punctuation, 50)?.with_fold(BRACE_REGION),
    );
    lang.add_pattern(
        PatternRule::new("close_brace", r"\}", TokenType::Punctuation, 50)?.with_fold(-BRACE_REGION),
    );
    lang.add_pattern(PatternRule::new("operator", r"[+\-*/%&|^!<>=@]+", TokenType::Operator, 40)?);

    Ok(lang)
}
