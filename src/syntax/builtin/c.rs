//! C/C++ language definition

use super::{word_list, BRACE_REGION, COMMENT_REGION};
use crate::error::Result;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{MultilineRule, PatternRule};
use crate::syntax::tokens::TokenType;

/// Fold region for `#if ... #endif`
pub const PREPROCESSOR_REGION: i16 = 3;

const KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while",
];

const CPP_KEYWORDS: &[&str] = &[
    "bool", "catch", "class", "constexpr", "delete", "explicit", "false", "friend", "mutable",
    "namespace", "new", "noexcept", "nullptr", "operator", "private", "protected", "public",
    "template", "this", "throw", "true", "try", "typename", "using", "virtual",
];

/// Create C language definition (also works for C++)
pub fn c_language() -> Result<LanguageDefinition> {
    let mut lang = LanguageDefinition::new("C");
    for ext in ["c", "h", "cpp", "hpp", "cc", "cxx"] {
        lang.add_extension(ext);
    }
    lang.set_indentation("cstyle");

    lang.add_multiline(
        MultilineRule::new("block_comment", r"/\*", r"\*/", TokenType::Comment, 1)?
            .with_fold(COMMENT_REGION),
    );
    lang.add_multiline(
        MultilineRule::new("string", "\"", "\"", TokenType::String, 2)?.with_escape('\\'),
    );

    lang.add_pattern(PatternRule::new("line_comment", r"//.*$", TokenType::Comment, 100)?);
    lang.add_pattern(
        PatternRule::new("pp_if", r"^\s*#\s*if(?:n?def)?\b", TokenType::Preprocessor, 97)?
            .with_fold(PREPROCESSOR_REGION),
    );
    lang.add_pattern(
        PatternRule::new("pp_endif", r"^\s*#\s*endif\b", TokenType::Preprocessor, 96)?
            .with_fold(-PREPROCESSOR_REGION),
    );
    lang.add_pattern(PatternRule::new("preprocessor", r"^\s*#\s*\w+", TokenType::Preprocessor, 95)?);
    lang.add_pattern(PatternRule::new("char", r"'(?:[^'\\]|\\.)'", TokenType::Char, 90)?);
    lang.add_pattern(PatternRule::new("keyword", &word_list(KEYWORDS), TokenType::Keyword, 80)?);
    lang.add_pattern(PatternRule::new("cpp_keyword", &word_list(CPP_KEYWORDS), TokenType::Keyword, 79)?);
    lang.add_pattern(PatternRule::new(
        "number",
        r"\b(?:0[xX][0-9a-fA-F]+|\d+(?:\.\d*)?(?:[eE][+-]?\d+)?)[uUlLfF]*\b",
        TokenType::Number,
        65,
    )?);
    lang.add_pattern(
        PatternRule::new("open_brace", r"\{", TokenType::Punctuation, 50)?.with_fold(BRACE_REGION),
    );
    lang.add_pattern(
        PatternRule::new("close_brace", r"\}", TokenType::Punctuation, 50)?.with_fold(-BRACE_REGION),
    );
    lang.add_pattern(PatternRule::new("operator", r"[+\-*/%&|^!<>=~?:]+", TokenType::Operator, 40)?);

    Ok(lang)
}
