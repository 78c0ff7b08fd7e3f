//! Token types for syntax highlighting
//!
//! Every attribute run stored on a line carries the numeric id of one of
//! these token types. Mapping ids to colors is left to the renderer.

/// Semantic token types for syntax highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TokenType {
    /// Default/plain text (no special highlighting)
    Default = 0,
    /// Source code comments (// or /* */)
    Comment,
    /// String literals ("..." or '...')
    String,
    /// Character literals
    Char,
    /// Numeric literals (integers, floats)
    Number,
    /// Language keywords (if, else, fn, let, etc.)
    Keyword,
    /// Type names (String, i32, etc.)
    Type,
    /// Function names
    Function,
    /// Operators (+, -, *, /, etc.)
    Operator,
    /// Punctuation and brackets
    Punctuation,
    /// Preprocessor directives (#include, #define)
    Preprocessor,
    /// Macros (println!, vec!)
    Macro,
    /// Constants and enum variants
    Constant,
    /// Special tokens (escape sequences, emphasis)
    Special,
    /// Attributes (#[derive], @decorator)
    Attribute,
    /// Lifetime annotations ('a)
    Lifetime,
    /// Headings and section titles
    Heading,
}

const ALL: [TokenType; 17] = [
    TokenType::Default,
    TokenType::Comment,
    TokenType::String,
    TokenType::Char,
    TokenType::Number,
    TokenType::Keyword,
    TokenType::Type,
    TokenType::Function,
    TokenType::Operator,
    TokenType::Punctuation,
    TokenType::Preprocessor,
    TokenType::Macro,
    TokenType::Constant,
    TokenType::Special,
    TokenType::Attribute,
    TokenType::Lifetime,
    TokenType::Heading,
];

impl TokenType {
    /// Attribute id stored in line annotations
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Look a token type up by its attribute id
    pub fn from_id(id: u16) -> Option<Self> {
        ALL.get(id as usize).copied()
    }

    /// Get a human-readable name for this token type
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::Default => "Default",
            TokenType::Comment => "Comment",
            TokenType::String => "String",
            TokenType::Char => "Char",
            TokenType::Number => "Number",
            TokenType::Keyword => "Keyword",
            TokenType::Type => "Type",
            TokenType::Function => "Function",
            TokenType::Operator => "Operator",
            TokenType::Punctuation => "Punctuation",
            TokenType::Preprocessor => "Preprocessor",
            TokenType::Macro => "Macro",
            TokenType::Constant => "Constant",
            TokenType::Special => "Special",
            TokenType::Attribute => "Attribute",
            TokenType::Lifetime => "Lifetime",
            TokenType::Heading => "Heading",
        }
    }

    /// Parse a token type from a string name (for TOML loading)
    pub fn from_name(name: &str) -> Option<Self> {
        ALL.iter().copied().find(|token| token.name() == name)
    }
}
