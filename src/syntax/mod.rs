//! Syntax highlighting module
//!
//! This module provides the lexer side of highlighting:
//! - Rule based language definitions producing attributes and fold markers
//! - The shared registry of dynamic contexts
//! - Loading definitions from TOML and resolving them by name

mod builtin;
mod dynamic;
mod highlighter;
mod language;
mod loader;
mod manager;
mod rules;
mod tokens;

pub use builtin::{BRACE_REGION, COMMENT_REGION};
pub use dynamic::{BufferSlot, ContextId, ContextRegistry};
pub use highlighter::{FoldingStrategy, Highlighter};
pub use language::{LanguageDefinition, NO_HIGHLIGHTING};
pub use loader::parse_definition;
pub use manager::SyntaxManager;
pub use rules::{EndPattern, HighlightResult, LineState, MultilineRule, PatternRule};
pub use tokens::TokenType;
