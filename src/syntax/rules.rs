//! Pattern rules for syntax highlighting
//!
//! This module defines the rule types used to match and tokenize
//! source code, and the per-line lexer state they leave behind.

use std::rc::Rc;

use regex::Regex;

use super::dynamic::{ContextId, ContextRegistry};
use super::tokens::TokenType;
use crate::error::{Error, Result};
use crate::line::{Attribute, FoldMarker};

/// Placeholder replaced by the start pattern's first capture in dynamic end patterns
pub const CAPTURE_PLACEHOLDER: &str = "%1";

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidRule {
        name: name.to_string(),
        source,
    })
}

/// A single-line pattern rule
///
/// Matches a regex pattern and assigns a token type to the match.
/// Rules are tried in priority order (highest first). A rule with a
/// non-zero `fold` value places a fold marker at the start of each match.
#[derive(Debug)]
pub struct PatternRule {
    /// Name for debugging
    pub name: String,
    /// Compiled regex pattern
    pub pattern: Regex,
    /// Token type to assign to matches
    pub token_type: TokenType,
    /// Priority (higher = matched first)
    pub priority: i32,
    /// Fold marker value, 0 for none
    pub fold: i16,
}

impl PatternRule {
    /// Create a new pattern rule
    pub fn new(name: &str, pattern: &str, token_type: TokenType, priority: i32) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            pattern: compile(name, pattern)?,
            token_type,
            priority,
            fold: 0,
        })
    }

    /// Builder: open (positive) or close (negative) a folding region on match
    pub fn with_fold(mut self, fold: i16) -> Self {
        self.fold = fold;
        self
    }

    /// Find the first non-empty match at or after `start`
    pub fn find_at(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        if start >= text.len() {
            return None;
        }
        self.pattern
            .find_at(text, start)
            .filter(|m| !m.is_empty())
            .map(|m| (m.start(), m.end()))
    }
}

/// How a multi-line construct ends
#[derive(Debug)]
pub enum EndPattern {
    /// Fixed end pattern
    Static(Rc<Regex>),
    /// Template containing `%1`, instantiated per match as a dynamic context
    Dynamic(String),
}

/// A multi-line construct rule (block comments, strings)
///
/// These rules track state across lines for constructs that
/// can span multiple lines.
#[derive(Debug)]
pub struct MultilineRule {
    /// Name for debugging
    pub name: String,
    /// Pattern that starts the construct
    pub start: Regex,
    /// Pattern that ends the construct
    pub end: EndPattern,
    /// Token type for this construct
    pub token_type: TokenType,
    /// Escape character (usually backslash)
    pub escape_char: Option<char>,
    /// Unique ID for this multiline state (1-255, 0 = normal)
    pub state_id: u8,
    /// Folding region opened at the start and closed at the end, 0 for none
    pub fold_region: i16,
}

impl MultilineRule {
    /// Create a new multiline rule
    pub fn new(
        name: &str,
        start_pattern: &str,
        end_pattern: &str,
        token_type: TokenType,
        state_id: u8,
    ) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            start: compile(name, start_pattern)?,
            end: EndPattern::Static(Rc::new(compile(name, end_pattern)?)),
            token_type,
            escape_char: None,
            state_id,
            fold_region: 0,
        })
    }

    /// Create a rule whose end pattern depends on text captured by the start
    /// pattern. `%1` in `end_template` is replaced by the escaped first
    /// capture group (or the whole match when there is no group).
    pub fn dynamic(
        name: &str,
        start_pattern: &str,
        end_template: &str,
        token_type: TokenType,
        state_id: u8,
    ) -> Result<Self> {
        if !end_template.contains(CAPTURE_PLACEHOLDER) {
            return Err(Error::Definition(format!(
                "dynamic rule '{}' has no {} in its end pattern",
                name, CAPTURE_PLACEHOLDER
            )));
        }
        compile(name, &end_template.replace(CAPTURE_PLACEHOLDER, "x"))?;

        Ok(Self {
            name: name.to_string(),
            start: compile(name, start_pattern)?,
            end: EndPattern::Dynamic(end_template.to_string()),
            token_type,
            escape_char: None,
            state_id,
            fold_region: 0,
        })
    }

    /// Builder: end pattern can be escaped by `escape_char`
    pub fn with_escape(mut self, escape_char: char) -> Self {
        self.escape_char = Some(escape_char);
        self
    }

    /// Builder: fold the construct as region `region`
    pub fn with_fold(mut self, region: i16) -> Self {
        self.fold_region = region.abs();
        self
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.end, EndPattern::Dynamic(_))
    }

    /// Find start of this construct at or after `start`
    pub fn find_start(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        if start >= text.len() {
            return None;
        }
        self.start
            .find_at(text, start)
            .filter(|m| !m.is_empty())
            .map(|m| (m.start(), m.end()))
    }

    /// Line state to continue with after this construct started at `start`
    /// without ending on the same line.
    pub fn open_state(&self, text: &str, start: usize, registry: &ContextRegistry) -> LineState {
        let dynamic = match &self.end {
            EndPattern::Static(_) => None,
            EndPattern::Dynamic(template) => self.instantiate(template, text, start, registry),
        };
        LineState {
            multiline_id: self.state_id,
            dynamic,
        }
    }

    fn instantiate(
        &self,
        template: &str,
        text: &str,
        start: usize,
        registry: &ContextRegistry,
    ) -> Option<ContextId> {
        let caps = self.start.captures_at(text, start)?;
        let captured = caps.get(1).or_else(|| caps.get(0))?.as_str();
        let pattern = template.replace(CAPTURE_PLACEHOLDER, &regex::escape(captured));
        registry.intern(&pattern)
    }

    /// End pattern for a construct in state `state`. None when the state
    /// refers to a dynamic context that no longer exists.
    pub fn end_pattern(&self, state: &LineState, registry: &ContextRegistry) -> Option<Rc<Regex>> {
        match &self.end {
            EndPattern::Static(regex) => Some(Rc::clone(regex)),
            EndPattern::Dynamic(_) => state.dynamic.and_then(|id| registry.lookup(id)),
        }
    }

    /// Find the end of this construct at or after `start`, skipping escaped
    /// ends. Returns the byte range of the end delimiter.
    pub fn find_end(&self, end: &Regex, text: &str, start: usize) -> Option<(usize, usize)> {
        let mut pos = start;

        while pos <= text.len() {
            let m = end.find_at(text, pos)?;

            if let Some(escape) = self.escape_char {
                let escapes = text[start..m.start()]
                    .chars()
                    .rev()
                    .take_while(|&c| c == escape)
                    .count();
                if escapes % 2 == 1 {
                    pos = next_boundary(text, m.end().max(m.start() + 1));
                    continue;
                }
            }

            return Some((m.start(), m.end()));
        }

        None
    }
}

fn next_boundary(text: &str, mut pos: usize) -> usize {
    while pos < text.len() && !text.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}

/// Lexer state at the end of a line
///
/// Stored per line so that the next line knows whether it starts inside a
/// multi-line comment, string, etc.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LineState {
    /// 0 = normal, non-zero = inside multiline rule with this ID
    pub multiline_id: u8,
    /// Dynamic context holding the end pattern, for dynamic rules
    pub dynamic: Option<ContextId>,
}

impl LineState {
    /// Create state for being inside a static multiline construct
    pub fn inside(state_id: u8) -> Self {
        Self {
            multiline_id: state_id,
            dynamic: None,
        }
    }

    /// Check if we're inside a multiline construct
    pub fn is_inside_multiline(&self) -> bool {
        self.multiline_id != 0
    }

    /// Check if we're in normal (no multiline) state
    pub fn is_normal(&self) -> bool {
        self.multiline_id == 0
    }
}

/// Result of highlighting a single line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightResult {
    /// Attribute runs, ordered by offset
    pub attributes: Vec<Attribute>,
    /// Fold markers, ordered by offset
    pub folding: Vec<FoldMarker>,
    /// State at end of line (for next line)
    pub end_state: LineState,
}

impl HighlightResult {
    pub(crate) fn push_run(&mut self, start: usize, end: usize, token_type: TokenType) {
        if end > start {
            self.attributes.push(Attribute::new(start, end - start, token_type.id()));
        }
    }

    pub(crate) fn push_fold(&mut self, offset: usize, value: i16) {
        if value != 0 {
            self.folding.push(FoldMarker::new(offset, value));
        }
    }
}
