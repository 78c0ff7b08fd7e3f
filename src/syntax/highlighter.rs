//! The interface between buffers and lexers

use super::dynamic::ContextRegistry;
use super::rules::{HighlightResult, LineState};
use crate::line::Line;

/// How a definition wants its folding regions computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FoldingStrategy {
    /// Regions delimited by fold markers such as `{` and `}`
    #[default]
    TokenBased,
    /// Regions derived from indentation. Not supported: folding queries
    /// on such definitions find no range.
    IndentationBased,
}

/// A highlighting definition, shared between buffers behind an `Rc`
pub trait Highlighter {
    /// Definition name, e.g. "Rust"
    fn name(&self) -> &str;

    /// True for the plain-text definition that produces no highlighting
    fn no_highlighting(&self) -> bool {
        false
    }

    fn folding_strategy(&self) -> FoldingStrategy {
        FoldingStrategy::TokenBased
    }

    /// Preferred indentation mode for documents using this definition
    fn indentation(&self) -> Option<&str> {
        None
    }

    /// Highlight one line given the state the previous line ended in
    fn tokenize(&self, prev: &LineState, text: &str, registry: &ContextRegistry)
        -> HighlightResult;

    /// Highlight `line` in place. Returns whether its end state changed.
    fn highlight_line(&self, prev: &LineState, line: &mut Line, registry: &ContextRegistry) -> bool {
        let result = self.tokenize(prev, line.text(), registry);
        line.apply_highlight(result)
    }
}
