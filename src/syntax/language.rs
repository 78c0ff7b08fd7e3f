//! Language definitions for syntax highlighting
//!
//! This module provides the LanguageDefinition struct that combines
//! pattern rules, multiline rules and folding settings for a language.

use super::dynamic::ContextRegistry;
use super::highlighter::{FoldingStrategy, Highlighter};
use super::rules::{HighlightResult, LineState, MultilineRule, PatternRule};

/// Name of the plain-text definition
pub const NO_HIGHLIGHTING: &str = "None";

/// A complete language definition for syntax highlighting
#[derive(Debug)]
pub struct LanguageDefinition {
    /// Language name (e.g., "Rust", "Python")
    pub name: String,
    /// File extensions (e.g., ["rs"], ["py", "pyw"])
    pub extensions: Vec<String>,
    /// Single-line pattern rules, sorted by priority (highest first)
    pub patterns: Vec<PatternRule>,
    /// Multi-line rules for comments, strings, etc.
    pub multiline_rules: Vec<MultilineRule>,
    /// How folding regions are found
    pub folding: FoldingStrategy,
    /// Preferred indentation mode, if any
    pub indentation: Option<String>,
    no_highlighting: bool,
}

/// Next token found while scanning a line
enum Next<'a> {
    Multiline(usize, usize, &'a MultilineRule),
    Pattern(usize, usize, &'a PatternRule),
}

impl LanguageDefinition {
    /// Create a new empty language definition
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            extensions: Vec::new(),
            patterns: Vec::new(),
            multiline_rules: Vec::new(),
            folding: FoldingStrategy::TokenBased,
            indentation: None,
            no_highlighting: false,
        }
    }

    /// The plain-text definition: no rules, no folding
    pub fn plain() -> Self {
        Self {
            no_highlighting: true,
            ..Self::new(NO_HIGHLIGHTING)
        }
    }

    /// Add a file extension
    pub fn add_extension(&mut self, ext: &str) {
        self.extensions.push(ext.to_string());
    }

    /// Add a pattern rule
    pub fn add_pattern(&mut self, rule: PatternRule) {
        self.patterns.push(rule);
        // stable sort keeps insertion order among equal priorities
        self.patterns.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Add a multiline rule
    pub fn add_multiline(&mut self, rule: MultilineRule) {
        self.multiline_rules.push(rule);
    }

    pub fn set_folding(&mut self, folding: FoldingStrategy) {
        self.folding = folding;
    }

    pub fn set_indentation(&mut self, mode: &str) {
        self.indentation = Some(mode.to_string());
    }

    /// Whether any rule creates dynamic contexts
    pub fn uses_dynamic_contexts(&self) -> bool {
        self.multiline_rules.iter().any(MultilineRule::is_dynamic)
    }

    /// Get multiline rule by state ID
    fn multiline_rule(&self, state_id: u8) -> Option<&MultilineRule> {
        self.multiline_rules.iter().find(|r| r.state_id == state_id)
    }

    /// Earliest token at or after `pos`. Multiline rules win ties with
    /// patterns; among rules of one kind the first listed wins.
    fn next_token(&self, text: &str, pos: usize) -> Option<Next<'_>> {
        let mut multiline: Option<(usize, usize, &MultilineRule)> = None;
        for rule in &self.multiline_rules {
            if let Some((start, end)) = rule.find_start(text, pos) {
                if multiline.map_or(true, |(best, _, _)| start < best) {
                    multiline = Some((start, end, rule));
                }
            }
        }

        let mut pattern: Option<(usize, usize, &PatternRule)> = None;
        for rule in &self.patterns {
            if let Some((start, end)) = rule.find_at(text, pos) {
                if pattern.map_or(true, |(best, _, _)| start < best) {
                    pattern = Some((start, end, rule));
                }
            }
        }

        match (multiline, pattern) {
            (Some((m, _, _)), Some((p, end, rule))) if p < m => Some(Next::Pattern(p, end, rule)),
            (Some((start, end, rule)), _) => Some(Next::Multiline(start, end, rule)),
            (None, Some((start, end, rule))) => Some(Next::Pattern(start, end, rule)),
            (None, None) => None,
        }
    }
}

impl Highlighter for LanguageDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn no_highlighting(&self) -> bool {
        self.no_highlighting
    }

    fn folding_strategy(&self) -> FoldingStrategy {
        self.folding
    }

    fn indentation(&self) -> Option<&str> {
        self.indentation.as_deref()
    }

    fn tokenize(&self, prev: &LineState, text: &str, registry: &ContextRegistry) -> HighlightResult {
        let mut result = HighlightResult::default();
        if self.no_highlighting {
            return result;
        }

        let mut state = *prev;
        let mut pos = 0;

        while pos < text.len() {
            // Continue a construct left open by an earlier line
            if state.is_inside_multiline() {
                let rule = self.multiline_rule(state.multiline_id);
                let end = rule.and_then(|rule| rule.end_pattern(&state, registry));
                let (Some(rule), Some(end)) = (rule, end) else {
                    // Unknown rule or dropped dynamic context
                    state = LineState::default();
                    continue;
                };

                match rule.find_end(&end, text, pos) {
                    Some((close, end_pos)) => {
                        result.push_run(pos, end_pos, rule.token_type);
                        result.push_fold(close, -rule.fold_region);
                        pos = end_pos;
                        state = LineState::default();
                        continue;
                    }
                    None => {
                        result.push_run(pos, text.len(), rule.token_type);
                        result.end_state = state;
                        return result;
                    }
                }
            }

            match self.next_token(text, pos) {
                Some(Next::Multiline(start, start_end, rule)) => {
                    result.push_fold(start, rule.fold_region);
                    let open = rule.open_state(text, start, registry);
                    let close = rule
                        .end_pattern(&open, registry)
                        .and_then(|end| rule.find_end(&end, text, start_end));

                    match close {
                        Some((close, end_pos)) => {
                            result.push_run(start, end_pos, rule.token_type);
                            result.push_fold(close, -rule.fold_region);
                            pos = end_pos;
                        }
                        None => {
                            result.push_run(start, text.len(), rule.token_type);
                            result.end_state = open;
                            return result;
                        }
                    }
                }
                Some(Next::Pattern(start, end, rule)) => {
                    result.push_run(start, end, rule.token_type);
                    result.push_fold(start, rule.fold);
                    pos = end;
                }
                None => break,
            }
        }

        result.end_state = state;
        result
    }
}
