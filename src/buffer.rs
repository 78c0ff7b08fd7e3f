//! Buffer with incremental highlighting
//!
//! A [`Buffer`] wraps the line store and keeps its highlighting up to date.
//! Lines `0..highlighted_up_to` carry annotations consistent with the active
//! definition; everything at or past that watermark is highlighted lazily,
//! either when an edit touches the highlighted region or when someone asks
//! for a line via [`Buffer::ensure_highlighted`].
//!
//! Changes are reported as [`BufferEvent`]s which the document layer drains
//! with [`Buffer::take_events`].

use std::rc::Rc;

use crate::config::Config;
use crate::error::Result;
use crate::line::Line;
use crate::syntax::{
    BufferSlot, ContextRegistry, FoldingStrategy, Highlighter, LineState, SyntaxManager,
};
use crate::text_buffer::TextBuffer;

/// Notifications for the document/view layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferEvent {
    /// Annotations of lines `start..=end` may have changed
    LinesChanged { start: usize, end: usize },
    /// Lines `start..=end` need another spell check pass
    RespellNeeded { start: usize, end: usize },
    /// A different highlighting definition is active
    HighlightingChanged { name: String },
    /// A global dynamic-context reset invalidated this buffer
    AttributesRebuilt,
}

/// A text buffer with incremental highlighting
pub struct Buffer {
    text: TextBuffer,
    /// Active definition, None until one is set
    highlight: Option<Rc<dyn Highlighter>>,
    /// Lines below this index are highlighted
    highlighted_up_to: usize,
    /// Dynamic context count that triggers a reset attempt
    max_dynamic_contexts: usize,
    tab_width: usize,
    fold_lookahead: usize,
    indentation_mode: Option<String>,
    registry: Rc<ContextRegistry>,
    slot: Rc<BufferSlot>,
    events: Vec<BufferEvent>,
}

impl Buffer {
    /// Create an empty buffer sharing `registry` with all other buffers
    pub fn new(registry: Rc<ContextRegistry>, config: &Config) -> Self {
        let slot = registry.register_buffer();
        Self {
            text: TextBuffer::new(),
            highlight: None,
            highlighted_up_to: 0,
            max_dynamic_contexts: config.max_dynamic_contexts.max(1),
            tab_width: config.tab_width,
            fold_lookahead: config.fold_lookahead,
            indentation_mode: None,
            registry,
            slot,
            events: Vec::new(),
        }
    }

    /// Create a buffer holding `text`
    pub fn from_text(registry: Rc<ContextRegistry>, config: &Config, text: &str) -> Self {
        let mut buffer = Self::new(registry, config);
        buffer.set_text(text);
        buffer
    }

    /// The underlying line store
    pub fn text(&self) -> &TextBuffer {
        &self.text
    }

    pub fn line(&self, idx: usize) -> &Line {
        self.text.line(idx)
    }

    pub fn line_count(&self) -> usize {
        self.text.line_count()
    }

    /// Index of the first line whose highlighting is not known to be current
    pub fn highlighted_up_to(&self) -> usize {
        if self.slot.rebuild_pending() {
            0
        } else {
            self.highlighted_up_to
        }
    }

    pub fn max_dynamic_contexts(&self) -> usize {
        self.max_dynamic_contexts
    }

    pub fn highlight(&self) -> Option<&Rc<dyn Highlighter>> {
        self.highlight.as_ref()
    }

    pub fn indentation_mode(&self) -> Option<&str> {
        self.indentation_mode.as_deref()
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    pub(crate) fn fold_lookahead(&self) -> usize {
        self.fold_lookahead
    }

    /// Drain pending notifications
    pub fn take_events(&mut self) -> Vec<BufferEvent> {
        self.sync_with_registry();
        std::mem::take(&mut self.events)
    }

    /// Replace the content. Highlighting restarts from the first line.
    pub fn set_text(&mut self, text: &str) {
        self.text.set_text(text);
        self.highlighted_up_to = 0;
    }

    /// Back to one empty line
    pub fn clear(&mut self) {
        self.text.clear();
        self.highlighted_up_to = 0;
    }

    /// Open an edit transaction. Transactions nest.
    pub fn edit_start(&mut self) {
        self.text.start_editing();
    }

    /// Close an edit transaction. Closing the outermost one re-highlights
    /// the changed lines if they touch the highlighted region.
    pub fn edit_end(&mut self) {
        if !self.text.finish_editing() {
            return;
        }

        if !self.text.editing_changed_buffer() {
            return;
        }

        let (Some(min), Some(max)) = (
            self.text.editing_minimal_line_changed(),
            self.text.editing_maximal_line_changed(),
        ) else {
            panic!("changed buffer without a changed line range");
        };
        assert!(min <= max, "changed line range {}..={} is inverted", min, max);

        if self.highlight.is_none() {
            return;
        }

        self.sync_with_registry();

        // the change lies past the highlighted region
        if min > self.highlighted_up_to {
            return;
        }

        // the end state of the last changed line decides how the next one starts
        let end = max + 1;
        // and the line before may continue into the change
        let start = min.saturating_sub(1);

        self.do_highlight(start, end, true);
    }

    /// Insert text without newlines at `(line, col)`
    pub fn insert_text(&mut self, line: usize, col: usize, text: &str) {
        self.text.insert_text(line, col, text);
    }

    /// Remove bytes `start..end` of `line`
    pub fn remove_text(&mut self, line: usize, start: usize, end: usize) -> String {
        self.text.remove_text(line, start, end)
    }

    /// Split `line` at byte `col`
    pub fn wrap_line(&mut self, line: usize, col: usize) {
        self.sync_with_registry();
        self.text.wrap_line(line, col);

        if self.highlighted_up_to > line + 1 {
            self.highlighted_up_to += 1;
        }
    }

    /// Merge `line` into the line before it
    pub fn unwrap_line(&mut self, line: usize) {
        self.sync_with_registry();
        self.text.unwrap_line(line);

        if self.highlighted_up_to > line {
            self.highlighted_up_to -= 1;
        }
    }

    /// Merge each of the lines `from..=to` with its successor, last first.
    /// At the end of the buffer the last line is merged into its
    /// predecessor instead.
    pub fn unwrap_lines(&mut self, from: usize, to: usize) {
        assert!(from <= to, "invalid line range {}..={}", from, to);
        assert!(to < self.line_count(), "line {} out of range", to);

        for line in (from..=to).rev() {
            if line + 1 < self.line_count() {
                self.unwrap_line(line + 1);
            } else if line != 0 {
                self.unwrap_line(line);
            }
        }
    }

    /// Forget all highlighting; it is recomputed on demand
    pub fn invalidate_highlighting(&mut self) {
        self.highlighted_up_to = 0;
    }

    /// Switch the highlighting definition
    pub fn set_highlight(&mut self, highlight: Rc<dyn Highlighter>) {
        if let Some(current) = &self.highlight {
            if Rc::ptr_eq(current, &highlight) {
                return;
            }
        }

        // plain text on a fresh buffer has nothing to invalidate
        let mut invalidate = !highlight.no_highlighting();
        if self.highlight.take().is_some() {
            invalidate = true;
        }

        self.highlight = Some(Rc::clone(&highlight));

        if invalidate {
            self.invalidate_highlighting();
        }

        self.events.push(BufferEvent::HighlightingChanged {
            name: highlight.name().to_string(),
        });

        if let Some(mode) = highlight.indentation() {
            self.indentation_mode = Some(mode.to_string());
        }
    }

    /// Switch to the definition registered under `name`
    pub fn set_highlight_mode(&mut self, manager: &SyntaxManager, name: &str) -> Result<()> {
        let highlight = manager.get(name)?;
        self.set_highlight(highlight);
        Ok(())
    }

    /// Change the tab width. Indentation based folding depends on it.
    pub fn set_tab_width(&mut self, width: usize) {
        if width == 0 || width == self.tab_width {
            return;
        }

        self.tab_width = width;

        let indentation_folding = self
            .highlight
            .as_ref()
            .is_some_and(|hl| hl.folding_strategy() == FoldingStrategy::IndentationBased);
        if indentation_folding {
            self.invalidate_highlighting();
        }
    }

    /// Make sure `line` and up to `lookahead` lines after it are highlighted.
    /// Produces no notifications.
    pub fn ensure_highlighted(&mut self, line: usize, lookahead: usize) {
        self.sync_with_registry();

        if line >= self.line_count() {
            return;
        }

        if line < self.highlighted_up_to {
            return;
        }

        let end = (line + lookahead).min(self.line_count() - 1);
        self.do_highlight(self.highlighted_up_to, end, false);
    }

    /// Apply a rebuild requested by a global dynamic-context reset
    fn sync_with_registry(&mut self) {
        if self.slot.take_rebuild() {
            self.highlighted_up_to = 0;
            self.events.push(BufferEvent::AttributesRebuilt);
        }
    }

    /// Highlight lines `start_line..=end_line` (clamped to the buffer).
    /// With `invalidate`, report the affected lines.
    fn do_highlight(&mut self, start_line: usize, end_line: usize, invalidate: bool) {
        let Some(highlight) = self.highlight.clone() else {
            return;
        };

        tracing::debug!(
            start_line,
            end_line,
            highlighted_up_to = self.highlighted_up_to,
            dynamic_contexts = self.registry.live_count(),
            max_dynamic_contexts = self.max_dynamic_contexts,
            "highlight pass"
        );

        if self.registry.live_count() >= self.max_dynamic_contexts {
            if self.registry.reset_all() {
                tracing::info!(
                    limit = self.max_dynamic_contexts,
                    "too many dynamic contexts, highlighting of all buffers invalidated"
                );

                self.registry.set_suppress_reset(true);
                self.registry.request_rebuild();
                self.sync_with_registry();

                // the recursive pass starts at the reset watermark and may not
                // reach end_line on its own
                self.do_highlight(self.highlighted_up_to, end_line, false);
                self.highlighted_up_to = end_line;

                self.registry.set_suppress_reset(false);
                return;
            }

            self.max_dynamic_contexts *= 2;
            tracing::info!(limit = self.max_dynamic_contexts, "dynamic context limit raised");
        }

        let registry = Rc::clone(&self.registry);
        let mut prev = if start_line >= 1 {
            self.text.line(start_line - 1).end_state()
        } else {
            LineState::default()
        };

        let stop = end_line.saturating_add(1).min(self.line_count());
        let mut current_line = start_line;
        let mut spell_start: Option<usize> = None;
        let mut spell_end: Option<usize> = None;
        let mut context_changed = false;

        while current_line < stop {
            let line = self.text.line_mut(current_line);
            context_changed = highlight.highlight_line(&prev, line, &registry);
            prev = line.end_state();

            // only the first run of changed contexts is reported
            match spell_start {
                None if context_changed => spell_start = Some(current_line),
                Some(_) if !context_changed && spell_end.is_none() => {
                    spell_end = Some(current_line)
                }
                _ => {}
            }

            current_line += 1;
        }

        let old_highlighted = self.highlighted_up_to;
        if context_changed || current_line > self.highlighted_up_to {
            self.highlighted_up_to = current_line;
        }

        if invalidate {
            let tagged_end = current_line.max(old_highlighted);
            self.events.push(BufferEvent::LinesChanged {
                start: start_line,
                end: tagged_end,
            });

            if let Some(start) = spell_start {
                let end = spell_end.unwrap_or(tagged_end).min(self.line_count() - 1);
                self.events.push(BufferEvent::RespellNeeded { start, end });
            }
        }

        tracing::debug!(
            highlighted_up_to = self.highlighted_up_to,
            dynamic_contexts = self.registry.live_count(),
            "highlight pass done"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::{Attribute, FoldMarker};
    use crate::syntax::{
        HighlightResult, LanguageDefinition, MultilineRule, PatternRule, TokenType,
    };
    use std::cell::RefCell;
    use std::time::Duration;

    fn test_language() -> Rc<LanguageDefinition> {
        let mut lang = LanguageDefinition::new("Test");
        lang.add_pattern(
            PatternRule::new("open", r"\{", TokenType::Punctuation, 10)
                .unwrap()
                .with_fold(1),
        );
        lang.add_pattern(
            PatternRule::new("close", r"\}", TokenType::Punctuation, 10)
                .unwrap()
                .with_fold(-1),
        );
        lang.add_pattern(PatternRule::new("number", r"\d+", TokenType::Number, 5).unwrap());
        lang.add_multiline(
            MultilineRule::new("comment", r"/\*", r"\*/", TokenType::Comment, 1)
                .unwrap()
                .with_fold(2),
        );
        lang.add_multiline(
            MultilineRule::dynamic("heredoc", r"<<(\w+)", "^%1$", TokenType::String, 2).unwrap(),
        );
        Rc::new(lang)
    }

    /// Wraps a definition and records which lines it was asked to highlight
    struct Recording {
        inner: Rc<LanguageDefinition>,
        seen: RefCell<Vec<String>>,
    }

    impl Highlighter for Recording {
        fn name(&self) -> &str {
            "Recording"
        }

        fn tokenize(
            &self,
            prev: &LineState,
            text: &str,
            registry: &ContextRegistry,
        ) -> HighlightResult {
            self.seen.borrow_mut().push(text.to_string());
            self.inner.tokenize(prev, text, registry)
        }
    }

    fn config() -> Config {
        Config {
            dynamic_reset_delay: Duration::ZERO,
            ..Config::default()
        }
    }

    fn registry() -> Rc<ContextRegistry> {
        ContextRegistry::shared(&config())
    }

    fn buffer_with(registry: &Rc<ContextRegistry>, text: &str) -> Buffer {
        let mut buffer = Buffer::from_text(Rc::clone(registry), &config(), text);
        buffer.set_highlight(test_language());
        buffer.take_events();
        buffer
    }

    fn numbered_lines(count: usize) -> String {
        (0..count).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_ensure_highlighted_advances_watermark() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, &numbered_lines(10));
        assert_eq!(buffer.highlighted_up_to(), 0);

        buffer.ensure_highlighted(3, 0);
        assert_eq!(buffer.highlighted_up_to(), 4);

        buffer.ensure_highlighted(4, 2);
        assert_eq!(buffer.highlighted_up_to(), 7);

        // already covered
        buffer.ensure_highlighted(2, 0);
        assert_eq!(buffer.highlighted_up_to(), 7);

        // out of range is ignored and clamped
        buffer.ensure_highlighted(10, 0);
        assert_eq!(buffer.highlighted_up_to(), 7);
        buffer.ensure_highlighted(8, 100);
        assert_eq!(buffer.highlighted_up_to(), 10);

        // pulls never notify
        assert!(buffer.take_events().is_empty());
    }

    #[test]
    fn test_no_definition_no_highlighting() {
        let registry = registry();
        let mut buffer = Buffer::from_text(Rc::clone(&registry), &config(), "a {\nb }");
        buffer.ensure_highlighted(1, 0);
        assert_eq!(buffer.highlighted_up_to(), 0);

        buffer.edit_start();
        buffer.insert_text(0, 0, "x");
        buffer.edit_end();
        assert!(buffer.take_events().is_empty());
        assert!(buffer.line(0).folding().is_empty());
    }

    #[test]
    fn test_edit_rehighlights_window() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, &numbered_lines(10));
        buffer.ensure_highlighted(9, 0);

        buffer.edit_start();
        buffer.insert_text(4, 0, "{ ");
        buffer.edit_end();

        assert_eq!(buffer.line(4).folding(), &[FoldMarker::new(0, 1)]);
        assert_eq!(buffer.highlighted_up_to(), 10);
        assert_eq!(
            buffer.take_events(),
            vec![BufferEvent::LinesChanged { start: 3, end: 10 }]
        );
    }

    #[test]
    fn test_edit_past_watermark_is_deferred() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, &numbered_lines(10));
        buffer.ensure_highlighted(2, 0);
        assert_eq!(buffer.highlighted_up_to(), 3);

        buffer.edit_start();
        buffer.insert_text(6, 0, "{");
        buffer.edit_end();

        assert!(buffer.take_events().is_empty());
        assert_eq!(buffer.highlighted_up_to(), 3);
        assert!(buffer.line(6).folding().is_empty());

        // the edit right at the watermark is picked up
        buffer.edit_start();
        buffer.insert_text(3, 0, "{");
        buffer.edit_end();
        assert_eq!(buffer.line(3).folding(), &[FoldMarker::new(0, 1)]);
        assert_eq!(buffer.highlighted_up_to(), 5);
    }

    #[test]
    fn test_nested_transactions_highlight_once() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, &numbered_lines(5));
        buffer.ensure_highlighted(4, 0);

        buffer.edit_start();
        buffer.edit_start();
        buffer.insert_text(1, 0, "{");
        buffer.edit_end();
        assert!(buffer.take_events().is_empty());
        assert!(buffer.line(1).folding().is_empty());

        buffer.insert_text(3, 0, "}");
        buffer.edit_end();
        assert_eq!(
            buffer.take_events(),
            vec![BufferEvent::LinesChanged { start: 0, end: 5 }]
        );
        assert_eq!(buffer.line(3).folding(), &[FoldMarker::new(0, -1)]);
    }

    #[test]
    fn test_unbalanced_edit_end_is_noop() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, &numbered_lines(5));
        buffer.ensure_highlighted(4, 0);

        buffer.edit_end();
        assert!(buffer.take_events().is_empty());
        assert_eq!(buffer.highlighted_up_to(), 5);
    }

    #[test]
    fn test_empty_transaction_does_nothing() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, &numbered_lines(5));
        buffer.ensure_highlighted(4, 0);

        buffer.edit_start();
        buffer.edit_end();
        assert!(buffer.take_events().is_empty());
    }

    #[test]
    fn test_context_change_extends_and_respells() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, &numbered_lines(10));
        buffer.ensure_highlighted(9, 0);

        // opening a comment on line 4 changes the end state of lines 4 and 5
        buffer.edit_start();
        buffer.insert_text(4, 0, "/*");
        buffer.edit_end();

        assert_eq!(buffer.highlighted_up_to(), 6);
        assert_eq!(
            buffer.take_events(),
            vec![
                BufferEvent::LinesChanged { start: 3, end: 10 },
                BufferEvent::RespellNeeded { start: 4, end: 9 },
            ]
        );

        // the lines after the window are now stale and get redone on demand
        buffer.ensure_highlighted(9, 0);
        assert_eq!(buffer.line(9).end_state(), LineState::inside(1));
        assert_eq!(buffer.highlighted_up_to(), 10);
    }

    #[test]
    fn test_respell_range_runs_past_unsettled_window() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, "a\nb\n*/\nc\nd");
        buffer.ensure_highlighted(4, 0);

        buffer.edit_start();
        buffer.insert_text(0, 0, "/*");
        buffer.edit_end();

        // line 1 is still inside the comment when the window ends
        let events = buffer.take_events();
        assert_eq!(events[0], BufferEvent::LinesChanged { start: 0, end: 5 });
        assert_eq!(events[1], BufferEvent::RespellNeeded { start: 0, end: 4 });
        assert_eq!(buffer.highlighted_up_to(), 2);

        buffer.ensure_highlighted(4, 0);
        assert_eq!(buffer.line(2).end_state(), LineState::default());
        assert_eq!(buffer.line(2).folding(), &[FoldMarker::new(0, -2)]);
    }

    #[test]
    fn test_respell_range_ends_where_context_settles() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, "a\n*/\nc");
        buffer.ensure_highlighted(2, 0);

        buffer.edit_start();
        buffer.insert_text(0, 0, "/*");
        buffer.edit_end();

        assert_eq!(
            buffer.take_events(),
            vec![
                BufferEvent::LinesChanged { start: 0, end: 3 },
                BufferEvent::RespellNeeded { start: 0, end: 1 },
            ]
        );
        assert_eq!(buffer.highlighted_up_to(), 3);
    }

    #[test]
    fn test_respell_reports_first_changed_run_only() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, "a\n*/\nb\nc\n*/\nd");
        buffer.ensure_highlighted(5, 0);

        buffer.edit_start();
        buffer.insert_text(0, 0, "/*");
        buffer.insert_text(3, 0, "/*");
        buffer.edit_end();

        // line 3 changed as well but lies in a second run
        assert_eq!(
            buffer.take_events(),
            vec![
                BufferEvent::LinesChanged { start: 0, end: 6 },
                BufferEvent::RespellNeeded { start: 0, end: 1 },
            ]
        );
        assert_eq!(buffer.line(3).end_state(), LineState::inside(1));
        assert_eq!(buffer.highlighted_up_to(), 6);
    }

    #[test]
    fn test_idempotent_rehighlight() {
        let registry = registry();
        let text = "fn x() {\n  /* a\n  b */ 42\n}\n<<EOT\nbody\nEOT";
        let mut buffer = buffer_with(&registry, text);
        buffer.ensure_highlighted(6, 0);

        let before: Vec<_> = buffer
            .text()
            .lines()
            .iter()
            .map(|l| (l.attributes().to_vec(), l.folding().to_vec(), l.end_state()))
            .collect();

        buffer.invalidate_highlighting();
        buffer.ensure_highlighted(6, 0);

        let after: Vec<_> = buffer
            .text()
            .lines()
            .iter()
            .map(|l| (l.attributes().to_vec(), l.folding().to_vec(), l.end_state()))
            .collect();

        assert_eq!(before, after);
        assert!(buffer.text().lines().iter().all(|l| !l.context_changed()));
    }

    #[test]
    fn test_locality_of_edits() {
        let registry = registry();
        let recording = Rc::new(Recording {
            inner: test_language(),
            seen: RefCell::new(Vec::new()),
        });
        let mut buffer = Buffer::from_text(Rc::clone(&registry), &config(), &numbered_lines(20));
        buffer.set_highlight(recording.clone());
        buffer.ensure_highlighted(19, 0);
        let annotations_after: Vec<_> = (12..20).map(|i| buffer.line(i).attributes().to_vec()).collect();
        recording.seen.borrow_mut().clear();

        buffer.edit_start();
        buffer.insert_text(10, 0, "7 ");
        buffer.edit_end();

        // lines 9..=11 only
        assert_eq!(
            *recording.seen.borrow(),
            vec!["line 9".to_string(), "7 line 10".to_string(), "line 11".to_string()]
        );
        let unchanged: Vec<_> = (12..20).map(|i| buffer.line(i).attributes().to_vec()).collect();
        assert_eq!(annotations_after, unchanged);
        assert_eq!(buffer.highlighted_up_to(), 20);
    }

    #[test]
    fn test_watermark_never_drops_without_context_change() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, &numbered_lines(30));
        buffer.ensure_highlighted(29, 0);

        for line in [3, 17, 0, 28, 12] {
            let before = buffer.highlighted_up_to();
            buffer.edit_start();
            buffer.insert_text(line, 0, "1 ");
            buffer.remove_text(line, 0, 2);
            buffer.edit_end();
            assert!(buffer.highlighted_up_to() >= before);
        }
        assert_eq!(buffer.highlighted_up_to(), 30);
    }

    #[test]
    fn test_wrap_adjusts_watermark() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, &numbered_lines(10));
        buffer.ensure_highlighted(5, 0);
        assert_eq!(buffer.highlighted_up_to(), 6);

        buffer.edit_start();
        buffer.wrap_line(2, 2);
        assert_eq!(buffer.highlighted_up_to(), 7);

        // split at the last highlighted line leaves the watermark alone
        buffer.wrap_line(6, 0);
        assert_eq!(buffer.highlighted_up_to(), 7);
        buffer.edit_end();
        assert_eq!(buffer.line_count(), 12);
    }

    #[test]
    fn test_unwrap_adjusts_watermark() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, &numbered_lines(10));
        buffer.ensure_highlighted(5, 0);

        buffer.edit_start();
        buffer.unwrap_line(3);
        assert_eq!(buffer.highlighted_up_to(), 5);

        // merges past the watermark do not affect it
        buffer.unwrap_line(7);
        assert_eq!(buffer.highlighted_up_to(), 5);
        buffer.edit_end();
        assert_eq!(buffer.line_count(), 8);
    }

    #[test]
    fn test_unwrap_lines_range() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, "a\nb\nc\nd\ne");
        buffer.ensure_highlighted(4, 0);
        assert_eq!(buffer.highlighted_up_to(), 5);

        buffer.edit_start();
        buffer.unwrap_lines(1, 2);
        assert_eq!(buffer.text().text(), "a\nbcd\ne");
        assert_eq!(buffer.highlighted_up_to(), 3);

        // at the end of the buffer the last line merges backwards
        buffer.unwrap_lines(2, 2);
        assert_eq!(buffer.text().text(), "a\nbcde");
        assert_eq!(buffer.highlighted_up_to(), 2);
        buffer.edit_end();
    }

    #[test]
    fn test_unwrap_lines_single_line_buffer() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, "only");
        buffer.edit_start();
        buffer.unwrap_lines(0, 0);
        buffer.edit_end();
        assert_eq!(buffer.line_count(), 1);
        assert!(buffer.take_events().is_empty());
    }

    #[test]
    fn test_set_highlight() {
        let registry = registry();
        let mut buffer = Buffer::from_text(Rc::clone(&registry), &config(), "a {");

        let plain: Rc<dyn Highlighter> = Rc::new(LanguageDefinition::plain());
        buffer.set_highlight(Rc::clone(&plain));
        assert_eq!(
            buffer.take_events(),
            vec![BufferEvent::HighlightingChanged { name: "None".to_string() }]
        );

        // same definition again is ignored
        buffer.set_highlight(Rc::clone(&plain));
        assert!(buffer.take_events().is_empty());

        buffer.ensure_highlighted(0, 0);
        assert_eq!(buffer.highlighted_up_to(), 1);
        assert!(buffer.line(0).folding().is_empty());

        let mut lang = LanguageDefinition::new("Styled");
        lang.set_indentation("cstyle");
        lang.add_pattern(
            PatternRule::new("open", r"\{", TokenType::Punctuation, 1)
                .unwrap()
                .with_fold(1),
        );
        buffer.set_highlight(Rc::new(lang));
        assert_eq!(buffer.highlighted_up_to(), 0);
        assert_eq!(buffer.indentation_mode(), Some("cstyle"));
        assert_eq!(Rc::strong_count(&plain), 1);

        buffer.ensure_highlighted(0, 0);
        assert_eq!(buffer.line(0).folding(), &[FoldMarker::new(2, 1)]);
    }

    #[test]
    fn test_set_highlight_mode() {
        let registry = registry();
        let manager = SyntaxManager::new();
        let mut buffer = Buffer::from_text(Rc::clone(&registry), &config(), "fn x() {}");

        buffer.set_highlight_mode(&manager, "Rust").unwrap();
        assert_eq!(buffer.highlight().map(|h| h.name()), Some("Rust"));
        assert_eq!(manager.use_count("Rust"), Some(1));

        assert!(buffer.set_highlight_mode(&manager, "Cobol").is_err());
        assert_eq!(buffer.highlight().map(|h| h.name()), Some("Rust"));

        drop(buffer);
        assert_eq!(manager.use_count("Rust"), Some(0));
    }

    #[test]
    fn test_plain_on_fresh_buffer_keeps_watermark() {
        let registry = registry();
        let mut buffer = Buffer::from_text(Rc::clone(&registry), &config(), "a\nb");
        buffer.highlighted_up_to = 2;
        buffer.set_highlight(Rc::new(LanguageDefinition::plain()));
        assert_eq!(buffer.highlighted_up_to(), 2);
    }

    #[test]
    fn test_tab_width_invalidates_indentation_folding() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, "a\nb");
        buffer.ensure_highlighted(1, 0);

        buffer.set_tab_width(4);
        assert_eq!(buffer.tab_width(), 4);
        assert_eq!(buffer.highlighted_up_to(), 2);

        let mut lang = LanguageDefinition::new("Indented");
        lang.set_folding(FoldingStrategy::IndentationBased);
        buffer.set_highlight(Rc::new(lang));
        buffer.ensure_highlighted(1, 0);

        buffer.set_tab_width(0);
        assert_eq!(buffer.highlighted_up_to(), 2);
        buffer.set_tab_width(2);
        assert_eq!(buffer.highlighted_up_to(), 0);
    }

    #[test]
    fn test_dynamic_overflow_resets_all_buffers() {
        let registry = registry();
        let small = Config {
            max_dynamic_contexts: 2,
            ..config()
        };

        let mut other = buffer_with(&registry, "<<A\nA");
        other.ensure_highlighted(1, 0);
        assert_eq!(other.highlighted_up_to(), 2);

        let mut buffer = Buffer::from_text(
            Rc::clone(&registry),
            &small,
            "<<B\nB\n<<C\nC\nplain\nplain\nplain",
        );
        buffer.set_highlight(test_language());
        buffer.ensure_highlighted(1, 0);
        assert_eq!(registry.live_count(), 2);

        buffer.take_events();
        buffer.ensure_highlighted(4, 0);

        // the limit held: contexts were dropped and everything was redone
        assert_eq!(buffer.max_dynamic_contexts(), 2);
        assert_eq!(buffer.highlighted_up_to(), 4);
        assert!(!registry.reset_suppressed());
        assert_eq!(buffer.take_events(), vec![BufferEvent::AttributesRebuilt]);
        assert_eq!(buffer.line(3).end_state(), LineState::default());

        // the other buffer was told to rebuild as well
        assert_eq!(other.highlighted_up_to(), 0);
        assert_eq!(other.take_events(), vec![BufferEvent::AttributesRebuilt]);
        other.ensure_highlighted(1, 0);
        assert_eq!(other.highlighted_up_to(), 2);
    }

    #[test]
    fn test_dynamic_overflow_during_edit() {
        let registry = registry();
        let small = Config {
            max_dynamic_contexts: 2,
            ..config()
        };
        let mut buffer = Buffer::from_text(
            Rc::clone(&registry),
            &small,
            "<<A\nA\n<<B\nB\nx\ny\nz\nw",
        );
        buffer.set_highlight(test_language());
        buffer.ensure_highlighted(7, 0);
        assert_eq!(registry.live_count(), 2);
        assert_eq!(buffer.highlighted_up_to(), 8);
        buffer.take_events();

        buffer.edit_start();
        buffer.insert_text(5, 0, "1");
        buffer.edit_end();

        // the rebuild replaces the usual change notifications
        assert_eq!(buffer.take_events(), vec![BufferEvent::AttributesRebuilt]);
        assert_eq!(buffer.highlighted_up_to(), 6);
        assert_eq!(buffer.max_dynamic_contexts(), 2);
        assert_eq!(registry.live_count(), 2);
        assert!(!registry.reset_suppressed());
        assert_eq!(
            buffer.line(5).attributes(),
            &[Attribute::new(0, 1, TokenType::Number.id())]
        );
    }

    #[test]
    fn test_dynamic_overflow_doubles_limit_when_reset_refused() {
        let registry = ContextRegistry::shared(&Config {
            dynamic_reset_delay: Duration::from_secs(3600),
            ..Config::default()
        });
        // a recent reset makes the next one refuse
        assert!(registry.reset_all());

        let small = Config {
            max_dynamic_contexts: 1,
            ..config()
        };
        let mut buffer = Buffer::from_text(Rc::clone(&registry), &small, "<<A\nA\n<<B\nB\nx");
        buffer.set_highlight(test_language());
        buffer.take_events();
        buffer.ensure_highlighted(0, 0);
        assert_eq!(registry.live_count(), 1);

        buffer.ensure_highlighted(4, 0);
        assert_eq!(buffer.max_dynamic_contexts(), 2);
        assert_eq!(buffer.highlighted_up_to(), 5);
        assert_eq!(registry.live_count(), 2);
        assert_eq!(buffer.line(4).end_state(), LineState::default());
        assert_eq!(buffer.take_events(), Vec::new());
    }

    #[test]
    fn test_overflow_during_suppressed_reset_grows_limit() {
        let registry = registry();
        let small = Config {
            max_dynamic_contexts: 1,
            ..config()
        };
        let mut buffer = Buffer::from_text(Rc::clone(&registry), &small, "<<A\nA\nx");
        buffer.set_highlight(test_language());
        buffer.ensure_highlighted(0, 0);

        registry.set_suppress_reset(true);
        buffer.ensure_highlighted(2, 0);
        registry.set_suppress_reset(false);

        assert_eq!(buffer.max_dynamic_contexts(), 2);
        assert_eq!(registry.live_count(), 1);
        assert_eq!(buffer.highlighted_up_to(), 3);
    }

    #[test]
    fn test_dropped_buffer_unregisters() {
        let registry = registry();
        let buffer = buffer_with(&registry, "x");
        assert_eq!(registry.open_buffers(), 1);
        drop(buffer);
        assert_eq!(registry.open_buffers(), 0);
    }

    #[test]
    fn test_clear_resets_watermark() {
        let registry = registry();
        let mut buffer = buffer_with(&registry, &numbered_lines(3));
        buffer.ensure_highlighted(2, 0);
        buffer.clear();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.highlighted_up_to(), 0);
    }
}
