//! Line storage with edit transaction bookkeeping
//!
//! Every mutation must happen inside a transaction opened with
//! [`TextBuffer::start_editing`]. While a transaction is open the buffer
//! records the smallest and largest line index touched, expressed in the
//! line numbering after the edit.

use crate::line::Line;

/// An ordered sequence of lines, always at least one
#[derive(Debug)]
pub struct TextBuffer {
    lines: Vec<Line>,
    /// Open transaction count
    editing_transactions: usize,
    editing_changed: bool,
    editing_min_line: Option<usize>,
    editing_max_line: Option<usize>,
    revision: u64,
}

impl TextBuffer {
    /// Create a buffer holding one empty line
    pub fn new() -> Self {
        Self {
            lines: vec![Line::new()],
            editing_transactions: 0,
            editing_changed: false,
            editing_min_line: None,
            editing_max_line: None,
            revision: 0,
        }
    }

    /// Replace the whole content. Not part of any transaction.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text
            .split('\n')
            .map(|line| Line::from(line.strip_suffix('\r').unwrap_or(line)))
            .collect();
        self.revision += 1;
    }

    /// Back to a single empty line
    pub fn clear(&mut self) {
        self.lines = vec![Line::new()];
        self.revision += 1;
    }

    /// Get number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a line by index
    pub fn line(&self, idx: usize) -> &Line {
        assert!(idx < self.lines.len(), "line {} out of range", idx);
        &self.lines[idx]
    }

    pub(crate) fn line_mut(&mut self, idx: usize) -> &mut Line {
        assert!(idx < self.lines.len(), "line {} out of range", idx);
        &mut self.lines[idx]
    }

    /// Get all lines
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Whole content joined with `\n`
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Mutation counter
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Open a transaction. Returns true if this opened the outermost one.
    pub fn start_editing(&mut self) -> bool {
        self.editing_transactions += 1;
        if self.editing_transactions > 1 {
            return false;
        }

        self.editing_changed = false;
        self.editing_min_line = None;
        self.editing_max_line = None;
        true
    }

    /// Close a transaction. Returns true if this closed the outermost one.
    ///
    /// Closing without an open transaction is a caller bug; it is logged and
    /// otherwise ignored.
    pub fn finish_editing(&mut self) -> bool {
        if self.editing_transactions == 0 {
            tracing::warn!("finish_editing without matching start_editing");
            return false;
        }

        self.editing_transactions -= 1;
        self.editing_transactions == 0
    }

    pub fn is_editing(&self) -> bool {
        self.editing_transactions > 0
    }

    /// Whether the current (or last) transaction changed anything
    pub fn editing_changed_buffer(&self) -> bool {
        self.editing_changed
    }

    pub fn editing_minimal_line_changed(&self) -> Option<usize> {
        self.editing_min_line
    }

    pub fn editing_maximal_line_changed(&self) -> Option<usize> {
        self.editing_max_line
    }

    fn assert_editing(&self) {
        assert!(self.is_editing(), "buffer modified outside of a transaction");
    }

    fn mark_changed(&mut self, min: usize, max: usize) {
        self.editing_changed = true;
        self.editing_min_line = Some(self.editing_min_line.map_or(min, |m| m.min(min)));
        self.editing_max_line = Some(max);
        self.revision += 1;
    }

    /// Insert text without newlines at `(line, col)`
    pub fn insert_text(&mut self, line: usize, col: usize, text: &str) {
        self.assert_editing();
        assert!(!text.contains('\n'), "insert_text cannot insert newlines");
        if text.is_empty() {
            return;
        }

        self.line_mut(line).insert_str(col, text);
        let max = self.editing_max_line.map_or(line, |m| m.max(line));
        self.mark_changed(line, max);
    }

    /// Remove `start..end` bytes of `line`, returning the removed text
    pub fn remove_text(&mut self, line: usize, start: usize, end: usize) -> String {
        self.assert_editing();
        assert!(start <= end, "invalid range {}..{}", start, end);
        if start == end {
            return String::new();
        }

        let removed = self.line_mut(line).delete_range(start, end);
        let max = self.editing_max_line.map_or(line, |m| m.max(line));
        self.mark_changed(line, max);
        removed
    }

    /// Split `line` at byte `col`; the remainder becomes line `line + 1`
    pub fn wrap_line(&mut self, line: usize, col: usize) {
        self.assert_editing();
        let remainder = self.line_mut(line).split_off(col);
        self.lines.insert(line + 1, remainder);

        // lines after the split shift down by one
        let max = match self.editing_max_line {
            Some(max) if line <= max => max + 1,
            _ => line + 1,
        };
        self.mark_changed(line, max);
    }

    /// Append `line` to `line - 1` and remove it
    pub fn unwrap_line(&mut self, line: usize) {
        self.assert_editing();
        assert!(
            line >= 1 && line < self.lines.len(),
            "cannot unwrap line {} of {}",
            line,
            self.lines.len()
        );

        let removed = self.lines.remove(line);
        self.lines[line - 1].append(removed);

        let max = match self.editing_max_line {
            Some(max) if line <= max => max - 1,
            _ => line - 1,
        };
        self.mark_changed(line - 1, max);
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
