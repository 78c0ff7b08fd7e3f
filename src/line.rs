//! Line representation and highlighting annotations

use crate::syntax::{HighlightResult, LineState};

/// A run of text sharing one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// Byte offset where the run starts
    pub offset: usize,
    /// Length of the run in bytes
    pub length: usize,
    /// Attribute id (a [`crate::syntax::TokenType`] id)
    pub attribute: u16,
}

impl Attribute {
    pub fn new(offset: usize, length: usize, attribute: u16) -> Self {
        Self {
            offset,
            length,
            attribute,
        }
    }

    /// Byte offset one past the end of the run
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Folding marker placed by highlighting.
///
/// A positive value opens a region of that type, a negative value closes a
/// region of type `-value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldMarker {
    /// Byte offset of the marker
    pub offset: usize,
    /// Signed region type
    pub value: i16,
}

impl FoldMarker {
    pub fn new(offset: usize, value: i16) -> Self {
        Self { offset, value }
    }

    pub fn is_open(&self) -> bool {
        self.value > 0
    }

    pub fn is_close(&self) -> bool {
        self.value < 0
    }

    /// Region type regardless of direction
    pub fn region(&self) -> i16 {
        self.value.abs()
    }
}

/// A single line of text in a buffer
#[derive(Debug, Clone, Default)]
pub struct Line {
    /// The text content (without trailing newline)
    text: String,
    /// Attribute runs from the last highlight
    attributes: Vec<Attribute>,
    /// Fold markers from the last highlight
    folding: Vec<FoldMarker>,
    /// Lexer state at the end of this line
    end_state: LineState,
    /// Whether the last highlight changed `end_state`
    context_changed: bool,
}

impl Line {
    /// Create a new empty line
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a line from a string
    pub fn from_string(s: String) -> Self {
        Self {
            text: s,
            ..Self::default()
        }
    }

    /// Get the text content
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the line is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn folding(&self) -> &[FoldMarker] {
        &self.folding
    }

    pub fn end_state(&self) -> LineState {
        self.end_state
    }

    pub fn context_changed(&self) -> bool {
        self.context_changed
    }

    /// Replace the annotations with a fresh highlight.
    /// Returns whether the end state changed.
    pub fn apply_highlight(&mut self, result: HighlightResult) -> bool {
        self.context_changed = self.end_state != result.end_state;
        self.attributes = result.attributes;
        self.folding = result.folding;
        self.end_state = result.end_state;
        self.context_changed
    }

    /// Insert a string at byte position
    pub fn insert_str(&mut self, byte_pos: usize, s: &str) {
        self.text.insert_str(byte_pos, s);
    }

    /// Delete a range of bytes and return the deleted text
    pub fn delete_range(&mut self, start: usize, end: usize) -> String {
        let deleted = self.text[start..end].to_string();
        self.text.replace_range(start..end, "");
        deleted
    }

    /// Split the line at byte position, returning the remainder.
    /// The remainder starts without annotations.
    pub fn split_off(&mut self, byte_pos: usize) -> Line {
        Line::from_string(self.text.split_off(byte_pos))
    }

    /// Append another line's content to this line
    pub fn append(&mut self, other: Line) {
        self.text.push_str(other.text());
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Self::from_string(s.to_string())
    }
}

impl From<String> for Line {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}
