//! Folding range search
//!
//! Regions are found from the fold markers highlighting leaves on each
//! line. A query for a start line picks the leftmost region that opens on
//! that line and stays open, then walks forward (highlighting lazily) until
//! the matching close marker.

use std::collections::HashMap;

use crate::buffer::Buffer;
use crate::line::FoldMarker;
use crate::syntax::FoldingStrategy;

/// A position in the buffer, column as byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A matched folding region, from the open marker to the close marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldRange {
    pub start: Position,
    pub end: Position,
}

impl FoldRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Leftmost region that opens on a line and is still open at its end.
///
/// Returns the region type and the offset of its first open marker. A close
/// marker without an earlier open of its type on the same line is ignored.
pub fn first_unclosed_region(markers: &[FoldMarker]) -> Option<(i16, usize)> {
    // region type -> (first open offset, open count)
    let mut open: HashMap<i16, (usize, usize)> = HashMap::new();

    for marker in markers {
        if marker.is_close() {
            if let Some(entry) = open.get_mut(&marker.region()) {
                entry.1 -= 1;
                if entry.1 == 0 {
                    open.remove(&marker.region());
                }
            }
            continue;
        }

        open.entry(marker.value)
            .and_modify(|entry| entry.1 += 1)
            .or_insert((marker.offset, 1));
    }

    open.into_iter()
        .map(|(region, (offset, _))| (region, offset))
        .min_by_key(|&(region, offset)| (offset, region))
}

/// Feed one line's markers into the search for the close of `region`.
/// `depth` counts regions still open; returns the offset of the close
/// marker that brings it to zero.
pub fn match_close(markers: &[FoldMarker], region: i16, depth: &mut usize) -> Option<usize> {
    for marker in markers.iter().filter(|m| m.region() == region) {
        if marker.is_open() {
            *depth += 1;
        } else {
            *depth -= 1;
            if *depth == 0 {
                return Some(marker.offset);
            }
        }
    }
    None
}

impl Buffer {
    /// Folding region starting on `start_line`, if any
    pub fn compute_folding_range_for_start_line(&mut self, start_line: usize) -> Option<FoldRange> {
        assert!(
            start_line < self.line_count(),
            "line {} out of range",
            start_line
        );

        let highlight = self.highlight()?;
        if highlight.no_highlighting() {
            return None;
        }

        match highlight.folding_strategy() {
            FoldingStrategy::TokenBased => self.token_folding_range(start_line),
            FoldingStrategy::IndentationBased => None,
        }
    }

    fn token_folding_range(&mut self, start_line: usize) -> Option<FoldRange> {
        let lookahead = self.fold_lookahead();

        self.ensure_highlighted(start_line, lookahead);
        let (region, start_offset) = first_unclosed_region(self.line(start_line).folding())?;

        let mut depth = 1;
        for line in start_line + 1..self.line_count() {
            self.ensure_highlighted(line, lookahead);
            if let Some(offset) = match_close(self.line(line).folding(), region, &mut depth) {
                return Some(FoldRange::new(
                    Position::new(start_line, start_offset),
                    Position::new(line, offset),
                ));
            }
        }

        None
    }
}
