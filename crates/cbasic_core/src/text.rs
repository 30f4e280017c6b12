//! Source positions and line indexing.
//!
//! Tokens and diagnostics carry 1-based line/column pairs where the column
//! counts characters. Rendering a diagnostic against the source needs byte
//! offsets, so `LineIndex` converts between the two.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// A 1-based line/column position. Columns count characters, not bytes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span in source text, defined by a byte offset and a byte length.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextSpan {
    pub start: usize,
    pub length: usize,
}

impl TextSpan {
    #[inline]
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// The end offset of this span (exclusive).
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

/// A map from 1-based positions to byte offsets, built from source text.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offsets of the start of each line.
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Build a line index from source text.
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { text, line_starts }
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The text of a 1-based line, without its line terminator.
    pub fn line_text(&self, line: u32) -> Option<&'a str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        Some(self.text[start..end].trim_end_matches('\r'))
    }

    /// Byte offset of a 1-based position, clamped to the end of its line
    /// (or the end of the text for positions past the last line).
    pub fn offset_of(&self, pos: Position) -> usize {
        let Some(line) = self.line_text(pos.line) else {
            return self.text.len();
        };
        let line_start = self.line_starts[pos.line as usize - 1];
        let skip = (pos.column.max(1) - 1) as usize;
        let within = line
            .char_indices()
            .nth(skip)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        line_start + within
    }

    /// A span covering `length` characters starting at `pos`, clipped to
    /// the line so labels never run past a line break.
    pub fn span_of(&self, pos: Position, length: usize) -> TextSpan {
        let start = self.offset_of(pos);
        let rest = &self.text[start..];
        let line_rest = rest.split('\n').next().unwrap_or("");
        let bytes: usize = line_rest.chars().take(length).map(char::len_utf8).sum();
        TextSpan::new(start, bytes)
    }

    /// The 1-based position of a byte offset.
    pub fn position_of(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line - 1,
        };
        let start = self.line_starts[line];
        let end = offset.min(self.text.len());
        let column = self.text[start..end].chars().count() + 1;
        Position::new(line as u32 + 1, column as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_span() {
        let span = TextSpan::new(5, 10);
        assert_eq!(span.end(), 15);
        assert_eq!(span.to_range(), 5..15);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_line_index_offsets() {
        let text = "PRINT 1\nLET x = 2\nEND";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.offset_of(Position::new(1, 1)), 0);
        assert_eq!(index.offset_of(Position::new(2, 5)), 12);
        assert_eq!(index.line_text(2), Some("LET x = 2"));
        assert_eq!(index.line_text(4), None);
    }

    #[test]
    fn test_line_index_counts_characters() {
        let text = "PRINT \"héllo\" x";
        let index = LineIndex::new(text);
        // 'x' is the 15th character but sits at byte 15 because of the accent.
        assert_eq!(index.offset_of(Position::new(1, 15)), 15);
        assert_eq!(index.position_of(15), Position::new(1, 15));
    }

    #[test]
    fn test_span_clipped_to_line() {
        let index = LineIndex::new("AB\nCD");
        let span = index.span_of(Position::new(1, 2), 10);
        assert_eq!(span, TextSpan::new(1, 1));
    }

    #[test]
    fn test_position_past_end() {
        let index = LineIndex::new("A");
        assert_eq!(index.offset_of(Position::new(9, 1)), 1);
        assert_eq!(index.position_of(1), Position::new(1, 2));
    }
}
