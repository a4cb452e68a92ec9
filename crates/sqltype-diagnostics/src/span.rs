//! Source spans carried by expression nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range of a node in the statement text it was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Line/column position resolved against the statement text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Byte offset from start (0-based)
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
}

impl SourceLocation {
    pub const fn new(line: usize, column: usize, offset: usize, length: usize) -> Self {
        Self {
            line,
            column,
            offset,
            length,
        }
    }

    /// Resolve a span against the statement text
    pub fn from_span(span: Span, source: &str) -> Self {
        let (line, column) = offset_to_line_col(source, span.start);
        Self::new(line, column, span.start, span.len())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Convert a byte offset to line and column numbers
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    source
        .char_indices()
        .take_while(|(i, _)| *i < offset)
        .fold((1, 1), |(line, col), (_, ch)| {
            if ch == '\n' { (line + 1, 1) } else { (line, col + 1) }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_offset_to_line_col() {
        let source = "select a\n  from t\nwhere x = 1";
        assert_eq!(offset_to_line_col(source, 0), (1, 1));
        assert_eq!(offset_to_line_col(source, 9), (2, 1));
        assert_eq!(offset_to_line_col(source, 11), (2, 3));
    }

    #[test]
    fn test_location_from_span() {
        let loc = SourceLocation::from_span(Span::new(9, 13), "select a\nfrom t");
        assert_eq!(loc.to_string(), "2:1");
        assert_eq!(loc.length, 4);
    }
}
