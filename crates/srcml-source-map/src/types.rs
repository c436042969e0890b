//! Core types for positions and spans

use std::fmt;

/// A parser-reported point in source text
///
/// Lines are 1-indexed. Columns are 0-indexed and measured in bytes from the
/// start of the line, which is how tree-sitter reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineColumn {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column (0-indexed, in bytes not characters)
    pub column: usize,
}

impl LineColumn {
    pub const fn new(line: usize, column: usize) -> Self {
        LineColumn { line, column }
    }
}

impl fmt::Display for LineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Explicit start and end points of a node, as supplied by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Start point (inclusive)
    pub start: LineColumn,
    /// End point (exclusive)
    pub end: LineColumn,
}

impl Position {
    pub const fn new(start: LineColumn, end: LineColumn) -> Self {
        Position { start, end }
    }
}

/// A half-open byte range `[beg, end)` into a source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    /// Byte offset of the first byte (inclusive)
    pub beg: usize,
    /// Byte offset one past the last byte (exclusive)
    pub end: usize,
}

impl Span {
    pub const fn new(beg: usize, end: usize) -> Self {
        Span { beg, end }
    }

    /// Number of bytes covered, or zero for an inverted span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.beg)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `beg <= end`
    pub fn is_ordered(&self) -> bool {
        self.beg <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.beg, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column_ordering() {
        let a = LineColumn::new(1, 0);
        let b = LineColumn::new(1, 5);
        let c = LineColumn::new(2, 0);

        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
    }

    #[test]
    fn test_span_len_and_empty() {
        assert_eq!(Span::new(3, 7).len(), 4);
        assert!(Span::new(4, 4).is_empty());
        // Inverted spans report zero length rather than underflowing
        assert_eq!(Span::new(7, 3).len(), 0);
        assert!(!Span::new(7, 3).is_ordered());
    }

    #[test]
    fn test_display() {
        assert_eq!(LineColumn::new(3, 4).to_string(), "3:4");
        assert_eq!(Span::new(1, 2).to_string(), "[1, 2)");
    }
}
