//! Source positions for nodes, fragments and comments.
//!
//! Lines are zero-based (the parser's convention); columns are zero-based and
//! the end position is exclusive. The Babel printer converts lines to the
//! one-based numbering external tools expect.

use serde::{Deserialize, Serialize};

/// A line/column position in the source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A byte range `[start, end)` in the source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// The full location of a node: start/end positions plus the byte range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
    pub range: Span,
}

impl SourceLocation {
    pub const fn new(start: Position, end: Position, range: Span) -> Self {
        Self { start, end, range }
    }

    /// Location spanning a single line.
    pub const fn on_line(line: u32, start_column: u32, end_column: u32, range: Span) -> Self {
        Self {
            start: Position::new(line, start_column),
            end: Position::new(line, end_column),
            range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_location_shares_its_line() {
        let loc = SourceLocation::on_line(3, 4, 9, Span::new(40, 45));
        assert_eq!(loc.start, Position::new(3, 4));
        assert_eq!(loc.end, Position::new(3, 9));
        assert!(loc.start < loc.end);
    }

    #[test]
    fn span_len_saturates() {
        assert_eq!(Span::new(3, 10).len(), 7);
        assert_eq!(Span::new(10, 3).len(), 0);
        assert!(Span::new(5, 5).is_empty());
    }
}
