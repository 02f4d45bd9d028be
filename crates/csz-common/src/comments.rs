//! Comment Preservation
//!
//! Comments are not part of the node tree proper: the external parser attaches
//! them to the nearest node by source position. The emitter threads them
//! through fragment assembly and Babel-tree assembly, emitting each one once.

use crate::position::SourceLocation;
use serde::{Deserialize, Serialize};

/// Where a comment sits relative to the node that owns it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentPlacement {
    #[default]
    Leading,
    Trailing,
}

/// Identity of a comment for "already emitted" bookkeeping.
///
/// Two comments never share a source range, so the range is the identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommentKey {
    pub start: u32,
    pub end: u32,
}

/// A comment attached to a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment text without delimiters.
    pub content: String,
    /// Block (`/* */`) rather than line (`//`) style.
    #[serde(default)]
    pub block: bool,
    #[serde(default)]
    pub placement: CommentPlacement,
    /// The comment occupies its own line(s) in the source.
    #[serde(default)]
    pub new_line: bool,
    pub location: SourceLocation,
}

impl Comment {
    /// Create a line comment.
    pub fn line(content: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            content: content.into(),
            block: false,
            placement: CommentPlacement::Leading,
            new_line: true,
            location,
        }
    }

    /// Create a block comment.
    pub fn block(content: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            content: content.into(),
            block: true,
            placement: CommentPlacement::Leading,
            new_line: true,
            location,
        }
    }

    #[must_use]
    pub fn trailing(mut self) -> Self {
        self.placement = CommentPlacement::Trailing;
        self
    }

    #[must_use]
    pub fn inline(mut self) -> Self {
        self.new_line = false;
        self
    }

    pub const fn key(&self) -> CommentKey {
        CommentKey {
            start: self.location.range.start,
            end: self.location.range.end,
        }
    }

    pub fn is_leading(&self) -> bool {
        self.placement == CommentPlacement::Leading
    }

    /// Render the comment with JavaScript delimiters.
    ///
    /// Continuation lines of block comments are re-indented with `indent`.
    pub fn render(&self, indent: &str) -> String {
        if self.block {
            format_multi_line_comment(&format!("/*{}*/", self.content), indent)
        } else {
            format_single_line_comment(&self.content)
        }
    }
}

/// Format a single-line comment for output.
pub fn format_single_line_comment(content: &str) -> String {
    format!("//{content}")
}

/// Format a multi-line comment for output.
pub fn format_multi_line_comment(text: &str, indent: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= 1 {
        return text.to_string();
    }

    let mut result = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            result.push('\n');
            if !line.trim().is_empty() {
                result.push_str(indent);
            }
        }
        result.push_str(line.trim_start());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Span;

    fn loc(start: u32, end: u32) -> SourceLocation {
        SourceLocation::on_line(0, start, end, Span::new(start, end))
    }

    #[test]
    fn renders_line_and_block_comments() {
        assert_eq!(Comment::line(" hello", loc(0, 7)).render(""), "// hello");
        assert_eq!(Comment::block(" hi ", loc(0, 8)).render(""), "/* hi */");
    }

    #[test]
    fn reindents_block_continuation_lines() {
        let comment = Comment::block("*\n   * Docs\n   ", loc(0, 20));
        assert_eq!(comment.render("  "), "/**\n  * Docs\n  */");
    }

    #[test]
    fn key_is_source_range() {
        let a = Comment::line("a", loc(3, 5));
        let b = Comment::block("a", loc(3, 5));
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), Comment::line("a", loc(4, 5)).key());
    }
}
