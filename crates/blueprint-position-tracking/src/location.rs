//! Resolved source locations combining byte and line/column coordinates.

use crate::ByteSpan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved source location.
///
/// Carries the byte span together with its 0-indexed line/column endpoints.
/// Columns are UTF-16 code units and the end position is exclusive, matching
/// the LSP position encoding. Produced by
/// [`LineIndex::locate`](crate::LineIndex::locate); the two coordinate systems
/// always describe the same region of the same document revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Byte span in the source text
    pub span: ByteSpan,
    /// 0-indexed line of the first byte
    pub start_line: u32,
    /// UTF-16 column of the first byte
    pub start_col: u32,
    /// 0-indexed line one past the last byte
    pub end_line: u32,
    /// UTF-16 column one past the last byte
    pub end_col: u32,
}

impl SourceLocation {
    /// Whether the location contains the given `(line, utf16_column)` point.
    ///
    /// The end position is exclusive, consistent with half-open spans.
    pub fn contains_position(&self, line: u32, character: u32) -> bool {
        if line < self.start_line || (line == self.start_line && character < self.start_col) {
            return false;
        }
        if line > self.end_line || (line == self.end_line && character >= self.end_col) {
            return false;
        }
        true
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}..{}:{}", self.start_line, self.start_col, self.end_line, self.end_col)
    }
}
