//! Protocol-shaped position types and `lsp-types` conversions.

use crate::SourceLocation;
use serde::{Deserialize, Serialize};

/// An LSP wire position: 0-indexed line and UTF-16 column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WirePosition {
    /// 0-indexed line
    pub line: u32,
    /// UTF-16 code-unit column
    pub character: u32,
}

/// An LSP wire range, half-open at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WireRange {
    /// First position of the range
    pub start: WirePosition,
    /// One past the last position of the range
    pub end: WirePosition,
}

/// A wire range tagged with its document URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLocation {
    /// Document URI as a string
    pub uri: String,
    /// Range within the document
    pub range: WireRange,
}

impl From<SourceLocation> for WireRange {
    fn from(loc: SourceLocation) -> Self {
        Self {
            start: WirePosition { line: loc.start_line, character: loc.start_col },
            end: WirePosition { line: loc.end_line, character: loc.end_col },
        }
    }
}

impl From<WirePosition> for lsp_types::Position {
    fn from(p: WirePosition) -> Self {
        Self { line: p.line, character: p.character }
    }
}

impl From<lsp_types::Position> for WirePosition {
    fn from(p: lsp_types::Position) -> Self {
        Self { line: p.line, character: p.character }
    }
}

impl From<WireRange> for lsp_types::Range {
    fn from(r: WireRange) -> Self {
        Self { start: r.start.into(), end: r.end.into() }
    }
}

impl From<SourceLocation> for lsp_types::Range {
    fn from(loc: SourceLocation) -> Self {
        WireRange::from(loc).into()
    }
}
