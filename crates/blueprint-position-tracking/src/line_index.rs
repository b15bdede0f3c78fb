//! Line index for byte offset <-> line/UTF-16 column conversion.

use crate::{ByteSpan, SourceLocation};

/// Per-document table of line-start byte offsets.
///
/// Built once per document revision; conversions are O(log n) in the number
/// of lines. Handles LF and CRLF line endings (a bare CR also terminates a
/// line, matching how editors count them).
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    text_len: usize,
}

impl LineIndex {
    /// Builds the index for `text`.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' => {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        line_starts.push(i + 2);
                        i += 1;
                    } else {
                        line_starts.push(i + 1);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        Self { line_starts, text_len: text.len() }
    }

    /// Number of lines in the indexed document (at least 1).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset at which `line` starts, clamped to the last line.
    pub fn line_start(&self, line: usize) -> usize {
        let line = line.min(self.line_starts.len() - 1);
        self.line_starts[line]
    }

    /// Converts a byte offset to `(line, utf16_column)`.
    ///
    /// The offset is clamped to the document length. Columns count UTF-16
    /// code units per the LSP position encoding.
    pub fn offset_to_position(&self, text: &str, offset: usize) -> (u32, u32) {
        let offset = offset.min(text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let col: usize = text
            .get(line_start..offset)
            .map(|s| s.chars().map(char::len_utf16).sum())
            .unwrap_or(0);
        (line as u32, col as u32)
    }

    /// Converts `(line, utf16_column)` back to a byte offset.
    ///
    /// Positions past the end of a line clamp to the line's content end;
    /// lines past the end of the document clamp to the document end.
    pub fn position_to_offset(&self, text: &str, line: u32, character: u32) -> usize {
        let line = line as usize;
        if line >= self.line_starts.len() {
            return text.len();
        }
        let line_start = self.line_starts[line];
        let line_end = if line + 1 < self.line_starts.len() {
            // Exclude the trailing line break from addressable columns.
            let mut end = self.line_starts[line + 1];
            let bytes = text.as_bytes();
            while end > line_start && matches!(bytes.get(end - 1), Some(b'\n') | Some(b'\r')) {
                end -= 1;
            }
            end
        } else {
            text.len()
        };
        let Some(line_text) = text.get(line_start..line_end) else {
            return text.len();
        };

        let mut utf16 = 0usize;
        let mut byte = 0usize;
        for ch in line_text.chars() {
            if utf16 >= character as usize {
                break;
            }
            utf16 += ch.len_utf16();
            byte += ch.len_utf8();
        }
        line_start + byte
    }

    /// Resolves a byte span into a full [`SourceLocation`].
    pub fn locate(&self, text: &str, span: ByteSpan) -> SourceLocation {
        let (start_line, start_col) = self.offset_to_position(text, span.start);
        let (end_line, end_col) = self.offset_to_position(text, span.end);
        SourceLocation { span, start_line, start_col, end_line, end_col }
    }

    /// Length of the text the index was built from.
    pub fn text_len(&self) -> usize {
        self.text_len
    }
}
