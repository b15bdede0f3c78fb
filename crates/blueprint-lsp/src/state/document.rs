//! Open document state.
//!
//! Rope-backed content with the parse products cached alongside. The rope
//! absorbs incremental `didChange` edits in O(log n); the cached string,
//! line index, CST, and AST are rebuilt per revision (parsing is eager,
//! derived indexes are invalidated lazily).

use blueprint_ast::{Document, build_document};
use blueprint_parser::{ParseTree, parse};
use blueprint_position_tracking::LineIndex;
use lsp_types::TextDocumentContentChangeEvent;
use ropey::Rope;

/// One open document and its parse products.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Rope-backed content, authoritative for edits
    pub rope: Rope,
    /// Cached string copy, synchronized with the rope
    pub text: String,
    /// LSP document version
    pub version: i32,
    /// Line-start table for the current text
    pub line_index: LineIndex,
    /// Concrete syntax tree for the current text
    pub tree: ParseTree,
    /// Typed document model for the current text
    pub document: Document,
}

impl DocumentState {
    /// Creates state for newly opened content.
    pub fn new(text: &str, version: i32) -> Self {
        let rope = Rope::from_str(text);
        let line_index = LineIndex::new(text);
        let tree = parse(text);
        let document = build_document(&tree, text, &line_index);
        Self { rope, text: text.to_string(), version, line_index, tree, document }
    }

    /// Applies `didChange` edits and reparses.
    ///
    /// Range positions are interpreted against the state the change was
    /// produced for, which the client guarantees by sending changes in
    /// order. A change without a range replaces the whole document.
    pub fn apply_changes(&mut self, changes: &[TextDocumentContentChangeEvent], version: i32) {
        for change in changes {
            match change.range {
                Some(range) => {
                    let start = self.offset_at(range.start);
                    let end = self.offset_at(range.end);
                    let start_char = self.rope.byte_to_char(start.min(self.rope.len_bytes()));
                    let end_char = self.rope.byte_to_char(end.min(self.rope.len_bytes()));
                    self.rope.remove(start_char..end_char);
                    self.rope.insert(start_char, &change.text);
                }
                None => {
                    self.rope = Rope::from_str(&change.text);
                }
            }
            // Positions of subsequent changes refer to the updated text.
            self.text = self.rope.to_string();
            self.line_index = LineIndex::new(&self.text);
        }
        self.version = version;
        self.reparse();
    }

    fn reparse(&mut self) {
        self.tree = parse(&self.text);
        self.document = build_document(&self.tree, &self.text, &self.line_index);
    }

    /// Byte offset of an LSP position in the current text.
    pub fn offset_at(&self, position: lsp_types::Position) -> usize {
        self.line_index.position_to_offset(&self.text, position.line, position.character)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::{Position, Range};
    use pretty_assertions::assert_eq;

    fn change(range: Option<Range>, text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent { range, range_length: None, text: text.to_string() }
    }

    fn range(sl: u32, sc: u32, el: u32, ec: u32) -> Range {
        Range { start: Position::new(sl, sc), end: Position::new(el, ec) }
    }

    #[test]
    fn test_full_replacement() {
        let mut doc = DocumentState::new("@module a\n", 1);
        doc.apply_changes(&[change(None, "@module b\n")], 2);
        assert_eq!(doc.text, "@module b\n");
        assert_eq!(doc.version, 2);
        assert_eq!(doc.document.modules[0].name, "b");
    }

    #[test]
    fn test_incremental_insert() {
        let mut doc = DocumentState::new("@module auth\n", 1);
        // Append a feature line.
        doc.apply_changes(&[change(Some(range(1, 0, 1, 0)), "@feature login\n")], 2);
        assert_eq!(doc.text, "@module auth\n@feature login\n");
        assert_eq!(doc.document.modules[0].features.len(), 1);
    }

    #[test]
    fn test_incremental_edit_mid_line() {
        let mut doc = DocumentState::new("@module auth\n", 1);
        // Replace "auth" with "sessions".
        doc.apply_changes(&[change(Some(range(0, 8, 0, 12)), "sessions")], 2);
        assert_eq!(doc.text, "@module sessions\n");
        assert_eq!(doc.document.modules[0].name, "sessions");
    }

    #[test]
    fn test_sequential_changes_in_one_batch() {
        let mut doc = DocumentState::new("@module a\n", 1);
        doc.apply_changes(
            &[
                change(Some(range(1, 0, 1, 0)), "@feature f\n"),
                change(Some(range(2, 0, 2, 0)), "@requirement r\n"),
            ],
            2,
        );
        assert_eq!(doc.text, "@module a\n@feature f\n@requirement r\n");
        assert_eq!(doc.document.modules[0].features[0].requirements.len(), 1);
    }
}
