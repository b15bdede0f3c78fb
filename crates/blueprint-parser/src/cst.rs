//! Concrete syntax tree node type and accessors.

use crate::SyntaxKind;
use blueprint_position_tracking::ByteSpan;

/// Field labels attached to child nodes.
///
/// The grammar exposes a small set of named fields; `name` carries the
/// declaration identifier of a block node, `language` the info string of a
/// fenced code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Declaration name of a block node
    Name,
    /// Language tag of a code block fence
    Language,
}

/// A node in the concrete syntax tree.
///
/// The CST is lossless about structure but not about trivia: blank lines are
/// dropped, comments are kept as child nodes in document order. Every node
/// records its byte span; line/column positions are resolved on demand
/// through a `LineIndex`.
#[derive(Debug, Clone)]
pub struct CstNode {
    /// Node kind
    pub kind: SyntaxKind,
    /// Byte span covering the node and all of its children
    pub span: ByteSpan,
    /// Field label assigned by the parent, if any
    pub field: Option<Field>,
    /// Child nodes in document order
    pub children: Vec<CstNode>,
    /// True when this node or any descendant is an ERROR node
    pub has_error: bool,
}

impl CstNode {
    pub(crate) fn new(kind: SyntaxKind, span: ByteSpan) -> Self {
        Self { kind, span, field: None, children: Vec::new(), has_error: kind == SyntaxKind::Error }
    }

    pub(crate) fn token(kind: SyntaxKind, span: ByteSpan, field: Option<Field>) -> Self {
        Self { kind, span, field, children: Vec::new(), has_error: kind == SyntaxKind::Error }
    }

    pub(crate) fn push(&mut self, child: CstNode) {
        self.has_error |= child.has_error;
        if child.span.end > self.span.end {
            self.span.end = child.span.end;
        }
        self.children.push(child);
    }

    /// The child carrying the given field label.
    pub fn field(&self, field: Field) -> Option<&CstNode> {
        self.children.iter().find(|c| c.field == Some(field))
    }

    /// The `name` field child of a block node.
    pub fn name_field(&self) -> Option<&CstNode> {
        self.field(Field::Name)
    }

    /// Children of the given kind, in document order.
    pub fn children_of(&self, kind: SyntaxKind) -> impl Iterator<Item = &CstNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// First child of the given kind.
    pub fn first_child_of(&self, kind: SyntaxKind) -> Option<&CstNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// The text this node spans, or `""` when the span is stale for `source`.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source).unwrap_or("")
    }

    /// Depth-first pre-order traversal of this subtree, including `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// The deepest node whose span contains `offset`.
    ///
    /// Ties between adjacent children resolve to the later child, matching
    /// cursor-at-boundary behavior expected by hover and completion.
    pub fn node_at_offset(&self, offset: usize) -> Option<&CstNode> {
        let hit = self.span.contains(offset) || (self.span.is_empty() && self.span.start == offset);
        if !hit {
            return None;
        }
        for child in self.children.iter().rev() {
            if let Some(hit) = child.node_at_offset(offset) {
                return Some(hit);
            }
        }
        Some(self)
    }
}

/// Iterator over a subtree in depth-first pre-order.
pub struct Descendants<'a> {
    stack: Vec<&'a CstNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a CstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: SyntaxKind, start: usize, end: usize) -> CstNode {
        CstNode::token(kind, ByteSpan::new(start, end), None)
    }

    #[test]
    fn test_push_extends_span_and_error_flag() {
        let mut node = CstNode::new(SyntaxKind::ModuleBlock, ByteSpan::new(0, 10));
        node.push(leaf(SyntaxKind::Identifier, 8, 12));
        assert_eq!(node.span, ByteSpan::new(0, 12));
        assert!(!node.has_error);
        node.push(leaf(SyntaxKind::Error, 13, 20));
        assert!(node.has_error);
        assert_eq!(node.span.end, 20);
    }

    #[test]
    fn test_node_at_offset_picks_deepest() {
        let mut root = CstNode::new(SyntaxKind::SourceFile, ByteSpan::new(0, 20));
        let mut module = CstNode::new(SyntaxKind::ModuleBlock, ByteSpan::new(0, 20));
        module.push(leaf(SyntaxKind::Identifier, 8, 12));
        root.push(module);

        let hit = root.node_at_offset(9).map(|n| n.kind);
        assert_eq!(hit, Some(SyntaxKind::Identifier));
        let hit = root.node_at_offset(2).map(|n| n.kind);
        assert_eq!(hit, Some(SyntaxKind::ModuleBlock));
    }

    #[test]
    fn test_descendants_order() {
        let mut root = CstNode::new(SyntaxKind::SourceFile, ByteSpan::new(0, 10));
        let mut module = CstNode::new(SyntaxKind::ModuleBlock, ByteSpan::new(0, 10));
        module.push(leaf(SyntaxKind::Identifier, 0, 3));
        module.push(leaf(SyntaxKind::Comment, 4, 8));
        root.push(module);

        let kinds: Vec<_> = root.descendants().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::SourceFile,
                SyntaxKind::ModuleBlock,
                SyntaxKind::Identifier,
                SyntaxKind::Comment,
            ]
        );
    }
}
