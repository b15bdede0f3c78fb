//! Line-oriented recovering parser for the Blueprint DSL.
//!
//! The grammar is directive-driven: every structural line starts with an
//! `@keyword`, nesting is determined by directive kind (a `@feature` attaches
//! to the most recent `@module`, a `@requirement` to the most recent open
//! `@feature` or `@module`, and so on). Indentation is accepted but carries
//! no meaning. Malformed input never aborts the parse; the offending
//! fragment becomes an `ERROR` node and well-formed siblings stay reachable.

use crate::{CstNode, Field, SyntaxError, SyntaxKind};
use blueprint_position_tracking::ByteSpan;

/// Result of parsing one document.
#[derive(Debug, Clone)]
pub struct ParseTree {
    /// Root `source_file` node
    pub root: CstNode,
    /// Recovered syntax errors, in document order
    pub errors: Vec<SyntaxError>,
}

impl ParseTree {
    /// Whether any ERROR node was produced.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.root.has_error
    }
}

/// Parses `text` into a [`ParseTree`].
///
/// Convenience wrapper around [`Parser`].
pub fn parse(text: &str) -> ParseTree {
    Parser::new(text).parse()
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// An open block on the containment stack.
struct OpenBlock {
    node: CstNode,
    /// Close by wrapping in an ERROR node (misplaced directive).
    wrap_error: bool,
}

enum LineMode {
    Normal,
    /// Inside `/* ... */`, carrying the comment start offset.
    BlockComment { start: usize },
    /// Inside a fenced code block, carrying the partially built node and the
    /// span of content lines seen so far.
    CodeFence { node: CstNode, content: Option<ByteSpan> },
}

/// Blueprint DSL parser.
///
/// One parser instance parses one document text in full; instances are not
/// shared. Incrementality lives a layer above (documents re-parse on change
/// and downstream indexes replace the file's slice atomically).
pub struct Parser<'a> {
    text: &'a str,
    stack: Vec<OpenBlock>,
    errors: Vec<SyntaxError>,
    mode: LineMode,
    seen_module: bool,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `text`.
    pub fn new(text: &'a str) -> Self {
        let root = CstNode::new(SyntaxKind::SourceFile, ByteSpan::new(0, text.len()));
        Self {
            text,
            stack: vec![OpenBlock { node: root, wrap_error: false }],
            errors: Vec::new(),
            mode: LineMode::Normal,
            seen_module: false,
        }
    }

    /// Parses the document.
    pub fn parse(mut self) -> ParseTree {
        let mut line_start = 0;
        for line in self.text.split_inclusive('\n') {
            self.line(line_start, line);
            line_start += line.len();
        }
        self.finish_open_modes();
        while self.stack.len() > 1 {
            self.close_one();
        }
        let Some(top) = self.stack.pop() else {
            // Stack always holds the root; unreachable in practice.
            return ParseTree {
                root: CstNode::new(SyntaxKind::SourceFile, ByteSpan::empty(0)),
                errors: self.errors,
            };
        };
        let mut root = top.node;
        root.span = ByteSpan::new(0, self.text.len());
        ParseTree { root, errors: self.errors }
    }

    // ------------------------------------------------------------------
    // Line dispatch
    // ------------------------------------------------------------------

    fn line(&mut self, line_start: usize, raw_line: &str) {
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let line_end = line_start + line.len();

        match std::mem::replace(&mut self.mode, LineMode::Normal) {
            LineMode::BlockComment { start } => {
                if let Some(close) = line.find("*/") {
                    let end = line_start + close + 2;
                    self.attach(CstNode::token(SyntaxKind::Comment, ByteSpan::new(start, end), None));
                } else {
                    self.mode = LineMode::BlockComment { start };
                }
                return;
            }
            LineMode::CodeFence { mut node, content } => {
                if line.trim_start().starts_with("```") {
                    if let Some(span) = content {
                        node.push(CstNode::token(SyntaxKind::DescriptionText, span, None));
                    }
                    node.span.end = line_end;
                    self.attach(node);
                } else {
                    let grown = match content {
                        None => ByteSpan::new(line_start, line_end),
                        Some(span) => ByteSpan::new(span.start, line_end),
                    };
                    self.mode = LineMode::CodeFence { node, content: Some(grown) };
                }
                return;
            }
            LineMode::Normal => {}
        }

        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            return;
        }
        let content_start = line_start + (line.len() - trimmed.len());

        if trimmed.starts_with("//") {
            self.attach(CstNode::token(
                SyntaxKind::Comment,
                ByteSpan::new(content_start, line_end),
                None,
            ));
            return;
        }
        if trimmed.starts_with("/*") {
            if let Some(close) = trimmed.find("*/") {
                let end = content_start + close + 2;
                self.attach(CstNode::token(SyntaxKind::Comment, ByteSpan::new(content_start, end), None));
            } else {
                self.mode = LineMode::BlockComment { start: content_start };
            }
            return;
        }
        if let Some(info) = trimmed.strip_prefix("```") {
            let mut node = CstNode::new(SyntaxKind::CodeBlock, ByteSpan::new(content_start, line_end));
            let lang = info.trim();
            if !lang.is_empty() {
                let lang_start = content_start + 3 + (info.len() - info.trim_start().len());
                node.push(CstNode::token(
                    SyntaxKind::Identifier,
                    ByteSpan::new(lang_start, lang_start + lang.len()),
                    Some(Field::Language),
                ));
            }
            self.mode = LineMode::CodeFence { node, content: None };
            return;
        }
        if trimmed.starts_with('@') {
            self.directive(content_start, line_end);
            return;
        }

        // Free text: description content when a block is open, an error at
        // the top level.
        let span = ByteSpan::new(content_start, line_start + line.trim_end().len());
        if self.stack.len() == 1 {
            self.error_node("expected a directive", span);
        } else {
            self.attach(CstNode::token(SyntaxKind::DescriptionText, span, None));
        }
    }

    // ------------------------------------------------------------------
    // Directives
    // ------------------------------------------------------------------

    fn directive(&mut self, start: usize, mut line_end: usize) {
        // Split off a trailing line comment before reading operands.
        let mut trailing_comment = None;
        let content = &self.text[start..line_end];
        if let Some(slashes) = content.find("//") {
            let comment_start = start + slashes;
            trailing_comment =
                Some(CstNode::token(SyntaxKind::Comment, ByteSpan::new(comment_start, line_end), None));
            line_end = start + content[..slashes].trim_end().len();
        }

        let bytes = self.text.as_bytes();
        let mut kw_end = start + 1;
        while kw_end < line_end && (is_ident_char(bytes[kw_end])) {
            kw_end += 1;
        }
        let keyword = &self.text[start..kw_end];
        let kw_span = ByteSpan::new(start, kw_end);

        match keyword {
            "@description" => {
                self.close_to_source_file();
                let node = CstNode::new(SyntaxKind::DescriptionBlock, kw_span);
                self.stack.push(OpenBlock { node, wrap_error: false });
                self.expect_no_operands(kw_end, line_end, keyword);
            }
            "@module" => {
                self.close_to_source_file();
                let mut node = CstNode::new(SyntaxKind::ModuleBlock, kw_span);
                self.parse_name(&mut node, kw_end, line_end, keyword);
                self.seen_module = true;
                self.stack.push(OpenBlock { node, wrap_error: false });
            }
            "@feature" => {
                self.close_until(&[SyntaxKind::ModuleBlock]);
                let wrap_error = self.misplaced(keyword, "@module", kw_span);
                let mut node = CstNode::new(SyntaxKind::FeatureBlock, kw_span);
                self.parse_name(&mut node, kw_end, line_end, keyword);
                self.stack.push(OpenBlock { node, wrap_error });
            }
            "@requirement" => {
                self.close_until(&[SyntaxKind::FeatureBlock, SyntaxKind::ModuleBlock]);
                let wrap_error = self.misplaced(keyword, "@module or @feature", kw_span);
                let mut node = CstNode::new(SyntaxKind::RequirementBlock, kw_span);
                self.parse_name(&mut node, kw_end, line_end, keyword);
                self.stack.push(OpenBlock { node, wrap_error });
            }
            "@constraint" => {
                self.close_until(&[
                    SyntaxKind::RequirementBlock,
                    SyntaxKind::FeatureBlock,
                    SyntaxKind::ModuleBlock,
                ]);
                let wrap_error = self.misplaced(keyword, "a containing block", kw_span);
                let mut node = CstNode::new(SyntaxKind::Constraint, kw_span);
                self.parse_name(&mut node, kw_end, line_end, keyword);
                // Constraints stay open for description text only; the next
                // directive closes them.
                self.stack.push(OpenBlock { node, wrap_error });
            }
            "@depends-on" => {
                self.close_until(&[
                    SyntaxKind::RequirementBlock,
                    SyntaxKind::FeatureBlock,
                    SyntaxKind::ModuleBlock,
                ]);
                let mut node = CstNode::new(SyntaxKind::DependsOn, kw_span);
                self.parse_references(&mut node, kw_end, line_end);
                if self.stack.len() == 1 {
                    self.errors.push(SyntaxError::new(
                        "@depends-on is only allowed inside a containing block",
                        kw_span,
                    ));
                    let mut err = CstNode::new(SyntaxKind::Error, node.span);
                    err.push(node);
                    self.attach(err);
                } else {
                    self.attach(node);
                }
            }
            _ => {
                self.error_node(
                    format!("unknown directive '{keyword}'"),
                    ByteSpan::new(start, line_end),
                );
            }
        }

        if let Some(comment) = trailing_comment {
            self.attach(comment);
        }
    }

    /// Records a misplacement error when the directive landed at the top
    /// level; the block is still parsed, wrapped in ERROR on close.
    fn misplaced(&mut self, keyword: &str, wanted: &str, span: ByteSpan) -> bool {
        if self.stack.len() == 1 {
            self.errors
                .push(SyntaxError::new(format!("{keyword} must appear inside {wanted}"), span));
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------
    // Operand parsing
    // ------------------------------------------------------------------

    fn parse_name(&mut self, node: &mut CstNode, mut pos: usize, line_end: usize, keyword: &str) {
        let bytes = self.text.as_bytes();
        while pos < line_end && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let name_start = pos;
        while pos < line_end && is_ident_char(bytes[pos]) {
            pos += 1;
        }
        if pos == name_start {
            self.errors.push(SyntaxError::new(
                format!("expected a name after {keyword}"),
                ByteSpan::new(node.span.start, node.span.end),
            ));
            node.push(CstNode::token(SyntaxKind::Error, ByteSpan::new(node.span.start, node.span.end), None));
            return;
        }
        node.push(CstNode::token(
            SyntaxKind::Identifier,
            ByteSpan::new(name_start, pos),
            Some(Field::Name),
        ));
        let rest = self.text[pos..line_end].trim();
        if !rest.is_empty() {
            let junk_start = pos + (self.text[pos..line_end].len()
                - self.text[pos..line_end].trim_start().len());
            self.errors.push(SyntaxError::new(
                format!("unexpected tokens after {keyword} name"),
                ByteSpan::new(junk_start, line_end),
            ));
            node.push(CstNode::token(SyntaxKind::Error, ByteSpan::new(junk_start, line_end), None));
        }
    }

    fn expect_no_operands(&mut self, pos: usize, line_end: usize, keyword: &str) {
        let rest = self.text[pos..line_end].trim();
        if !rest.is_empty() {
            let junk_start =
                pos + (self.text[pos..line_end].len() - self.text[pos..line_end].trim_start().len());
            self.errors.push(SyntaxError::new(
                format!("{keyword} takes no operands"),
                ByteSpan::new(junk_start, line_end),
            ));
            let junk = CstNode::token(SyntaxKind::Error, ByteSpan::new(junk_start, line_end), None);
            if let Some(open) = self.stack.last_mut() {
                open.node.push(junk);
            }
        }
    }

    /// Parses the comma-separated reference list of a `@depends-on`.
    fn parse_references(&mut self, node: &mut CstNode, mut pos: usize, line_end: usize) {
        let bytes = self.text.as_bytes();
        loop {
            while pos < line_end && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos >= line_end {
                break;
            }
            if !is_ident_char(bytes[pos]) {
                // Junk up to the next separator keeps later references alive.
                let junk_start = pos;
                while pos < line_end && bytes[pos] != b',' {
                    pos += 1;
                }
                self.errors.push(SyntaxError::new(
                    "expected a reference",
                    ByteSpan::new(junk_start, pos),
                ));
                node.push(CstNode::token(SyntaxKind::Error, ByteSpan::new(junk_start, pos), None));
                if pos < line_end {
                    pos += 1; // consume ','
                    continue;
                }
                break;
            }

            let mut reference = CstNode::new(SyntaxKind::Reference, ByteSpan::empty(pos));
            loop {
                let part_start = pos;
                while pos < line_end && is_ident_char(bytes[pos]) {
                    pos += 1;
                }
                reference.push(CstNode::token(
                    SyntaxKind::Identifier,
                    ByteSpan::new(part_start, pos),
                    None,
                ));
                if pos < line_end && bytes[pos] == b'.' {
                    if pos + 1 < line_end && is_ident_char(bytes[pos + 1]) {
                        pos += 1;
                        continue;
                    }
                    // Dangling dot: keep the parts parsed so far.
                    self.errors.push(SyntaxError::new(
                        "expected an identifier after '.'",
                        ByteSpan::new(pos, pos + 1),
                    ));
                    reference.push(CstNode::token(
                        SyntaxKind::Error,
                        ByteSpan::new(pos, pos + 1),
                        None,
                    ));
                    pos += 1;
                }
                break;
            }
            node.push(reference);

            while pos < line_end && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos < line_end && bytes[pos] == b',' {
                pos += 1;
                continue;
            }
            if pos < line_end {
                self.errors.push(SyntaxError::new(
                    "expected ',' between references",
                    ByteSpan::new(pos, line_end),
                ));
                node.push(CstNode::token(SyntaxKind::Error, ByteSpan::new(pos, line_end), None));
            }
            break;
        }

        if !node.children.iter().any(|c| c.kind == SyntaxKind::Reference) {
            self.errors.push(SyntaxError::new(
                "expected at least one reference after @depends-on",
                node.span,
            ));
            node.push(CstNode::token(SyntaxKind::Error, node.span, None));
        }
    }

    // ------------------------------------------------------------------
    // Stack management
    // ------------------------------------------------------------------

    fn attach(&mut self, node: CstNode) {
        if let Some(open) = self.stack.last_mut() {
            open.node.push(node);
        }
    }

    fn close_one(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(closed) = self.stack.pop() else { return };
        let child = if closed.wrap_error {
            let mut err = CstNode::new(SyntaxKind::Error, closed.node.span);
            err.push(closed.node);
            err
        } else {
            closed.node
        };
        self.attach(child);
    }

    fn close_to_source_file(&mut self) {
        while self.stack.len() > 1 {
            self.close_one();
        }
    }

    /// Closes open blocks until the innermost is one of `targets` (or the
    /// root is reached).
    fn close_until(&mut self, targets: &[SyntaxKind]) {
        while self.stack.len() > 1 {
            let Some(top) = self.stack.last() else { break };
            if targets.contains(&top.node.kind) {
                break;
            }
            self.close_one();
        }
    }

    fn finish_open_modes(&mut self) {
        let eof = self.text.len();
        match std::mem::replace(&mut self.mode, LineMode::Normal) {
            LineMode::Normal => {}
            LineMode::BlockComment { start } => {
                self.errors
                    .push(SyntaxError::new("unterminated block comment", ByteSpan::new(start, eof)));
                let mut comment =
                    CstNode::token(SyntaxKind::Comment, ByteSpan::new(start, eof), None);
                comment.has_error = true;
                self.attach(comment);
            }
            LineMode::CodeFence { mut node, content } => {
                self.errors.push(SyntaxError::new(
                    "unterminated code block",
                    ByteSpan::new(node.span.start, eof),
                ));
                if let Some(span) = content {
                    node.push(CstNode::token(SyntaxKind::DescriptionText, span, None));
                }
                node.span.end = eof;
                node.has_error = true;
                self.attach(node);
            }
        }
    }

    fn error_node(&mut self, message: impl Into<String>, span: ByteSpan) {
        self.errors.push(SyntaxError::new(message, span));
        self.attach(CstNode::token(SyntaxKind::Error, span, None));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(node: &CstNode) -> Vec<SyntaxKind> {
        node.children.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn test_module_feature_requirement_nesting_without_indent() {
        let tree = parse("@module auth\n\n@feature login\n\n@requirement basic-auth\n");
        assert!(!tree.has_errors());
        assert_eq!(kinds(&tree.root), vec![SyntaxKind::ModuleBlock]);
        let module = &tree.root.children[0];
        assert_eq!(kinds(module), vec![SyntaxKind::Identifier, SyntaxKind::FeatureBlock]);
        let feature = module.first_child_of(SyntaxKind::FeatureBlock).unwrap();
        let requirement = feature.first_child_of(SyntaxKind::RequirementBlock).unwrap();
        let name = requirement.name_field().unwrap();
        assert_eq!(name.text("@module auth\n\n@feature login\n\n@requirement basic-auth\n"), "basic-auth");
    }

    #[test]
    fn test_indented_nesting() {
        let src = "@module a\n  @depends-on b\n";
        let tree = parse(src);
        let module = &tree.root.children[0];
        let depends = module.first_child_of(SyntaxKind::DependsOn).unwrap();
        let reference = depends.first_child_of(SyntaxKind::Reference).unwrap();
        assert_eq!(reference.text(src), "b");
    }

    #[test]
    fn test_multiple_references() {
        let src = "@module m\n@depends-on a.b, c.d.e\n";
        let tree = parse(src);
        let module = &tree.root.children[0];
        let depends = module.first_child_of(SyntaxKind::DependsOn).unwrap();
        let refs: Vec<_> = depends.children_of(SyntaxKind::Reference).collect();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].children.len(), 2);
        assert_eq!(refs[1].children.len(), 3);
        assert_eq!(refs[1].text(src), "c.d.e");
    }

    #[test]
    fn test_reference_depth_beyond_three_parses() {
        let src = "@module m\n@depends-on a.b.c.d.e\n";
        let tree = parse(src);
        assert!(!tree.has_errors());
        let module = &tree.root.children[0];
        let depends = module.first_child_of(SyntaxKind::DependsOn).unwrap();
        let reference = depends.first_child_of(SyntaxKind::Reference).unwrap();
        assert_eq!(reference.children_of(SyntaxKind::Identifier).count(), 5);
    }

    #[test]
    fn test_description_block_collects_text() {
        let src = "@description\nThe auth system.\nMore text.\n\n@module auth\n";
        let tree = parse(src);
        assert_eq!(kinds(&tree.root), vec![SyntaxKind::DescriptionBlock, SyntaxKind::ModuleBlock]);
        let description = &tree.root.children[0];
        assert_eq!(description.children_of(SyntaxKind::DescriptionText).count(), 2);
    }

    #[test]
    fn test_feature_outside_module_wraps_in_error() {
        let src = "@feature orphan\n";
        let tree = parse(src);
        assert!(tree.has_errors());
        assert_eq!(kinds(&tree.root), vec![SyntaxKind::Error]);
        let error = &tree.root.children[0];
        assert_eq!(kinds(error), vec![SyntaxKind::FeatureBlock]);
    }

    #[test]
    fn test_unknown_directive_recovers() {
        let src = "@module m\n@bogus x\n@feature f\n";
        let tree = parse(src);
        assert!(tree.has_errors());
        let module = &tree.root.children[0];
        assert!(module.first_child_of(SyntaxKind::Error).is_some());
        assert!(module.first_child_of(SyntaxKind::FeatureBlock).is_some());
    }

    #[test]
    fn test_missing_name_keeps_block() {
        let src = "@module\n@feature f\n";
        let tree = parse(src);
        assert!(tree.has_errors());
        let module = &tree.root.children[0];
        assert_eq!(module.kind, SyntaxKind::ModuleBlock);
        assert!(module.name_field().is_none());
        assert!(module.first_child_of(SyntaxKind::FeatureBlock).is_some());
    }

    #[test]
    fn test_constraint_attaches_to_requirement() {
        let src = "@module m\n@feature f\n@requirement r\n@constraint must-be-fast\n";
        let tree = parse(src);
        let module = &tree.root.children[0];
        let feature = module.first_child_of(SyntaxKind::FeatureBlock).unwrap();
        let requirement = feature.first_child_of(SyntaxKind::RequirementBlock).unwrap();
        let constraint = requirement.first_child_of(SyntaxKind::Constraint).unwrap();
        assert_eq!(constraint.name_field().unwrap().text(src), "must-be-fast");
    }

    #[test]
    fn test_module_direct_requirement() {
        let src = "@module m\n@requirement direct\n@feature f\n@requirement nested\n";
        let tree = parse(src);
        let module = &tree.root.children[0];
        assert!(module.first_child_of(SyntaxKind::RequirementBlock).is_some());
        let feature = module.first_child_of(SyntaxKind::FeatureBlock).unwrap();
        assert!(feature.first_child_of(SyntaxKind::RequirementBlock).is_some());
    }

    #[test]
    fn test_comments_do_not_close_blocks() {
        let src = "@module m\n// note\n/* block\ncomment */\n@feature f\n";
        let tree = parse(src);
        assert!(!tree.has_errors());
        let module = &tree.root.children[0];
        assert_eq!(module.children_of(SyntaxKind::Comment).count(), 2);
        assert!(module.first_child_of(SyntaxKind::FeatureBlock).is_some());
    }

    #[test]
    fn test_trailing_comment_on_directive() {
        let src = "@module m // the module\n";
        let tree = parse(src);
        assert!(!tree.has_errors());
        let module = &tree.root.children[0];
        assert_eq!(module.name_field().unwrap().text(src), "m");
        assert_eq!(module.children_of(SyntaxKind::Comment).count(), 1);
    }

    #[test]
    fn test_code_block_with_language() {
        let src = "@module m\n@feature f\n```rust\nfn main() {}\n```\n";
        let tree = parse(src);
        assert!(!tree.has_errors());
        let module = &tree.root.children[0];
        let feature = module.first_child_of(SyntaxKind::FeatureBlock).unwrap();
        let code = feature.first_child_of(SyntaxKind::CodeBlock).unwrap();
        assert_eq!(code.field(Field::Language).unwrap().text(src), "rust");
        let content = code.first_child_of(SyntaxKind::DescriptionText).unwrap();
        assert_eq!(content.text(src), "fn main() {}");
    }

    #[test]
    fn test_unterminated_code_block() {
        let src = "@module m\n```\ncontent\n";
        let tree = parse(src);
        assert!(tree.has_errors());
        let module = &tree.root.children[0];
        let code = module.first_child_of(SyntaxKind::CodeBlock).unwrap();
        assert!(code.has_error);
    }

    #[test]
    fn test_dangling_dot_recovers_parts() {
        let src = "@module m\n@depends-on a.b.\n";
        let tree = parse(src);
        assert!(tree.has_errors());
        let module = &tree.root.children[0];
        let depends = module.first_child_of(SyntaxKind::DependsOn).unwrap();
        let reference = depends.first_child_of(SyntaxKind::Reference).unwrap();
        assert_eq!(reference.children_of(SyntaxKind::Identifier).count(), 2);
        assert!(reference.has_error);
    }

    #[test]
    fn test_text_at_top_level_is_error() {
        let tree = parse("stray text\n");
        assert!(tree.has_errors());
        assert_eq!(kinds(&tree.root), vec![SyntaxKind::Error]);
    }

    #[test]
    fn test_error_spans_point_at_offence() {
        let src = "@module m\n@depends-on ,\n";
        let tree = parse(src);
        assert!(tree.has_errors());
        assert!(tree.errors.iter().any(|e| e.message.contains("reference")));
    }

    #[test]
    fn test_crlf_line_endings() {
        let src = "@module m\r\n@feature f\r\n";
        let tree = parse(src);
        assert!(!tree.has_errors());
        let module = &tree.root.children[0];
        assert_eq!(module.name_field().unwrap().text(src), "m");
        assert!(module.first_child_of(SyntaxKind::FeatureBlock).is_some());
    }
}
