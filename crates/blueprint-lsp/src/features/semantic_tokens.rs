//! Semantic token provider.
//!
//! Walks the CST in document order and classifies:
//!
//! - the `@…` directive lead of each block as `keyword`
//! - declaration name identifiers as `variable` with
//!   `declaration|definition` modifiers
//! - identifiers inside `@depends-on` references as `type`
//! - comments as `comment` (split per line for client compatibility)
//! - description text and code-block content as `string`
//!
//! Tokens are emitted delta-encoded against the legend from
//! `blueprint_lsp_protocol::capabilities`.

use crate::state::DocumentState;
use blueprint_parser::{CstNode, Field, SyntaxKind};
use blueprint_position_tracking::ByteSpan;
use lsp_types::SemanticToken;

/// Legend index of the `keyword` token type.
const TOKEN_KEYWORD: u32 = 0;
/// Legend index of the `variable` token type.
const TOKEN_VARIABLE: u32 = 1;
/// Legend index of the `type` token type.
const TOKEN_TYPE: u32 = 2;
/// Legend index of the `comment` token type.
const TOKEN_COMMENT: u32 = 3;
/// Legend index of the `string` token type.
const TOKEN_STRING: u32 = 4;

/// Modifier bitset for `declaration | definition`.
const MOD_DECLARATION_DEFINITION: u32 = 0b11;

#[derive(Debug, Clone, Copy)]
struct RawToken {
    line: u32,
    start: u32,
    length: u32,
    token_type: u32,
    modifiers: u32,
}

/// Computes the full semantic token stream for a document.
pub fn semantic_tokens_full(document: &DocumentState) -> Vec<SemanticToken> {
    let mut raw = Vec::new();
    collect(document, &document.tree.root, &mut raw);
    encode(raw)
}

fn collect(document: &DocumentState, node: &CstNode, out: &mut Vec<RawToken>) {
    match node.kind {
        SyntaxKind::DescriptionBlock
        | SyntaxKind::ModuleBlock
        | SyntaxKind::FeatureBlock
        | SyntaxKind::RequirementBlock
        | SyntaxKind::Constraint
        | SyntaxKind::DependsOn => {
            if let Some(keyword) = node.kind.directive_keyword() {
                push_span(
                    document,
                    ByteSpan::new(node.span.start, node.span.start + keyword.len()),
                    TOKEN_KEYWORD,
                    0,
                    out,
                );
            }
        }
        SyntaxKind::Identifier => {
            let (token_type, modifiers) = if node.field == Some(Field::Name) {
                (TOKEN_VARIABLE, MOD_DECLARATION_DEFINITION)
            } else {
                (TOKEN_TYPE, 0)
            };
            push_span(document, node.span, token_type, modifiers, out);
        }
        SyntaxKind::Comment => push_multiline(document, node.span, TOKEN_COMMENT, out),
        SyntaxKind::DescriptionText => push_multiline(document, node.span, TOKEN_STRING, out),
        _ => {}
    }
    for child in &node.children {
        collect(document, child, out);
    }
}

/// Emits one token per line of the span; single-line spans emit one token.
fn push_multiline(document: &DocumentState, span: ByteSpan, token_type: u32, out: &mut Vec<RawToken>) {
    let Some(text) = span.slice(&document.text) else { return };
    let mut offset = span.start;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if !content.is_empty() {
            push_span(
                document,
                ByteSpan::new(offset, offset + content.len()),
                token_type,
                0,
                out,
            );
        }
        offset += line.len();
    }
}

fn push_span(
    document: &DocumentState,
    span: ByteSpan,
    token_type: u32,
    modifiers: u32,
    out: &mut Vec<RawToken>,
) {
    if span.is_empty() {
        return;
    }
    let (line, start) = document.line_index.offset_to_position(&document.text, span.start);
    let length = span
        .slice(&document.text)
        .map(|s| s.chars().map(char::len_utf16).sum::<usize>() as u32)
        .unwrap_or(0);
    if length > 0 {
        out.push(RawToken { line, start, length, token_type, modifiers });
    }
}

/// Sorts by position and delta-encodes per the LSP wire format.
///
/// Sorting guarantees the decoded stream is monotonically non-decreasing
/// in (line, column).
fn encode(mut raw: Vec<RawToken>) -> Vec<SemanticToken> {
    raw.sort_by_key(|t| (t.line, t.start));
    let mut out = Vec::with_capacity(raw.len());
    let mut prev_line = 0;
    let mut prev_start = 0;
    for token in raw {
        let delta_line = token.line - prev_line;
        let delta_start =
            if delta_line == 0 { token.start - prev_start } else { token.start };
        out.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.length,
            token_type: token.token_type,
            token_modifiers_bitset: token.modifiers,
        });
        prev_line = token.line;
        prev_start = token.start;
    }
    out
}
