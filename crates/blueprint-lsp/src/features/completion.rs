//! Completion provider.
//!
//! Context is classified from the cursor position and surrounding text:
//! directive keywords (after `@`), reference targets (inside
//! `@depends-on`), constraint names (after `@constraint`), code-fence
//! language tags, and suppression inside comments and code blocks.

use crate::features::hover::symbol_markdown;
use crate::features::symbols::fuzzy_match;
use crate::state::ServerState;
use blueprint_parser::SyntaxKind;
use blueprint_symbol_table::{Symbol, SymbolKind};
use lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, Documentation, MarkupContent,
    MarkupKind, Position, Range, TextEdit,
};
use rustc_hash::FxHashMap;

/// Reference candidates are capped to keep the payload small.
const MAX_REFERENCE_ITEMS: usize = 50;

/// Language tags offered right after a code fence.
const FENCE_LANGUAGES: &[&str] =
    &["rust", "typescript", "javascript", "python", "go", "json", "yaml", "toml", "sql", "bash"];

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Completion items for the given cursor position.
pub fn completion(state: &mut ServerState, uri: &str, position: Position) -> Vec<CompletionItem> {
    let Some(document) = state.documents.get(uri) else { return Vec::new() };
    let offset = document.offset_at(position);
    let line_start = document.line_index.line_start(position.line as usize);
    let Some(line_prefix) = document.text.get(line_start..offset) else { return Vec::new() };
    let trimmed = line_prefix.trim_start();

    // Suppress inside comments.
    if trimmed.starts_with("//") || trimmed.starts_with("/*") {
        return Vec::new();
    }
    if let Some(node) = document.tree.root.node_at_offset(offset.saturating_sub(1)) {
        if node.kind == SyntaxKind::Comment {
            return Vec::new();
        }
    }

    // Language tag right after the opening fence.
    if let Some(tag) = trimmed.strip_prefix("```") {
        return FENCE_LANGUAGES
            .iter()
            .filter(|lang| lang.starts_with(tag.trim()))
            .map(|lang| CompletionItem {
                label: lang.to_string(),
                kind: Some(CompletionItemKind::VALUE),
                ..Default::default()
            })
            .collect();
    }

    // Suppress inside code block content.
    let in_code_block = document
        .tree
        .root
        .descendants()
        .any(|n| n.kind == SyntaxKind::CodeBlock && n.span.contains(offset) && offset > n.span.start);
    if in_code_block {
        return Vec::new();
    }

    // Scope decisions anchor at the directive's `@`, which (unlike the
    // cursor) always lies inside the parsed parent block's span.
    let anchor = line_start + (line_prefix.len() - trimmed.len());

    if let Some(rest) = trimmed.strip_prefix("@depends-on") {
        if !rest.is_empty() {
            return reference_items(state, uri, offset, anchor);
        }
    }
    if let Some(rest) = trimmed.strip_prefix("@constraint") {
        if !rest.is_empty() {
            return constraint_items(state, rest.trim_start());
        }
    }
    if trimmed.starts_with('@') && !trimmed.contains(char::is_whitespace) {
        return keyword_items(state, uri, anchor, position, line_prefix);
    }
    Vec::new()
}

/// Directive keywords valid in the current scope.
fn keyword_items(
    state: &ServerState,
    uri: &str,
    anchor: usize,
    position: Position,
    line_prefix: &str,
) -> Vec<CompletionItem> {
    let scope = enclosing_scope(state, uri, anchor);
    let keywords: &[&str] = match scope {
        None => &["@description", "@module"],
        Some(SymbolKind::Module) => {
            &["@feature", "@requirement", "@constraint", "@depends-on", "@module"]
        }
        Some(SymbolKind::Feature) => {
            &["@requirement", "@constraint", "@depends-on", "@feature", "@module"]
        }
        _ => &["@constraint", "@depends-on", "@requirement", "@feature", "@module"],
    };

    // Replace from the '@' so clients do not duplicate the trigger char.
    // Leading whitespace is ASCII, so the byte column is the UTF-16 column.
    let at_col = (line_prefix.len() - line_prefix.trim_start().len()) as u32;
    let replace = Range { start: Position::new(position.line, at_col), end: position };
    let typed = line_prefix.trim_start();

    keywords
        .iter()
        .filter(|k| k.starts_with(typed))
        .map(|keyword| CompletionItem {
            label: keyword.to_string(),
            kind: Some(CompletionItemKind::KEYWORD),
            filter_text: Some(keyword.to_string()),
            text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                range: replace,
                new_text: keyword.to_string(),
            })),
            ..Default::default()
        })
        .collect()
}

/// Reference candidates inside `@depends-on`.
///
/// After a `.` the direct children of the typed prefix are offered;
/// otherwise the whole workspace is fuzzy-filtered. Self-referential and
/// cycle-creating targets are hidden, same-file candidates sort first,
/// and the list is capped.
fn reference_items(
    state: &mut ServerState,
    uri: &str,
    offset: usize,
    anchor: usize,
) -> Vec<CompletionItem> {
    let Some(document) = state.documents.get(uri) else { return Vec::new() };
    let text = &document.text;

    // The reference token under construction: identifier chars and dots
    // walking back from the cursor.
    let mut token_start = offset;
    while token_start > 0 {
        let Some(c) = text[..token_start].chars().next_back() else { break };
        if is_ident_char(c) || c == '.' {
            token_start -= c.len_utf8();
        } else {
            break;
        }
    }
    let token = text.get(token_start..offset).unwrap_or("");

    let owner = enclosing_owner_path(state, uri, anchor);
    let analysis = state.analysis.get(&state.index, &state.tickets);
    let graph = analysis.graph();

    let excluded = |candidate: &str| -> bool {
        if let Some(owner) = &owner {
            if candidate == owner
                || candidate.starts_with(&format!("{owner}."))
                || owner.starts_with(&format!("{candidate}."))
            {
                return true;
            }
            if graph.would_create_cycle(owner, candidate) {
                return true;
            }
        }
        false
    };

    let mut items: Vec<CompletionItem> = if let Some(prefix) = token.strip_suffix('.') {
        // Path navigation: direct children of the prefix.
        state
            .index
            .direct_children(prefix)
            .into_iter()
            .filter(|child| !excluded(child))
            .filter_map(|child| {
                let symbol = state.index.symbols_at(&child).first()?;
                let segment = child.rsplit('.').next().unwrap_or(&child).to_string();
                Some(candidate_item(symbol, segment, uri))
            })
            .collect()
    } else {
        let (parent, partial) = match token.rfind('.') {
            Some(dot) => (Some(&token[..dot]), &token[dot + 1..]),
            None => (None, token),
        };
        let symbols: Vec<&Symbol> = match parent {
            Some(parent) => state
                .index
                .direct_children(parent)
                .into_iter()
                .filter_map(|child| state.index.symbols_at(&child).first())
                .collect(),
            None => state
                .index
                .all_symbols()
                .into_iter()
                .filter(|s| s.kind != SymbolKind::Constraint)
                .collect(),
        };
        symbols
            .into_iter()
            .filter(|s| !excluded(&s.path))
            .filter(|s| fuzzy_match(partial, &s.name) || fuzzy_match(partial, &s.path))
            .map(|symbol| {
                let insert = match parent {
                    Some(_) => symbol.name.clone(),
                    None => symbol.path.clone(),
                };
                candidate_item(symbol, insert, uri)
            })
            .collect()
    };

    items.sort_by(|a, b| a.sort_text.cmp(&b.sort_text));
    items.dedup_by(|a, b| a.label == b.label);
    items.truncate(MAX_REFERENCE_ITEMS);
    items
}

fn candidate_item(symbol: &Symbol, insert: String, from_uri: &str) -> CompletionItem {
    let same_file = symbol.file_uri == from_uri;
    CompletionItem {
        label: symbol.path.clone(),
        kind: Some(match symbol.kind {
            SymbolKind::Module => CompletionItemKind::MODULE,
            SymbolKind::Feature => CompletionItemKind::CLASS,
            SymbolKind::Requirement => CompletionItemKind::FUNCTION,
            SymbolKind::Constraint => CompletionItemKind::PROPERTY,
        }),
        detail: Some(symbol.kind.to_string()),
        insert_text: Some(insert),
        // Same-file candidates sort ahead of workspace ones.
        sort_text: Some(format!("{}{}", if same_file { "0" } else { "1" }, symbol.path)),
        data: Some(serde_json::json!({ "path": symbol.path })),
        ..Default::default()
    }
}

/// Constraint names ranked by how often they are used workspace-wide.
fn constraint_items(state: &ServerState, typed: &str) -> Vec<CompletionItem> {
    let mut usage: FxHashMap<&str, usize> = FxHashMap::default();
    for symbol in state.index.symbols_of_kind(SymbolKind::Constraint) {
        *usage.entry(symbol.name.as_str()).or_default() += 1;
    }
    let mut names: Vec<(&str, usize)> = usage
        .into_iter()
        .filter(|(name, _)| fuzzy_match(typed, name))
        .collect();
    names.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    names
        .into_iter()
        .enumerate()
        .map(|(rank, (name, count))| CompletionItem {
            label: name.to_string(),
            kind: Some(CompletionItemKind::PROPERTY),
            detail: Some(format!("used {count}×")),
            sort_text: Some(format!("{rank:04}")),
            ..Default::default()
        })
        .collect()
}

/// Kind of the innermost container whose span holds the offset.
fn enclosing_scope(state: &ServerState, uri: &str, offset: usize) -> Option<SymbolKind> {
    enclosing_symbol(state, uri, offset).map(|s| s.kind)
}

fn enclosing_owner_path(state: &ServerState, uri: &str, offset: usize) -> Option<String> {
    enclosing_symbol(state, uri, offset).map(|s| s.path.clone())
}

/// The deepest non-constraint symbol containing `offset` (longest path
/// wins).
fn enclosing_symbol<'a>(state: &'a ServerState, uri: &str, offset: usize) -> Option<&'a Symbol> {
    let slice = state.index.file(uri)?;
    slice
        .table
        .all_symbols()
        .filter(|s| s.kind != SymbolKind::Constraint)
        .filter(|s| s.location.span.contains(offset) || s.location.span.end == offset)
        .max_by_key(|s| s.path.len())
}

/// Attaches full documentation lazily on `completionItem/resolve`.
pub fn resolve_completion_item(state: &ServerState, mut item: CompletionItem) -> CompletionItem {
    let path = item
        .data
        .as_ref()
        .and_then(|d| d.get("path"))
        .and_then(|p| p.as_str())
        .map(str::to_string);
    if let Some(path) = path {
        if let Some(symbol) = state.index.symbols_at(&path).first() {
            item.documentation = Some(Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: symbol_markdown(&state.index, symbol),
            }));
        }
    }
    item
}
