//! Hover provider.

use crate::features::{Target, target_at};
use crate::state::ServerState;
use blueprint_symbol_table::{Symbol, SymbolKind};
use blueprint_workspace_index::{Resolution, WorkspaceIndex};
use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

/// Hover for the symbol or reference under the cursor.
pub fn hover(state: &ServerState, uri: &str, position: Position) -> Option<Hover> {
    let document = state.document(uri)?;
    let offset = document.offset_at(position);
    let target = target_at(&state.index, uri, offset)?;

    let (symbol, range) = match &target {
        Target::Declaration(symbol) => (*symbol, symbol.name_location),
        Target::Reference { reference, prefix, .. } => {
            match state.index.resolve_path(prefix, Some(uri)) {
                Resolution::Resolved(symbols) => (symbols[0], reference.location),
                _ => return None,
            }
        }
    };

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: symbol_markdown(&state.index, symbol),
        }),
        range: Some(range.into()),
    })
}

/// Renders the hover card for a symbol.
///
/// Shared with `completionItem/resolve`, which attaches the same content
/// as lazy documentation.
pub fn symbol_markdown(index: &WorkspaceIndex, symbol: &Symbol) -> String {
    let mut out = format!("**{}** `{}`\n", symbol.kind, symbol.path);

    if !symbol.description.is_empty() {
        out.push('\n');
        out.push_str(&symbol.description);
        out.push('\n');
    }

    let dependencies: Vec<String> =
        symbol.references.iter().map(|r| r.canonical()).collect();
    if !dependencies.is_empty() {
        out.push_str(&format!("\n**Dependencies ({}):**\n", dependencies.len()));
        for dependency in &dependencies {
            out.push_str(&format!("- `{dependency}`\n"));
        }
    }

    let constraints: Vec<&str> = symbol
        .children
        .iter()
        .filter(|child| {
            index.symbols_at(child).first().map(|s| s.kind == SymbolKind::Constraint).unwrap_or(false)
        })
        .map(String::as_str)
        .collect();
    if !constraints.is_empty() {
        out.push_str(&format!("\n**Constraints ({}):**\n", constraints.len()));
        for constraint in &constraints {
            let name = constraint.rsplit('.').next().unwrap_or(constraint);
            out.push_str(&format!("- `{name}`\n"));
        }
    }

    if symbol.kind != SymbolKind::Constraint {
        let (features, requirements) = child_counts(index, symbol);
        if features + requirements > 0 {
            out.push_str("\n**Contains:** ");
            let mut parts = Vec::new();
            if features > 0 {
                parts.push(format!("{features} feature{}", plural(features)));
            }
            if requirements > 0 {
                parts.push(format!("{requirements} requirement{}", plural(requirements)));
            }
            out.push_str(&parts.join(", "));
            out.push('\n');
        }
    }

    out.push_str(&format!(
        "\n[Declared here]({}#L{})\n",
        symbol.file_uri,
        symbol.name_location.start_line + 1
    ));
    out
}

fn child_counts(index: &WorkspaceIndex, symbol: &Symbol) -> (usize, usize) {
    let mut features = 0;
    let mut requirements = 0;
    for child in &symbol.children {
        match index.symbols_at(child).first().map(|s| s.kind) {
            Some(SymbolKind::Feature) => features += 1,
            Some(SymbolKind::Requirement) => requirements += 1,
            _ => {}
        }
    }
    (features, requirements)
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state_with(files: &[(&str, &str)]) -> ServerState {
        let mut state = ServerState::new();
        for (uri, text) in files {
            state.open_document(uri, text, 1);
        }
        state
    }

    #[test]
    fn test_hover_on_declaration() {
        let state = state_with(&[(
            "file:///a.bp",
            "@module auth\nIdentity and access.\n@feature login\n",
        )]);
        // Position inside "auth" on line 0.
        let hover = hover(&state, "file:///a.bp", Position::new(0, 9)).unwrap();
        let HoverContents::Markup(markup) = hover.contents else { panic!("expected markup") };
        assert!(markup.value.contains("**module** `auth`"));
        assert!(markup.value.contains("Identity and access."));
        assert!(markup.value.contains("1 feature"));
    }

    #[test]
    fn test_hover_on_reference_part_resolves_prefix() {
        let state = state_with(&[
            ("file:///a.bp", "@module auth\n@feature login\n@requirement basic\n"),
            ("file:///b.bp", "@module x\n@depends-on auth.login.basic\n"),
        ]);
        // Hover "login" inside the reference on line 1 of b.bp.
        let hover = hover(&state, "file:///b.bp", Position::new(1, 17)).unwrap();
        let HoverContents::Markup(markup) = hover.contents else { panic!("expected markup") };
        assert!(markup.value.contains("**feature** `auth.login`"));
    }

    #[test]
    fn test_hover_on_keyword_is_none() {
        let state = state_with(&[("file:///a.bp", "@module auth\n")]);
        assert!(hover(&state, "file:///a.bp", Position::new(0, 2)).is_none());
    }

    #[test]
    fn test_hover_lists_dependencies_and_constraints() {
        let state = state_with(&[(
            "file:///a.bp",
            "@module m\n@feature f\n@requirement r\n@depends-on m.other\n@constraint fast\n@requirement other\n",
        )]);
        let hover = hover(&state, "file:///a.bp", Position::new(2, 13)).unwrap();
        let HoverContents::Markup(markup) = hover.contents else { panic!("expected markup") };
        assert!(markup.value.contains("**Dependencies (1):**"));
        assert!(markup.value.contains("- `m.other`"));
        assert!(markup.value.contains("**Constraints (1):**"));
        assert!(markup.value.contains("- `fast`"));
        assert_eq!(markup.kind, MarkupKind::Markdown);
    }
}
