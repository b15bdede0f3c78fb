//! Go-to-definition and find-references.

use crate::features::{Target, target_at};
use crate::state::ServerState;
use crate::util::{fs_path_to_uri, lsp_location};
use blueprint_symbol_table::SymbolKind;
use blueprint_workspace_index::Resolution;
use lsp_types::{Location, Position};

/// Definition locations for the identifier under the cursor.
///
/// On a declaration name the definition is the declaration itself; inside
/// a `@depends-on` reference the longest prefix ending at the hovered part
/// is resolved (hovering `M` in `M.F.R` goes to the module). Keywords have
/// no definition.
pub fn definition(state: &ServerState, uri: &str, position: Position) -> Vec<Location> {
    let Some(document) = state.document(uri) else { return Vec::new() };
    let offset = document.offset_at(position);
    let Some(target) = target_at(&state.index, uri, offset) else { return Vec::new() };

    match target {
        Target::Declaration(symbol) => {
            lsp_location(&symbol.file_uri, symbol.name_location).into_iter().collect()
        }
        Target::Reference { prefix, .. } => match state.index.resolve_path(&prefix, Some(uri)) {
            Resolution::Resolved(symbols) => symbols
                .iter()
                .filter_map(|s| lsp_location(&s.file_uri, s.name_location))
                .collect(),
            _ => Vec::new(),
        },
    }
}

/// All reference locations for the symbol under the cursor.
///
/// A reference matches when its text equals the target path or begins with
/// `path.` (referencing a child implicitly references the parent; a bare
/// reference to `M` is not a reference to `M.F`). For requirements the
/// spans of referencing tickets inside `.tickets.json` files are included.
pub fn references(
    state: &ServerState,
    uri: &str,
    position: Position,
    include_declaration: bool,
) -> Vec<Location> {
    let Some(document) = state.document(uri) else { return Vec::new() };
    let offset = document.offset_at(position);
    let Some(target) = target_at(&state.index, uri, offset) else { return Vec::new() };

    let path = match target {
        Target::Declaration(symbol) => symbol.path.clone(),
        Target::Reference { prefix, .. } => prefix,
    };

    let mut locations = Vec::new();
    if include_declaration {
        for symbol in state.index.symbols_at(&path) {
            locations.extend(lsp_location(&symbol.file_uri, symbol.name_location));
        }
    }

    let child_prefix = format!("{path}.");
    for owned in state.index.all_references() {
        let canonical = owned.reference.canonical();
        if canonical == path || canonical.starts_with(&child_prefix) {
            locations.extend(lsp_location(&owned.file_uri, owned.reference.location));
        }
    }

    // Tickets referencing a requirement: navigate into the ticket file,
    // spanning the ticket's whole object.
    let is_requirement =
        state.index.symbols_at(&path).iter().any(|s| s.kind == SymbolKind::Requirement);
    if is_requirement {
        for (file_path, ticket) in state.tickets.tickets_with_files_for(&path) {
            if let Some(ticket_uri) = fs_path_to_uri(std::path::Path::new(file_path)) {
                locations.extend(lsp_location(&ticket_uri, ticket.location));
            }
        }
    }
    locations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(files: &[(&str, &str)]) -> ServerState {
        let mut state = ServerState::new();
        for (uri, text) in files {
            state.open_document(uri, text, 1);
        }
        state
    }

    #[test]
    fn test_definition_resolves_across_files() {
        // Definition at a reference jumps to the declaring identifier in
        // the other file.
        let state = state_with(&[
            ("file:///a.bp", "@module auth\n\n@feature login\n\n@requirement basic-auth\n"),
            ("file:///x.bp", "@module x\n  @depends-on auth.login.basic-auth\n"),
        ]);
        // Cursor on "basic-auth" (last part) in x.bp line 1.
        let locations = definition(&state, "file:///x.bp", Position::new(1, 26));
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].uri.as_str(), "file:///a.bp");
        assert_eq!(locations[0].range.start.line, 4);
        assert_eq!(locations[0].range.start.character, 13);
    }

    #[test]
    fn test_definition_prefix_goes_to_module() {
        let state = state_with(&[
            ("file:///a.bp", "@module auth\n@feature login\n@requirement basic\n"),
            ("file:///x.bp", "@module x\n@depends-on auth.login.basic\n"),
        ]);
        // Cursor on "auth" → the module declaration.
        let locations = definition(&state, "file:///x.bp", Position::new(1, 13));
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].range.start.line, 0);
    }

    #[test]
    fn test_definition_on_declaration_is_self() {
        let state = state_with(&[("file:///a.bp", "@module auth\n")]);
        let locations = definition(&state, "file:///a.bp", Position::new(0, 9));
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].range.start.character, 8);
    }

    #[test]
    fn test_references_parent_semantics() {
        let state = state_with(&[
            ("file:///a.bp", "@module auth\n@feature login\n"),
            ("file:///b.bp", "@module b\n@depends-on auth.login\n"),
            ("file:///c.bp", "@module c\n@depends-on auth\n"),
        ]);
        // References to `auth` include both the child reference and the
        // bare one.
        let locations = references(&state, "file:///a.bp", Position::new(0, 9), false);
        assert_eq!(locations.len(), 2);

        // References to `auth.login` exclude the bare `auth` reference.
        let locations = references(&state, "file:///a.bp", Position::new(1, 10), false);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].uri.as_str(), "file:///b.bp");
    }

    #[test]
    fn test_references_include_declaration() {
        let state = state_with(&[
            ("file:///a.bp", "@module auth\n"),
            ("file:///b.bp", "@module b\n@depends-on auth\n"),
        ]);
        let locations = references(&state, "file:///a.bp", Position::new(0, 9), true);
        assert_eq!(locations.len(), 2);
    }

    #[test]
    fn test_references_include_ticket_spans() {
        let mut state = state_with(&[(
            "file:///ws/auth.bp",
            "@module auth\n@feature login\n@requirement basic\n",
        )]);
        state.tickets.upsert_file(
            "/ws/.blueprint/tickets/auth.tickets.json",
            r#"{ "version": "1.0", "source": "auth.bp", "tickets": [
                { "id": "TKT-001", "ref": "auth.login.basic", "description": "", "status": "pending", "constraints_satisfied": [] },
                { "id": "TKT-002", "ref": "auth.login.basic", "description": "", "status": "pending", "constraints_satisfied": [] }
            ] }"#,
        );
        let locations =
            references(&state, "file:///ws/auth.bp", Position::new(2, 13), true);
        // Declaration plus two ticket object spans.
        assert_eq!(locations.len(), 3);
        let ticket_locations: Vec<_> = locations
            .iter()
            .filter(|l| l.uri.as_str().ends_with("auth.tickets.json"))
            .collect();
        assert_eq!(ticket_locations.len(), 2);
        assert_ne!(ticket_locations[0].range.start.line, ticket_locations[1].range.start.line);
    }
}
