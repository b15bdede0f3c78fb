//! Code action provider: typo quick-fixes and ticket stubs.

use crate::state::ServerState;
use crate::util::edit_distance_within;
use blueprint_analysis::DerivedStatus;
use blueprint_workspace_index::Resolution;
use lsp_types::{
    CodeAction, CodeActionKind, Command, Diagnostic, NumberOrString, Range, TextEdit, Uri,
    WorkspaceEdit,
};
use std::collections::HashMap;

/// Maximum edit distance for a "fix typo" suggestion.
const MAX_TYPO_DISTANCE: usize = 2;

/// Code actions for a range, driven by the diagnostics the client sends
/// back in the request context.
pub fn code_actions(
    state: &mut ServerState,
    uri: &str,
    range: Range,
    diagnostics: &[Diagnostic],
) -> Vec<CodeAction> {
    let mut actions = Vec::new();
    for diagnostic in diagnostics {
        match &diagnostic.code {
            Some(NumberOrString::String(code)) if code == "unresolved-reference" => {
                actions.extend(fix_typo_actions(state, uri, diagnostic));
            }
            _ => {}
        }
    }
    actions.extend(create_ticket_actions(state, uri, range));
    actions
}

/// "Fix typo" quick-fixes for one unresolved reference.
///
/// Candidates come from the best partial match: the direct children of the
/// longest existing prefix, ranked by edit distance (≤ 2) between the
/// failing segment and each child's simple name. With no matching prefix,
/// module names are searched the same way.
fn fix_typo_actions(state: &ServerState, uri: &str, diagnostic: &Diagnostic) -> Vec<CodeAction> {
    let Some(slice) = state.index.file(uri) else { return Vec::new() };

    // Recover the reference the diagnostic points at.
    let reference = slice.references.iter().find(|owned| {
        lsp_types::Range::from(owned.reference.location) == diagnostic.range
    });
    let Some(owned) = reference else { return Vec::new() };
    let canonical = owned.reference.canonical();

    let candidates: Vec<String> = match state.index.resolve_path(&canonical, Some(uri)) {
        Resolution::Partial { prefix, children, .. } => {
            let failing = canonical
                .strip_prefix(&format!("{prefix}."))
                .unwrap_or(&canonical)
                .split('.')
                .next()
                .unwrap_or("")
                .to_string();
            rank_by_distance(&failing, children)
        }
        Resolution::Unresolved => {
            let first = canonical.split('.').next().unwrap_or("");
            let modules: Vec<String> = state
                .index
                .symbols_of_kind(blueprint_symbol_table::SymbolKind::Module)
                .iter()
                .map(|s| s.path.clone())
                .collect();
            rank_by_distance(first, modules)
        }
        Resolution::Resolved(_) => return Vec::new(),
    };

    candidates
        .into_iter()
        .map(|replacement| {
            let edit = TextEdit {
                range: owned.reference.location.into(),
                new_text: replacement.clone(),
            };
            let changes: HashMap<Uri, Vec<TextEdit>> = uri
                .parse::<Uri>()
                .ok()
                .map(|parsed| HashMap::from([(parsed, vec![edit])]))
                .unwrap_or_default();
            CodeAction {
                title: format!("Replace with '{replacement}'"),
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![diagnostic.clone()]),
                edit: Some(WorkspaceEdit { changes: Some(changes), ..Default::default() }),
                is_preferred: Some(false),
                ..Default::default()
            }
        })
        .collect()
}

/// Ranks `candidates` by edit distance of their simple name against
/// `failing`, keeping only close matches.
fn rank_by_distance(failing: &str, candidates: Vec<String>) -> Vec<String> {
    let mut ranked: Vec<(usize, String)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let segment = candidate.rsplit('.').next().unwrap_or(&candidate);
            edit_distance_within(failing, segment, MAX_TYPO_DISTANCE)
                .map(|distance| (distance, candidate))
        })
        .collect();
    ranked.sort();
    ranked.into_iter().map(|(_, candidate)| candidate).collect()
}

/// "Create ticket" actions for requirements in range with no tickets.
///
/// The server never writes ticket files (they belong to the authoring
/// workflow), so the action carries the stub as a client command.
fn create_ticket_actions(state: &mut ServerState, uri: &str, range: Range) -> Vec<CodeAction> {
    let analysis = state.analysis.get(&state.index, &state.tickets);
    let Some(slice) = state.index.file(uri) else { return Vec::new() };

    let mut actions = Vec::new();
    for symbol in slice.table.requirements.values() {
        let line = symbol.name_location.start_line;
        if line < range.start.line || line > range.end.line {
            continue;
        }
        if analysis.derived_status(&symbol.path) != DerivedStatus::NoTicket {
            continue;
        }
        let stub = serde_json::json!({
            "id": format!("TKT-{}", symbol.name.to_uppercase()),
            "ref": symbol.path,
            "description": symbol.description,
            "status": "pending",
            "constraints_satisfied": [],
        });
        actions.push(CodeAction {
            title: format!("Create ticket for '{}'", symbol.path),
            kind: Some(CodeActionKind::QUICKFIX),
            command: Some(Command {
                title: "Create ticket".to_string(),
                command: "blueprint.createTicket".to_string(),
                arguments: Some(vec![
                    serde_json::Value::String(symbol.path.clone()),
                    stub,
                ]),
            }),
            ..Default::default()
        });
    }
    actions.sort_by(|a, b| a.title.cmp(&b.title));
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::diagnostics::diagnostics_for;
    use lsp_types::Position;
    use pretty_assertions::assert_eq;

    fn state_with(files: &[(&str, &str)]) -> ServerState {
        let mut state = ServerState::new();
        for (uri, text) in files {
            state.open_document(uri, text, 1);
        }
        state
    }

    fn whole_file() -> Range {
        Range { start: Position::new(0, 0), end: Position::new(999, 0) }
    }

    #[test]
    fn test_fix_typo_from_partial_match() {
        let mut state = state_with(&[(
            "file:///a.bp",
            "@module auth\n@feature login\n@module x\n@depends-on auth.logni\n",
        )]);
        let diagnostics = diagnostics_for(&mut state, "file:///a.bp");
        let actions = code_actions(&mut state, "file:///a.bp", whole_file(), &diagnostics);
        let fix = actions
            .iter()
            .find(|a| a.title.contains("auth.login"))
            .expect("typo fix should be offered");
        let edit = fix.edit.as_ref().unwrap().changes.as_ref().unwrap();
        let edits = edit.values().next().unwrap();
        assert_eq!(edits[0].new_text, "auth.login");
        assert_eq!(edits[0].range.start.line, 3);
    }

    #[test]
    fn test_fix_typo_on_first_segment() {
        let mut state = state_with(&[
            ("file:///a.bp", "@module store\n"),
            ("file:///b.bp", "@module x\n@depends-on stoer\n"),
        ]);
        let diagnostics = diagnostics_for(&mut state, "file:///b.bp");
        let actions = code_actions(&mut state, "file:///b.bp", whole_file(), &diagnostics);
        assert!(actions.iter().any(|a| a.title == "Replace with 'store'"));
    }

    #[test]
    fn test_no_typo_fix_beyond_distance() {
        let mut state = state_with(&[
            ("file:///a.bp", "@module store\n"),
            ("file:///b.bp", "@module x\n@depends-on zzzzzz\n"),
        ]);
        let diagnostics = diagnostics_for(&mut state, "file:///b.bp");
        let actions = code_actions(&mut state, "file:///b.bp", whole_file(), &diagnostics);
        assert!(actions.iter().all(|a| !a.title.starts_with("Replace with")));
    }

    #[test]
    fn test_create_ticket_for_unticketed_requirement() {
        let mut state =
            state_with(&[("file:///a.bp", "@module m\n@feature f\n@requirement r\n")]);
        let actions = code_actions(&mut state, "file:///a.bp", whole_file(), &[]);
        let create = actions
            .iter()
            .find(|a| a.title == "Create ticket for 'm.f.r'")
            .expect("create-ticket action");
        let command = create.command.as_ref().unwrap();
        assert_eq!(command.command, "blueprint.createTicket");
        let stub = &command.arguments.as_ref().unwrap()[1];
        assert_eq!(stub["ref"], "m.f.r");
        assert_eq!(stub["status"], "pending");
    }

    #[test]
    fn test_no_create_ticket_when_ticketed() {
        let mut state =
            state_with(&[("file:///a.bp", "@module m\n@feature f\n@requirement r\n")]);
        state.tickets.upsert_file(
            "/ws/.blueprint/tickets/m.tickets.json",
            r#"{ "version": "1.0", "source": "m.bp", "tickets": [
                { "id": "T1", "ref": "m.f.r", "description": "", "status": "pending", "constraints_satisfied": [] }
            ] }"#,
        );
        let actions = code_actions(&mut state, "file:///a.bp", whole_file(), &[]);
        assert!(actions.iter().all(|a| !a.title.starts_with("Create ticket")));
    }
}
