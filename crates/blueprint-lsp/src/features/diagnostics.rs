//! Diagnostics for Blueprint documents and ticket files.

use crate::state::ServerState;
use crate::util::{fs_path_to_uri, lsp_location};
use blueprint_analysis::BlockingStatus;
use blueprint_position_tracking::SourceLocation;
use blueprint_symbol_table::SymbolKind;
use blueprint_tickets::IssueSeverity;
use blueprint_workspace_index::Resolution;
use lsp_types::{Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, NumberOrString};

fn diagnostic(
    location: SourceLocation,
    severity: DiagnosticSeverity,
    code: &str,
    message: impl Into<String>,
) -> Diagnostic {
    Diagnostic {
        range: location.into(),
        severity: Some(severity),
        code: Some(NumberOrString::String(code.to_string())),
        source: Some("blueprint".to_string()),
        message: message.into(),
        related_information: None,
        ..Default::default()
    }
}

fn related(uri: &str, location: SourceLocation, message: &str) -> Vec<DiagnosticRelatedInformation> {
    lsp_location(uri, location)
        .map(|location| {
            vec![DiagnosticRelatedInformation { location, message: message.to_string() }]
        })
        .unwrap_or_default()
}

/// Full diagnostics for one open `.bp` document.
pub fn diagnostics_for(state: &mut ServerState, uri: &str) -> Vec<Diagnostic> {
    let Some(document) = state.documents.get(uri) else { return Vec::new() };
    let mut out = Vec::new();

    // Parse errors, straight off the recovered ERROR nodes.
    for error in &document.tree.errors {
        let location = document.line_index.locate(&document.text, error.span);
        out.push(diagnostic(location, DiagnosticSeverity::ERROR, "parse-error", &error.message));
    }

    // Description placement: at most one per file, before all modules.
    let occurrences = &document.document.description_occurrences;
    if occurrences.len() > 1 {
        let first = occurrences[0];
        for occurrence in &occurrences[1..] {
            let mut d = diagnostic(
                *occurrence,
                DiagnosticSeverity::ERROR,
                "duplicate-description",
                "duplicate @description block; only one is allowed per file",
            );
            d.related_information =
                Some(related(uri, first, "first @description declared here"));
            out.push(d);
        }
    }
    if let Some(first_module) = document.document.modules.first() {
        for occurrence in occurrences {
            if occurrence.span.start > first_module.location.span.start {
                out.push(diagnostic(
                    *occurrence,
                    DiagnosticSeverity::ERROR,
                    "misplaced-description",
                    "@description must precede all @module blocks",
                ));
            }
        }
    }

    let Some(slice) = state.index.file(uri) else { return out };

    // Within-file duplicates, pointing back at the original.
    for duplicate in &slice.table.duplicates {
        let mut d = diagnostic(
            duplicate.duplicate.name_location,
            DiagnosticSeverity::ERROR,
            "duplicate-symbol",
            format!(
                "duplicate {} '{}' (first declared on line {})",
                duplicate.kind,
                duplicate.duplicate.path,
                duplicate.original.name_location.start_line + 1
            ),
        );
        d.related_information =
            Some(related(uri, duplicate.original.name_location, "first declaration here"));
        out.push(d);
    }

    // Cross-file conflicts on this file's symbols.
    for (path, symbols) in state.index.conflicts() {
        for symbol in symbols.iter().filter(|s| s.file_uri == uri) {
            let others: Vec<&str> = symbols
                .iter()
                .filter(|s| s.file_uri != uri)
                .map(|s| s.file_uri.as_str())
                .collect();
            if others.is_empty() {
                continue;
            }
            let mut d = diagnostic(
                symbol.name_location,
                DiagnosticSeverity::WARNING,
                "conflicting-definition",
                format!("'{path}' is also defined in {}", others.join(", ")),
            );
            let infos: Vec<DiagnosticRelatedInformation> = symbols
                .iter()
                .filter(|s| s.file_uri != uri)
                .filter_map(|s| {
                    lsp_location(&s.file_uri, s.name_location).map(|location| {
                        DiagnosticRelatedInformation {
                            location,
                            message: "also defined here".to_string(),
                        }
                    })
                })
                .collect();
            d.related_information = Some(infos);
            out.push(d);
        }
    }

    // Unresolved references declared in this file.
    for owned in state.index.unresolved_references() {
        if owned.file_uri != uri {
            continue;
        }
        let canonical = owned.reference.canonical();
        let mut message = format!("unresolved reference '{canonical}'");
        if let Resolution::Partial { prefix, children, .. } =
            state.index.resolve_path(&canonical, Some(uri))
        {
            if !children.is_empty() {
                let names: Vec<&str> =
                    children.iter().take(4).map(String::as_str).collect();
                message.push_str(&format!(
                    "; '{prefix}' exists - did you mean one of: {}?",
                    names.join(", ")
                ));
            }
        }
        out.push(diagnostic(
            owned.reference.location,
            DiagnosticSeverity::WARNING,
            "unresolved-reference",
            message,
        ));
    }

    // Cycles and blocking, off the cached analysis snapshot.
    let analysis = state.analysis.get(&state.index, &state.tickets);
    for cycle in analysis.cycles() {
        let Some(edge) = cycle.edges.iter().find(|e| e.file_uri == uri) else { continue };
        out.push(diagnostic(
            edge.location,
            DiagnosticSeverity::ERROR,
            "circular-dependency",
            format!("circular dependency: {}", cycle.nodes.join(" -> ")),
        ));
    }

    for symbol in slice.table.requirements.values() {
        let Some(info) = analysis.blocking(&symbol.path) else { continue };
        match info.status {
            BlockingStatus::InCycle => {
                out.push(diagnostic(
                    symbol.name_location,
                    DiagnosticSeverity::INFORMATION,
                    "in-cycle",
                    format!(
                        "requirement participates in a dependency cycle with {}",
                        info.cycle_peers.join(", ")
                    ),
                ));
            }
            BlockingStatus::Blocked => {
                let blockers: Vec<String> = info
                    .direct_blockers
                    .iter()
                    .chain(info.transitive_blockers.iter())
                    .map(|b| format!("{} ({})", b.path, b.status))
                    .collect();
                out.push(diagnostic(
                    symbol.name_location,
                    DiagnosticSeverity::INFORMATION,
                    "blocked-requirement",
                    format!("blocked by incomplete dependencies: {}", blockers.join(", ")),
                ));
            }
            BlockingStatus::NotBlocked => {}
        }
    }

    out.sort_by_key(|d| (d.range.start.line, d.range.start.character));
    out
}

/// Diagnostics for one ticket file: validation issues plus orphan refs.
pub fn diagnostics_for_ticket_file(state: &mut ServerState, path: &str) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let Some(file) = state.tickets.file(path) else { return out };

    let file_start = SourceLocation::default();
    for issue in &file.issues {
        let severity = match issue.severity {
            IssueSeverity::Error => DiagnosticSeverity::ERROR,
            IssueSeverity::Warning => DiagnosticSeverity::WARNING,
        };
        let message = if issue.json_path.is_empty() {
            issue.message.clone()
        } else {
            format!("{}: {}", issue.json_path, issue.message)
        };
        out.push(diagnostic(file_start, severity, "ticket-file", message));
    }

    for ticket in &file.tickets {
        let is_known = state
            .index
            .symbols_at(&ticket.reference)
            .iter()
            .any(|s| s.kind == SymbolKind::Requirement);
        if !is_known {
            out.push(diagnostic(
                ticket.location,
                DiagnosticSeverity::WARNING,
                "orphan-ticket",
                format!(
                    "ticket '{}' references unknown requirement '{}'",
                    ticket.id, ticket.reference
                ),
            ));
        }
    }
    out
}
