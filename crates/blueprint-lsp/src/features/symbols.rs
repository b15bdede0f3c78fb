//! Document and workspace symbol providers.

use crate::state::ServerState;
use crate::util::lsp_location;
use blueprint_ast::{Constraint, Feature, Module, Requirement};
use blueprint_symbol_table::SymbolKind as BlueprintKind;
use lsp_types::{DocumentSymbol, SymbolInformation, SymbolKind};

fn lsp_kind(kind: BlueprintKind) -> SymbolKind {
    match kind {
        BlueprintKind::Module => SymbolKind::MODULE,
        BlueprintKind::Feature => SymbolKind::CLASS,
        BlueprintKind::Requirement => SymbolKind::FUNCTION,
        BlueprintKind::Constraint => SymbolKind::PROPERTY,
    }
}

/// Hierarchical symbol tree for one document: modules contain features,
/// features contain requirements, requirements contain constraints.
#[allow(deprecated)] // `deprecated` field required by the protocol struct
pub fn document_symbols(state: &ServerState, uri: &str) -> Vec<DocumentSymbol> {
    let Some(document) = state.document(uri) else { return Vec::new() };
    document.document.modules.iter().map(module_symbol).collect()
}

#[allow(deprecated)]
fn module_symbol(module: &Module) -> DocumentSymbol {
    let mut children: Vec<DocumentSymbol> =
        module.constraints.iter().map(constraint_symbol).collect();
    children.extend(module.requirements.iter().map(requirement_symbol));
    children.extend(module.features.iter().map(feature_symbol));
    DocumentSymbol {
        name: display_name(&module.name),
        detail: None,
        kind: SymbolKind::MODULE,
        tags: None,
        deprecated: None,
        range: module.location.into(),
        selection_range: module.name_location.into(),
        children: Some(children),
    }
}

#[allow(deprecated)]
fn feature_symbol(feature: &Feature) -> DocumentSymbol {
    let mut children: Vec<DocumentSymbol> =
        feature.constraints.iter().map(constraint_symbol).collect();
    children.extend(feature.requirements.iter().map(requirement_symbol));
    DocumentSymbol {
        name: display_name(&feature.name),
        detail: None,
        kind: SymbolKind::CLASS,
        tags: None,
        deprecated: None,
        range: feature.location.into(),
        selection_range: feature.name_location.into(),
        children: Some(children),
    }
}

#[allow(deprecated)]
fn requirement_symbol(requirement: &Requirement) -> DocumentSymbol {
    let children: Vec<DocumentSymbol> =
        requirement.constraints.iter().map(constraint_symbol).collect();
    DocumentSymbol {
        name: display_name(&requirement.name),
        detail: None,
        kind: SymbolKind::FUNCTION,
        tags: None,
        deprecated: None,
        range: requirement.location.into(),
        selection_range: requirement.name_location.into(),
        children: Some(children),
    }
}

#[allow(deprecated)]
fn constraint_symbol(constraint: &Constraint) -> DocumentSymbol {
    DocumentSymbol {
        name: display_name(&constraint.name),
        detail: None,
        kind: SymbolKind::PROPERTY,
        tags: None,
        deprecated: None,
        range: constraint.location.into(),
        selection_range: constraint.name_location.into(),
        children: None,
    }
}

fn display_name(name: &str) -> String {
    if name.is_empty() { "<unnamed>".to_string() } else { name.to_string() }
}

/// Workspace-wide symbol search over every kind.
///
/// Matches are case-insensitive: a substring hit on the simple name or
/// path, or an in-order subsequence of the query within the path.
#[allow(deprecated)]
pub fn workspace_symbols(state: &ServerState, query: &str) -> Vec<SymbolInformation> {
    state
        .index
        .all_symbols()
        .into_iter()
        .filter(|symbol| fuzzy_match(query, &symbol.name) || fuzzy_match(query, &symbol.path))
        .filter_map(|symbol| {
            Some(SymbolInformation {
                name: symbol.path.clone(),
                kind: lsp_kind(symbol.kind),
                tags: None,
                deprecated: None,
                location: lsp_location(&symbol.file_uri, symbol.name_location)?,
                container_name: container_of(&symbol.path),
            })
        })
        .collect()
}

fn container_of(path: &str) -> Option<String> {
    path.rfind('.').map(|dot| path[..dot].to_string())
}

/// Case-insensitive substring or subsequence match.
pub(crate) fn fuzzy_match(query: &str, candidate: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_ascii_lowercase();
    let candidate = candidate.to_ascii_lowercase();
    if candidate.contains(&query) {
        return true;
    }
    // Subsequence: every query char appears in order.
    let mut chars = candidate.chars();
    query.chars().all(|q| chars.by_ref().any(|c| c == q))
}
