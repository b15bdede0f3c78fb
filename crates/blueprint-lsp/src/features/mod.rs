//! LSP feature providers.
//!
//! Each provider is a pure function of the current [`ServerState`]
//! snapshot; the dispatch loop serializes calls so every query sees a
//! consistent index.

pub mod code_actions;
pub mod completion;
pub mod diagnostics;
pub mod hover;
pub mod navigation;
pub mod semantic_tokens;
pub mod status;
pub mod symbols;

use blueprint_ast::Reference;
use blueprint_symbol_table::Symbol;
use blueprint_workspace_index::WorkspaceIndex;

/// What the cursor is on.
#[derive(Debug)]
pub(crate) enum Target<'a> {
    /// The name identifier of a declaration
    Declaration(&'a Symbol),
    /// An identifier inside a `@depends-on` reference
    Reference {
        /// The whole reference
        reference: &'a Reference,
        /// Dotted prefix ending at the hovered part (`M.F` when hovering
        /// `F` in `M.F.R`)
        prefix: String,
    },
}

/// Resolves what sits under a byte offset in `uri`.
///
/// Keywords and free text yield `None`; only declaration names and
/// reference identifiers are addressable.
pub(crate) fn target_at<'a>(
    index: &'a WorkspaceIndex,
    uri: &str,
    offset: usize,
) -> Option<Target<'a>> {
    let slice = index.file(uri)?;

    if let Some(symbol) =
        slice.table.all_symbols().find(|s| s.name_location.span.contains(offset))
    {
        return Some(Target::Declaration(symbol));
    }

    for owned in &slice.references {
        if !owned.reference.location.span.contains(offset) {
            continue;
        }
        let prefix = match owned.reference.part_at_offset(offset) {
            Some(part) => owned.reference.prefix_at(part),
            // On a dot or separator: treat as the whole reference.
            None => owned.reference.canonical(),
        };
        return Some(Target::Reference { reference: &owned.reference, prefix });
    }
    None
}
