//! The `blueprint/requirementStatuses` custom request.
//!
//! Powers the editor's gutter: one entry per requirement declared in the
//! document, with the line of its name identifier and the effective
//! status. Dependency states take precedence over ticket states: a
//! requirement caught in a cycle reports `in-cycle`, a blocked one
//! `blocked`, otherwise the ticket-derived status is reported.

use crate::state::ServerState;
use blueprint_analysis::BlockingStatus;
use serde::Serialize;

/// One gutter entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementStatus {
    /// 0-indexed line of the requirement's name identifier
    pub line: u32,
    /// Effective status string (`no-ticket`, `pending`, `in-progress`,
    /// `complete`, `obsolete`, `blocked`, `in-cycle`)
    pub status: String,
    /// Fully-qualified requirement path
    pub path: String,
}

/// Response payload for `blueprint/requirementStatuses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementStatuses {
    /// Entries in document order
    pub requirements: Vec<RequirementStatus>,
}

/// Computes gutter statuses for one document.
pub fn requirement_statuses(state: &mut ServerState, uri: &str) -> RequirementStatuses {
    let analysis = state.analysis.get(&state.index, &state.tickets);
    let Some(slice) = state.index.file(uri) else {
        return RequirementStatuses { requirements: Vec::new() };
    };

    let mut requirements: Vec<RequirementStatus> = slice
        .table
        .requirements
        .values()
        .map(|symbol| {
            let status = match analysis.blocking(&symbol.path).map(|info| info.status) {
                Some(BlockingStatus::InCycle) => "in-cycle".to_string(),
                Some(BlockingStatus::Blocked) => "blocked".to_string(),
                _ => analysis.derived_status(&symbol.path).as_str().to_string(),
            };
            RequirementStatus {
                line: symbol.name_location.start_line,
                status,
                path: symbol.path.clone(),
            }
        })
        .collect();
    requirements.sort_by_key(|r| r.line);
    RequirementStatuses { requirements }
}
