//! Derived requirement status.

use blueprint_tickets::{Ticket, TicketStatus};
use rustc_hash::FxHashSet;
use std::fmt;

/// Status derived for a requirement from its matched tickets.
///
/// Distinct from [`BlockingStatus`](crate::BlockingStatus), which comes from
/// dependency analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedStatus {
    /// No ticket references the requirement
    NoTicket,
    /// Every matched ticket is obsolete
    Obsolete,
    /// At least one complete ticket and every declared constraint is
    /// covered by the union of `constraints_satisfied` across complete
    /// tickets
    Complete,
    /// Work started: an in-progress ticket, or completion with constraints
    /// still missing
    InProgress,
    /// Only pending (non-complete) tickets
    Pending,
}

impl DerivedStatus {
    /// Wire form used in diagnostics and the gutter status request.
    pub const fn as_str(self) -> &'static str {
        match self {
            DerivedStatus::NoTicket => "no-ticket",
            DerivedStatus::Obsolete => "obsolete",
            DerivedStatus::Complete => "complete",
            DerivedStatus::InProgress => "in-progress",
            DerivedStatus::Pending => "pending",
        }
    }

    /// Whether this status satisfies a dependency (a blocker is anything
    /// else).
    pub const fn satisfies_dependency(self) -> bool {
        matches!(self, DerivedStatus::Complete | DerivedStatus::Obsolete)
    }
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives the status of one requirement.
///
/// `declared_constraints` are the constraint names declared on the
/// requirement; a complete ticket only completes the requirement when the
/// union of `constraints_satisfied` across complete tickets covers them
/// all.
pub fn derive_status(tickets: &[&Ticket], declared_constraints: &[String]) -> DerivedStatus {
    if tickets.is_empty() {
        return DerivedStatus::NoTicket;
    }
    if tickets.iter().all(|t| t.status == TicketStatus::Obsolete) {
        return DerivedStatus::Obsolete;
    }

    let complete: Vec<&&Ticket> =
        tickets.iter().filter(|t| t.status == TicketStatus::Complete).collect();
    if !complete.is_empty() {
        let satisfied: FxHashSet<&str> = complete
            .iter()
            .flat_map(|t| t.constraints_satisfied.iter().map(String::as_str))
            .collect();
        if declared_constraints.iter().all(|c| satisfied.contains(c.as_str())) {
            return DerivedStatus::Complete;
        }
        return DerivedStatus::InProgress;
    }

    if tickets.iter().any(|t| t.status == TicketStatus::InProgress) {
        return DerivedStatus::InProgress;
    }
    DerivedStatus::Pending
}
