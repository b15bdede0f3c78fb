//! Ticket data model.

use blueprint_position_tracking::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored ticket status.
///
/// `blocked` is deliberately absent: blocking is derived from the dependency
/// graph, never written into ticket files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    /// Work not started
    Pending,
    /// Work started but not finished
    InProgress,
    /// Work finished
    Complete,
    /// Ticket no longer applies
    Obsolete,
}

impl TicketStatus {
    /// Parses the wire form (`pending`, `in-progress`, `complete`,
    /// `obsolete`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TicketStatus::Pending),
            "in-progress" => Some(TicketStatus::InProgress),
            "complete" => Some(TicketStatus::Complete),
            "obsolete" => Some(TicketStatus::Obsolete),
            _ => None,
        }
    }

    /// Wire form of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::InProgress => "in-progress",
            TicketStatus::Complete => "complete",
            TicketStatus::Obsolete => "obsolete",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional implementation pointers carried by a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TicketImplementation {
    /// Source files implementing the requirement
    #[serde(default)]
    pub files: Vec<String>,
    /// Test files covering the requirement
    #[serde(default)]
    pub tests: Vec<String>,
}

/// One ticket tracking implementation progress of a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Ticket identifier, unique within its file
    pub id: String,
    /// Fully-qualified requirement path this ticket tracks
    pub reference: String,
    /// Free-form description
    pub description: String,
    /// Stored status
    pub status: TicketStatus,
    /// Constraint names this ticket claims to satisfy
    pub constraints_satisfied: Vec<String>,
    /// Implementation pointers, when recorded
    pub implementation: Option<TicketImplementation>,
    /// Location of the ticket's `{ … }` object inside the ticket file
    pub location: SourceLocation,
}

/// Severity of a ticket file issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// The offending element contributes nothing downstream
    Error,
    /// Ingestion continues; surfaced to the user
    Warning,
}

/// A validation or parse issue found in a ticket file.
///
/// `json_path` is the dotted path of the offending element
/// (`tickets[3].status`); empty for file-level failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{json_path}: {message}")]
pub struct TicketIssue {
    /// Dotted JSON path of the offending element
    pub json_path: String,
    /// Human-readable description
    pub message: String,
    /// Whether ingestion of the element was abandoned
    pub severity: IssueSeverity,
}

impl TicketIssue {
    pub(crate) fn error(json_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { json_path: json_path.into(), message: message.into(), severity: IssueSeverity::Error }
    }

    pub(crate) fn warning(json_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            json_path: json_path.into(),
            message: message.into(),
            severity: IssueSeverity::Warning,
        }
    }
}

/// A parsed ticket file.
#[derive(Debug, Clone, Default)]
pub struct TicketFile {
    /// Filesystem path (or URI) the file was read from
    pub path: String,
    /// Declared format version
    pub version: String,
    /// Declared source `.bp` path (metadata only; resolution is by
    /// requirement path)
    pub source: String,
    /// Tickets that survived validation, in file order
    pub tickets: Vec<Ticket>,
    /// Issues found during parse and validation
    pub issues: Vec<TicketIssue>,
}

impl TicketFile {
    /// Whether any error-severity issue was recorded.
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == IssueSeverity::Error)
    }
}
