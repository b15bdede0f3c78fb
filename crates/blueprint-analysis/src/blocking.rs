//! Blocking analysis types.

use crate::DerivedStatus;
use std::fmt;

/// Dependency-derived status of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockingStatus {
    /// No incomplete dependency
    NotBlocked,
    /// At least one direct or transitive dependency is not complete
    Blocked,
    /// The symbol participates in a dependency cycle
    InCycle,
}

impl BlockingStatus {
    /// Wire form used in diagnostics and the gutter status request.
    pub const fn as_str(self) -> &'static str {
        match self {
            BlockingStatus::NotBlocked => "not-blocked",
            BlockingStatus::Blocked => "blocked",
            BlockingStatus::InCycle => "in-cycle",
        }
    }
}

impl fmt::Display for BlockingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One blocking dependency and its derived status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocker {
    /// Path of the blocking dependency
    pub path: String,
    /// Its derived status (never `complete`/`obsolete`)
    pub status: DerivedStatus,
}

/// Full blocking picture for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockingInfo {
    /// The analyzed path
    pub path: String,
    /// Overall status
    pub status: BlockingStatus,
    /// Cycle peers when `status` is `InCycle`, sorted
    pub cycle_peers: Vec<String>,
    /// Direct dependencies that are not complete
    pub direct_blockers: Vec<Blocker>,
    /// Transitive (non-direct) dependencies that are not complete
    pub transitive_blockers: Vec<Blocker>,
}

impl BlockingInfo {
    pub(crate) fn not_blocked(path: &str) -> Self {
        Self {
            path: path.to_string(),
            status: BlockingStatus::NotBlocked,
            cycle_peers: Vec::new(),
            direct_blockers: Vec::new(),
            transitive_blockers: Vec::new(),
        }
    }
}
