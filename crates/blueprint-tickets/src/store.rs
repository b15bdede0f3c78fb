//! Workspace-wide ticket store and requirement-to-ticket map.

use crate::{Ticket, TicketFile, parse_ticket_file};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// Default workspace-relative directory holding ticket files.
pub const DEFAULT_TICKETS_PATH: &str = ".blueprint/tickets";

/// Computes the ticket file path for a `.bp` document.
///
/// Only the basename of the document participates:
/// `<workspace>/<tickets_path>/<basename>.tickets.json`.
pub fn ticket_file_for(workspace_root: &Path, tickets_path: &str, bp_path: &Path) -> PathBuf {
    let stem = bp_path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    workspace_root.join(tickets_path).join(format!("{stem}.tickets.json"))
}

/// Whether `path` names a ticket file.
pub fn is_ticket_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".tickets.json"))
}

/// All ingested ticket files plus the derived requirement → tickets map.
///
/// The store owns parsed [`TicketFile`]s keyed by their filesystem path and
/// keeps a reverse index from requirement path to the tickets referencing
/// it. Files are replaced atomically on change; the map is rebuilt from the
/// touched slice only.
#[derive(Debug, Default)]
pub struct TicketStore {
    files: FxHashMap<String, TicketFile>,
    by_requirement: FxHashMap<String, Vec<TicketKey>>,
    version: u64,
}

/// Stable handle to one ticket inside the store.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TicketKey {
    file: String,
    index: usize,
}

impl TicketStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter bumped on every mutation; derived caches key off
    /// it.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Parses `text` and replaces the slice for `path`.
    pub fn upsert_file(&mut self, path: &str, text: &str) -> &TicketFile {
        let file = parse_ticket_file(path, text);
        self.files.insert(path.to_string(), file);
        self.rebuild_map();
        self.version += 1;
        &self.files[path]
    }

    /// Removes the slice for `path`.
    pub fn remove_file(&mut self, path: &str) {
        if self.files.remove(path).is_some() {
            self.rebuild_map();
            self.version += 1;
        }
    }

    fn rebuild_map(&mut self) {
        self.by_requirement.clear();
        for (path, file) in &self.files {
            for (index, ticket) in file.tickets.iter().enumerate() {
                self.by_requirement
                    .entry(ticket.reference.clone())
                    .or_default()
                    .push(TicketKey { file: path.clone(), index });
            }
        }
        for keys in self.by_requirement.values_mut() {
            keys.sort_by(|a, b| a.file.cmp(&b.file).then(a.index.cmp(&b.index)));
        }
    }

    /// The ingested file at `path`, if any.
    pub fn file(&self, path: &str) -> Option<&TicketFile> {
        self.files.get(path)
    }

    /// All ingested files.
    pub fn files(&self) -> impl Iterator<Item = &TicketFile> {
        self.files.values()
    }

    /// Tickets referencing the requirement at `path`, ordered by file then
    /// position.
    pub fn tickets_for(&self, requirement_path: &str) -> Vec<&Ticket> {
        let Some(keys) = self.by_requirement.get(requirement_path) else { return Vec::new() };
        keys.iter()
            .filter_map(|key| self.files.get(&key.file).and_then(|f| f.tickets.get(key.index)))
            .collect()
    }

    /// Like [`TicketStore::tickets_for`], but pairs each ticket with the
    /// path of the file declaring it (for navigation into ticket files).
    pub fn tickets_with_files_for(&self, requirement_path: &str) -> Vec<(&str, &Ticket)> {
        let Some(keys) = self.by_requirement.get(requirement_path) else { return Vec::new() };
        keys.iter()
            .filter_map(|key| {
                self.files
                    .get(&key.file)
                    .and_then(|f| f.tickets.get(key.index))
                    .map(|t| (key.file.as_str(), t))
            })
            .collect()
    }

    /// Every requirement path referenced by at least one ticket.
    pub fn referenced_requirements(&self) -> impl Iterator<Item = &str> {
        self.by_requirement.keys().map(String::as_str)
    }

    /// Tickets whose `ref` names no known requirement, with their file
    /// paths. These are kept but marked orphan.
    pub fn orphan_tickets(&self, mut is_known: impl FnMut(&str) -> bool) -> Vec<(&str, &Ticket)> {
        let mut orphans = Vec::new();
        for (path, file) in &self.files {
            for ticket in &file.tickets {
                if !is_known(&ticket.reference) {
                    orphans.push((path.as_str(), ticket));
                }
            }
        }
        orphans
    }

    /// Total ticket count across all files.
    pub fn ticket_count(&self) -> usize {
        self.files.values().map(|f| f.tickets.len()).sum()
    }
}
