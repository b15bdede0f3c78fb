//! Server-owned state: documents, indexes, tickets, derived caches.
//!
//! One `ServerState` is owned by the dispatch loop; every mutation and
//! query goes through it, so queries always observe a totally-ordered
//! snapshot. Mutations bump version counters on the index and ticket
//! store; derived analysis recomputes lazily at query time.

use crate::state::{DocumentState, ServerConfig};
use crate::util::{fs_path_to_uri, is_bp_uri, is_ticket_uri, uri_to_fs_path};
use blueprint_analysis::AnalysisCache;
use blueprint_ast::build_document;
use blueprint_parser::parse;
use blueprint_position_tracking::LineIndex;
use blueprint_tickets::{TicketStore, is_ticket_file};
use blueprint_workspace_index::WorkspaceIndex;
use lsp_types::TextDocumentContentChangeEvent;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories never scanned for Blueprint documents.
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", "target", ".hg", ".svn"];

/// All state owned by the event loop.
#[derive(Debug, Default)]
pub struct ServerState {
    /// Workspace root from `initialize`
    pub workspace_root: Option<PathBuf>,
    /// Live configuration
    pub config: ServerConfig,
    /// Open documents by URI
    pub documents: FxHashMap<String, DocumentState>,
    /// Cross-file symbol index (open docs use live text, closed docs their
    /// last ingested text)
    pub index: WorkspaceIndex,
    /// Ingested ticket files
    pub tickets: TicketStore,
    /// Lazily recomputed status/blocking snapshot
    pub analysis: AnalysisCache,
}

impl ServerState {
    /// Creates empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a document: stores live state and (re)indexes it.
    pub fn open_document(&mut self, uri: &str, text: &str, version: i32) {
        let document = DocumentState::new(text, version);
        self.index.add_file(uri, &document.document);
        self.documents.insert(uri.to_string(), document);
    }

    /// Applies changes to an open document and reindexes its slice.
    ///
    /// Unknown URIs are ignored (the client is ahead of us); the next
    /// `didOpen` resynchronizes.
    pub fn change_document(
        &mut self,
        uri: &str,
        changes: &[TextDocumentContentChangeEvent],
        version: i32,
    ) {
        if let Some(document) = self.documents.get_mut(uri) {
            document.apply_changes(changes, version);
            self.index.add_file(uri, &document.document);
        }
    }

    /// Closes a document. The index keeps the last known content as the
    /// closed-file snapshot.
    pub fn close_document(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    /// The open document at `uri`, if any.
    pub fn document(&self, uri: &str) -> Option<&DocumentState> {
        self.documents.get(uri)
    }

    /// Parses `text` and replaces the index slice for `uri` without
    /// keeping live document state (used for closed files and scans).
    pub fn ingest_bp_text(&mut self, uri: &str, text: &str) {
        let tree = parse(text);
        let line_index = LineIndex::new(text);
        let document = build_document(&tree, text, &line_index);
        self.index.add_file(uri, &document);
    }

    /// Reads and ingests a `.bp` file from disk.
    ///
    /// IO errors are logged and the file is treated as empty; caches are
    /// never poisoned by a failed read.
    pub fn ingest_bp_from_disk(&mut self, path: &Path) {
        let Some(uri) = fs_path_to_uri(path) else { return };
        if self.documents.contains_key(&uri) {
            return; // open documents own their content
        }
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("[blueprint-lsp] failed to read {}: {err}", path.display());
                String::new()
            }
        };
        self.ingest_bp_text(&uri, &text);
    }

    /// Reads and ingests a ticket file from disk.
    pub fn ingest_tickets_from_disk(&mut self, path: &Path) {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("[blueprint-lsp] failed to read {}: {err}", path.display());
                String::new()
            }
        };
        self.tickets.upsert_file(&path.to_string_lossy(), &text);
    }

    /// Handles a watched-file event for any supported file type.
    ///
    /// `deleted` removes the slice; otherwise the file is re-read.
    pub fn watched_file_event(&mut self, uri: &str, deleted: bool) {
        if is_bp_uri(uri) {
            if deleted {
                self.index.remove_file(uri);
                self.documents.remove(uri);
            } else if !self.documents.contains_key(uri) {
                if let Some(path) = uri_to_fs_path(uri) {
                    self.ingest_bp_from_disk(&path);
                }
            }
        } else if is_ticket_uri(uri) {
            match uri_to_fs_path(uri) {
                Some(path) => {
                    let key = path.to_string_lossy().to_string();
                    if deleted {
                        self.tickets.remove_file(&key);
                    } else {
                        self.ingest_tickets_from_disk(&path);
                    }
                }
                None => {}
            }
        }
    }

    /// Scans the workspace for `.bp` documents and ticket files.
    ///
    /// `cancelled` is consulted between files so bulk indexing can stop at
    /// a cooperative yield point; partial progress is kept (each ingested
    /// file was replaced atomically).
    pub fn scan_workspace(&mut self, mut cancelled: impl FnMut() -> bool) -> usize {
        let Some(root) = self.workspace_root.clone() else { return 0 };
        let mut ingested = 0;

        for entry in WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.file_name().to_str().map(|name| !SKIPPED_DIRS.contains(&name)).unwrap_or(true)
            })
            .flatten()
        {
            if cancelled() {
                return ingested;
            }
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().and_then(|e| e.to_str()) == Some("bp")
            {
                self.ingest_bp_from_disk(path);
                ingested += 1;
            }
        }

        let tickets_dir = root.join(&self.config.tickets_path);
        if tickets_dir.is_dir() {
            for entry in WalkDir::new(&tickets_dir).max_depth(1).into_iter().flatten() {
                if cancelled() {
                    return ingested;
                }
                let path = entry.path();
                if entry.file_type().is_file() && is_ticket_file(path) {
                    self.ingest_tickets_from_disk(path);
                    ingested += 1;
                }
            }
        }
        ingested
    }
}
