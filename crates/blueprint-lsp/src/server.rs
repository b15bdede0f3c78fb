//! JSON-RPC dispatch loop for the Blueprint language server.
//!
//! Single-threaded: messages are read off stdin, handled in order against
//! the one [`ServerState`], and answered on stdout. Every query therefore
//! observes a totally-ordered snapshot of the indexes. Long operations
//! (the initial workspace scan) poll the cancellation set between files.

use crate::features::{
    code_actions::code_actions,
    completion::{completion, resolve_completion_item},
    diagnostics::{diagnostics_for, diagnostics_for_ticket_file},
    hover::hover,
    navigation::{definition, references},
    semantic_tokens::semantic_tokens_full,
    status::requirement_statuses,
    symbols::{document_symbols, workspace_symbols},
};
use crate::state::{ServerState, TraceLevel};
use crate::util::{is_ticket_uri, uri_to_fs_path};
use blueprint_lsp_protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, capabilities, invalid_params, method_not_found,
    methods, request_cancelled,
};
use blueprint_lsp_transport::{read_message, write_message, write_notification};
use lsp_types::{
    CodeActionParams, CompletionItem, CompletionParams, DidChangeConfigurationParams,
    DidChangeTextDocumentParams, DidChangeWatchedFilesParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DocumentSymbolParams, FileChangeType, InitializeParams,
    ReferenceParams, SemanticTokens, SemanticTokensParams, TextDocumentPositionParams,
    WorkspaceSymbolParams,
};
use rustc_hash::FxHashSet;
use serde_json::{Value, json};
use std::io::{BufReader, Write, stdin, stdout};
use std::time::{Duration, Instant};

/// Bursts of change notifications are coalesced: diagnostics republish
/// only once the burst has been quiet for this long.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// A server-to-client notification queued by a handler.
type Outgoing = (&'static str, Value);

/// The Blueprint language server.
pub struct LspServer {
    state: ServerState,
    shutdown_requested: bool,
    cancelled: FxHashSet<String>,
    dirty: FxHashSet<String>,
    dirty_since: Option<Instant>,
}

impl Default for LspServer {
    fn default() -> Self {
        Self::new()
    }
}

impl LspServer {
    /// Creates a server with empty state.
    pub fn new() -> Self {
        Self {
            state: ServerState::new(),
            shutdown_requested: false,
            cancelled: FxHashSet::default(),
            dirty: FxHashSet::default(),
            dirty_since: None,
        }
    }

    /// Direct access to state, for tests and the binary.
    pub fn state_mut(&mut self) -> &mut ServerState {
        &mut self.state
    }

    /// Runs the stdio loop until `exit`. Returns the process exit code:
    /// 0 when `shutdown` preceded `exit`, 1 otherwise.
    pub fn run_stdio(&mut self) -> std::io::Result<i32> {
        let mut reader = BufReader::new(stdin());
        let mut writer = stdout();

        loop {
            for (method, params) in self.flush_diagnostics(false) {
                write_notification(&mut writer, method, params)?;
            }
            let Some(request) = read_message(&mut reader)? else {
                // EOF: the client is gone. Mirrors exit-without-shutdown.
                return Ok(if self.shutdown_requested { 0 } else { 1 });
            };
            if request.method == methods::EXIT {
                return Ok(if self.shutdown_requested { 0 } else { 1 });
            }
            self.trace(&request);

            match request.id {
                Some(id) => {
                    let response = match self.handle_request(&request.method, request.params, &id) {
                        Ok(result) => JsonRpcResponse::success(Some(id), result),
                        Err(error) => JsonRpcResponse::error(Some(id), error),
                    };
                    write_message(&mut writer, &response)?;
                }
                None => {
                    for (method, params) in self.handle_notification(&request.method, request.params)
                    {
                        write_notification(&mut writer, method, params)?;
                    }
                }
            }
            writer.flush()?;
        }
    }

    fn trace(&self, request: &JsonRpcRequest) {
        match self.state.config.trace {
            TraceLevel::Off => {}
            TraceLevel::Messages => {
                eprintln!("[blueprint-lsp] <- {}", request.method);
            }
            TraceLevel::Verbose => {
                let size = request.params.as_ref().map(|p| p.to_string().len()).unwrap_or(0);
                eprintln!("[blueprint-lsp] <- {} ({size} bytes)", request.method);
            }
        }
    }

    /// Handles one request and produces its result.
    pub fn handle_request(
        &mut self,
        method: &str,
        params: Option<Value>,
        id: &Value,
    ) -> Result<Value, JsonRpcError> {
        if self.cancelled.remove(&id.to_string()) {
            return Err(request_cancelled(method));
        }

        match method {
            methods::INITIALIZE => self.initialize(params),
            methods::SHUTDOWN => {
                self.shutdown_requested = true;
                Ok(Value::Null)
            }
            methods::TEXT_DOCUMENT_HOVER => {
                let p: TextDocumentPositionParams = parse(params)?;
                let uri = p.text_document.uri.as_str();
                Ok(to_value(hover(&self.state, uri, p.position)))
            }
            methods::TEXT_DOCUMENT_DEFINITION => {
                let p: TextDocumentPositionParams = parse(params)?;
                let uri = p.text_document.uri.as_str().to_string();
                Ok(to_value(definition(&self.state, &uri, p.position)))
            }
            methods::TEXT_DOCUMENT_REFERENCES => {
                let p: ReferenceParams = parse(params)?;
                let uri = p.text_document_position.text_document.uri.as_str().to_string();
                Ok(to_value(references(
                    &self.state,
                    &uri,
                    p.text_document_position.position,
                    p.context.include_declaration,
                )))
            }
            methods::TEXT_DOCUMENT_DOCUMENT_SYMBOL => {
                let p: DocumentSymbolParams = parse(params)?;
                let uri = p.text_document.uri.as_str().to_string();
                Ok(to_value(document_symbols(&self.state, &uri)))
            }
            methods::WORKSPACE_SYMBOL => {
                let p: WorkspaceSymbolParams = parse(params)?;
                Ok(to_value(workspace_symbols(&self.state, &p.query)))
            }
            methods::TEXT_DOCUMENT_CODE_ACTION => {
                let p: CodeActionParams = parse(params)?;
                let uri = p.text_document.uri.as_str().to_string();
                Ok(to_value(code_actions(
                    &mut self.state,
                    &uri,
                    p.range,
                    &p.context.diagnostics,
                )))
            }
            methods::TEXT_DOCUMENT_COMPLETION => {
                let p: CompletionParams = parse(params)?;
                let uri = p.text_document_position.text_document.uri.as_str().to_string();
                Ok(to_value(completion(
                    &mut self.state,
                    &uri,
                    p.text_document_position.position,
                )))
            }
            methods::COMPLETION_ITEM_RESOLVE => {
                let item: CompletionItem = parse(params)?;
                Ok(to_value(resolve_completion_item(&self.state, item)))
            }
            methods::TEXT_DOCUMENT_SEMANTIC_TOKENS_FULL => {
                let p: SemanticTokensParams = parse(params)?;
                let uri = p.text_document.uri.as_str();
                let data = match self.state.document(uri) {
                    Some(document) => semantic_tokens_full(document),
                    None => Vec::new(),
                };
                Ok(to_value(SemanticTokens { result_id: None, data }))
            }
            methods::TEXT_DOCUMENT_DIAGNOSTIC => {
                let uri = param_uri(&params)?;
                let items = if is_ticket_uri(&uri) {
                    self.ticket_diagnostics_by_uri(&uri)
                } else {
                    diagnostics_for(&mut self.state, &uri)
                };
                Ok(json!({ "kind": "full", "items": items }))
            }
            methods::BLUEPRINT_REQUIREMENT_STATUSES => {
                let uri = param_uri(&params)?;
                Ok(to_value(requirement_statuses(&mut self.state, &uri)))
            }
            _ => Err(method_not_found(method)),
        }
    }

    /// Handles one notification; returns notifications to push back.
    pub fn handle_notification(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Vec<Outgoing> {
        match method {
            methods::INITIALIZED => Vec::new(),
            methods::CANCEL_REQUEST => {
                if let Some(id) = params.as_ref().and_then(|p| p.get("id")) {
                    self.cancelled.insert(id.to_string());
                }
                Vec::new()
            }
            methods::TEXT_DOCUMENT_DID_OPEN => {
                let Ok(p) = parse::<DidOpenTextDocumentParams>(params) else { return Vec::new() };
                let uri = p.text_document.uri.as_str().to_string();
                self.state.open_document(&uri, &p.text_document.text, p.text_document.version);
                self.mark_dirty(uri);
                self.flush_diagnostics(true)
            }
            methods::TEXT_DOCUMENT_DID_CHANGE => {
                let Ok(p) = parse::<DidChangeTextDocumentParams>(params) else {
                    return Vec::new();
                };
                let uri = p.text_document.uri.as_str().to_string();
                self.state.change_document(&uri, &p.content_changes, p.text_document.version);
                self.mark_dirty(uri);
                self.flush_diagnostics(false)
            }
            methods::TEXT_DOCUMENT_DID_SAVE => {
                let uri = param_uri(&params).unwrap_or_default();
                if !uri.is_empty() {
                    self.mark_dirty(uri);
                }
                self.flush_diagnostics(true)
            }
            methods::TEXT_DOCUMENT_DID_CLOSE => {
                if let Ok(p) = parse::<DidCloseTextDocumentParams>(params) {
                    self.state.close_document(p.text_document.uri.as_str());
                }
                Vec::new()
            }
            methods::WORKSPACE_DID_CHANGE_CONFIGURATION => {
                if let Ok(p) = parse::<DidChangeConfigurationParams>(params) {
                    self.state.config.update_from_value(&p.settings);
                }
                Vec::new()
            }
            methods::WORKSPACE_DID_CHANGE_WATCHED_FILES => {
                let Ok(p) = parse::<DidChangeWatchedFilesParams>(params) else {
                    return Vec::new();
                };
                for change in &p.changes {
                    let deleted = change.typ == FileChangeType::DELETED;
                    self.state.watched_file_event(change.uri.as_str(), deleted);
                    if is_ticket_uri(change.uri.as_str()) && !deleted {
                        self.mark_dirty(change.uri.as_str().to_string());
                    }
                }
                // Cross-file effects: republish for every open document.
                let open: Vec<String> = self.state.documents.keys().cloned().collect();
                for uri in open {
                    self.mark_dirty(uri);
                }
                self.flush_diagnostics(true)
            }
            _ => Vec::new(),
        }
    }

    fn initialize(&mut self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let p: InitializeParams = parse(params)?;
        let root = p.workspace_folders.as_ref().and_then(|folders| folders.first()).map(
            |folder| folder.uri.as_str().to_string(),
        );
        let root = root.or_else(|| {
            #[allow(deprecated)] // rootUri is the protocol-defined fallback
            let fallback = p.root_uri.as_ref().map(|uri| uri.as_str().to_string());
            fallback
        });
        self.state.workspace_root = root.as_deref().and_then(uri_to_fs_path);

        if let Some(options) = &p.initialization_options {
            self.state.config.update_from_value(options);
        }

        // Single-threaded dispatch: nothing can cancel the initial scan
        // mid-flight, so the cooperative check is a constant here. Bulk
        // re-indexing through watched-file events reuses scan_workspace
        // the same way.
        let scanned = self.state.scan_workspace(|| false);
        if self.state.config.trace != TraceLevel::Off {
            eprintln!("[blueprint-lsp] indexed {scanned} workspace files");
        }

        Ok(json!({
            "capabilities": capabilities::server_capabilities(),
            "serverInfo": {
                "name": "blueprint-lsp",
                "version": env!("CARGO_PKG_VERSION"),
            },
        }))
    }

    fn mark_dirty(&mut self, uri: String) {
        self.dirty.insert(uri);
        self.dirty_since.get_or_insert_with(Instant::now);
    }

    /// Publishes diagnostics for dirty documents once the debounce window
    /// has passed (or immediately when `force` is set).
    fn flush_diagnostics(&mut self, force: bool) -> Vec<Outgoing> {
        let due = match self.dirty_since {
            Some(since) => force || since.elapsed() >= DEBOUNCE,
            None => false,
        };
        if !due {
            return Vec::new();
        }
        self.dirty_since = None;
        let uris: Vec<String> = self.dirty.drain().collect();

        let mut out = Vec::new();
        for uri in uris {
            let items = if is_ticket_uri(&uri) {
                self.ticket_diagnostics_by_uri(&uri)
            } else {
                diagnostics_for(&mut self.state, &uri)
            };
            out.push((
                methods::TEXT_DOCUMENT_PUBLISH_DIAGNOSTICS,
                json!({ "uri": uri, "diagnostics": items }),
            ));
        }
        out
    }

    fn ticket_diagnostics_by_uri(&mut self, uri: &str) -> Vec<lsp_types::Diagnostic> {
        match uri_to_fs_path(uri) {
            Some(path) => {
                diagnostics_for_ticket_file(&mut self.state, &path.to_string_lossy())
            }
            None => Vec::new(),
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    let params = params.unwrap_or(Value::Null);
    serde_json::from_value(params).map_err(|err| invalid_params(err.to_string()))
}

fn to_value<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Extracts a document URI from either `{ uri }` or `{ textDocument: { uri } }`.
fn param_uri(params: &Option<Value>) -> Result<String, JsonRpcError> {
    let params = params.as_ref().ok_or_else(|| invalid_params("missing params"))?;
    params
        .get("uri")
        .or_else(|| params.get("textDocument").and_then(|t| t.get("uri")))
        .and_then(|u| u.as_str())
        .map(str::to_string)
        .ok_or_else(|| invalid_params("missing document uri"))
}

/// Entry point used by the `blueprint-lsp` binary.
pub fn run_stdio() -> std::io::Result<i32> {
    let mut server = LspServer::new();
    server.run_stdio()
}
