//! LSP method name constants for request/notification routing.
//!
//! Centralizes method identifiers so dispatch, capability registration, and
//! tests agree on spelling. Names follow the LSP 3.17 specification, plus
//! the server's one custom request.

/// `initialize` request
pub const INITIALIZE: &str = "initialize";
/// `initialized` notification
pub const INITIALIZED: &str = "initialized";
/// `shutdown` request
pub const SHUTDOWN: &str = "shutdown";
/// `exit` notification
pub const EXIT: &str = "exit";
/// `$/cancelRequest` notification
pub const CANCEL_REQUEST: &str = "$/cancelRequest";

/// `textDocument/didOpen` notification
pub const TEXT_DOCUMENT_DID_OPEN: &str = "textDocument/didOpen";
/// `textDocument/didChange` notification
pub const TEXT_DOCUMENT_DID_CHANGE: &str = "textDocument/didChange";
/// `textDocument/didSave` notification
pub const TEXT_DOCUMENT_DID_SAVE: &str = "textDocument/didSave";
/// `textDocument/didClose` notification
pub const TEXT_DOCUMENT_DID_CLOSE: &str = "textDocument/didClose";

/// `textDocument/hover` request
pub const TEXT_DOCUMENT_HOVER: &str = "textDocument/hover";
/// `textDocument/definition` request
pub const TEXT_DOCUMENT_DEFINITION: &str = "textDocument/definition";
/// `textDocument/references` request
pub const TEXT_DOCUMENT_REFERENCES: &str = "textDocument/references";
/// `textDocument/documentSymbol` request
pub const TEXT_DOCUMENT_DOCUMENT_SYMBOL: &str = "textDocument/documentSymbol";
/// `textDocument/codeAction` request
pub const TEXT_DOCUMENT_CODE_ACTION: &str = "textDocument/codeAction";
/// `textDocument/completion` request
pub const TEXT_DOCUMENT_COMPLETION: &str = "textDocument/completion";
/// `completionItem/resolve` request
pub const COMPLETION_ITEM_RESOLVE: &str = "completionItem/resolve";
/// `textDocument/semanticTokens/full` request
pub const TEXT_DOCUMENT_SEMANTIC_TOKENS_FULL: &str = "textDocument/semanticTokens/full";
/// `textDocument/diagnostic` request
pub const TEXT_DOCUMENT_DIAGNOSTIC: &str = "textDocument/diagnostic";
/// `textDocument/publishDiagnostics` notification (server → client)
pub const TEXT_DOCUMENT_PUBLISH_DIAGNOSTICS: &str = "textDocument/publishDiagnostics";

/// `workspace/symbol` request
pub const WORKSPACE_SYMBOL: &str = "workspace/symbol";
/// `workspace/didChangeConfiguration` notification
pub const WORKSPACE_DID_CHANGE_CONFIGURATION: &str = "workspace/didChangeConfiguration";
/// `workspace/didChangeWatchedFiles` notification
pub const WORKSPACE_DID_CHANGE_WATCHED_FILES: &str = "workspace/didChangeWatchedFiles";

/// Custom request powering the editor's requirement status gutter
pub const BLUEPRINT_REQUIREMENT_STATUSES: &str = "blueprint/requirementStatuses";
