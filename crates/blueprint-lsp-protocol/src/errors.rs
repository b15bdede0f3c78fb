//! JSON-RPC and LSP error codes.

use crate::JsonRpcError;
use serde_json::Value;

/// Invalid JSON was received by the server.
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist or is not available.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i32 = -32602;
/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i32 = -32603;
/// The server has not been initialized.
pub const SERVER_NOT_INITIALIZED: i32 = -32002;
/// The request was cancelled by the client.
pub const REQUEST_CANCELLED: i32 = -32800;
/// The document was modified while the request was in flight.
pub const CONTENT_MODIFIED: i32 = -32801;

/// Error for an unknown method.
pub fn method_not_found(method: &str) -> JsonRpcError {
    JsonRpcError::new(METHOD_NOT_FOUND, format!("method not found: {method}"))
}

/// Error for malformed or missing parameters.
pub fn invalid_params(message: impl Into<String>) -> JsonRpcError {
    JsonRpcError::new(INVALID_PARAMS, message)
}

/// Error for a request referencing an unopened document.
pub fn document_not_found(uri: &str) -> JsonRpcError {
    JsonRpcError::with_data(
        INVALID_PARAMS,
        format!("document not open: {uri}"),
        Value::String(uri.to_string()),
    )
}

/// Error for a request cancelled via `$/cancelRequest`.
pub fn request_cancelled(method: &str) -> JsonRpcError {
    JsonRpcError::new(REQUEST_CANCELLED, format!("request cancelled: {method}"))
}
