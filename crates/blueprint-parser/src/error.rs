//! Syntax error records emitted during recovery.

use blueprint_position_tracking::ByteSpan;
use thiserror::Error;

/// A recovered syntax error.
///
/// Parsing never aborts; every malformed fragment yields one of these plus
/// an `ERROR` node in the tree. The span points at the offending text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {span}")]
pub struct SyntaxError {
    /// Human-readable description of what went wrong
    pub message: String,
    /// Byte span of the offending fragment
    pub span: ByteSpan,
}

impl SyntaxError {
    pub(crate) fn new(message: impl Into<String>, span: ByteSpan) -> Self {
        Self { message: message.into(), span }
    }
}
