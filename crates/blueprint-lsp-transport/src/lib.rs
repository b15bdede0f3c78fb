//! LSP transport layer for blueprint-lsp.
//!
//! Implements Content-Length based message framing over any
//! `BufRead`/`Write` pair, per the LSP Base Protocol. Malformed frames are
//! recoverable: the reader reports them and the caller moves on to the next
//! frame rather than tearing the server down.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod framing;

pub use framing::{read_message, write_message, write_notification};
