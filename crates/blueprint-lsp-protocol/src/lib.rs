//! JSON-RPC protocol types, error codes, and capabilities for blueprint-lsp.
//!
//! This crate isolates protocol types from the LSP runtime so they can be
//! shared across the transport layer, the server, and integration tests.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod capabilities;
mod errors;
mod jsonrpc;
pub mod methods;

pub use errors::*;
pub use jsonrpc::*;
