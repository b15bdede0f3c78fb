//! Blueprint Language Server runtime.
//!
//! Ties the analysis stack (parser → AST → symbol tables → workspace index
//! → dependency graph → tickets → status analysis) to the LSP surface:
//!
//! - [`state`] - document and server state management
//! - [`features`] - hover, navigation, symbols, diagnostics, code actions,
//!   semantic tokens, completion, and the requirement-status request
//! - [`server`] - the JSON-RPC dispatch loop
//!
//! The primary entry point is [`server::run_stdio`], which serves LSP over
//! stdio until the client exits:
//!
//! ```no_run
//! # fn main() -> std::io::Result<()> {
//! let code = blueprint_lsp::server::run_stdio()?;
//! std::process::exit(code);
//! # }
//! ```

#![deny(unsafe_code)]

pub mod features;
pub mod server;
pub mod state;
pub mod util;

pub use server::LspServer;
