//! Position tracking for the Blueprint language server.
//!
//! Blueprint analysis runs on byte offsets; the LSP protocol speaks in
//! 0-indexed lines and UTF-16 code-unit columns. This crate holds both
//! representations and the conversions between them:
//!
//! - [`ByteSpan`] - half-open byte range in a document
//! - [`SourceLocation`] - byte span plus resolved line/column endpoints
//! - [`LineIndex`] - per-document line-start table for O(log n) conversion
//! - [`WirePosition`] / [`WireRange`] / [`WireLocation`] - protocol-shaped
//!   types (behind the `lsp-compat` feature)

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod line_index;
mod location;
mod span;

pub use line_index::LineIndex;
pub use location::SourceLocation;
pub use span::ByteSpan;

#[cfg(feature = "lsp-compat")]
mod wire;
#[cfg(feature = "lsp-compat")]
pub use wire::{WireLocation, WirePosition, WireRange};
