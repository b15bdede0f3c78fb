//! Concrete syntax tree parser for the Blueprint requirements DSL.
//!
//! Blueprint documents describe a system as a tree of `@module` →
//! `@feature` → `@requirement` → `@constraint` declarations with
//! `@depends-on` cross-references. This crate turns document text into a
//! [`ParseTree`] of typed [`CstNode`]s with byte-exact spans.
//!
//! # Error recovery
//!
//! Errors in the source never abort parsing. Each unparseable fragment
//! becomes an [`SyntaxKind::Error`] node (and a [`SyntaxError`] record)
//! while well-formed siblings remain reachable, so IDE features keep
//! working on broken documents.
//!
//! # Example
//!
//! ```
//! use blueprint_parser::{parse, SyntaxKind};
//!
//! let tree = parse("@module auth\n@feature login\n");
//! let module = tree.root.first_child_of(SyntaxKind::ModuleBlock).unwrap();
//! assert_eq!(module.name_field().unwrap().text("@module auth\n@feature login\n"), "auth");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cst;
mod error;
mod kind;
mod parser;

pub use cst::{CstNode, Descendants, Field};
pub use error::SyntaxError;
pub use kind::SyntaxKind;
pub use parser::{ParseTree, Parser, parse};
