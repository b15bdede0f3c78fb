//! Typed AST for the Blueprint DSL.
//!
//! Lowers the concrete syntax tree produced by `blueprint-parser` into a
//! typed document model: [`Document`] → [`Module`] → [`Feature`] →
//! [`Requirement`] → [`Constraint`], with [`DependsOn`] declarations and
//! their [`Reference`]s attached to the owning container. Source locations
//! are preserved bit-exact for every node.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod node;
mod printer;

pub use builder::build_document;
pub use node::{
    Constraint, DependsOn, Description, Document, Feature, Module, Reference, ReferencePart,
    Requirement,
};
pub use printer::render;
