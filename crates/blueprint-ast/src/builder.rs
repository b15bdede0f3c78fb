//! CST to AST lowering.
//!
//! The builder walks the parse tree and produces the typed document model.
//! Children found one level inside `ERROR` nodes are recovered so elements
//! salvaged by parser recovery still reach the index; deeper nesting is not
//! searched.

use crate::{
    Constraint, DependsOn, Description, Document, Feature, Module, Reference, ReferencePart,
    Requirement,
};
use blueprint_parser::{CstNode, ParseTree, SyntaxKind};
use blueprint_position_tracking::{ByteSpan, LineIndex, SourceLocation};

/// Builds the typed [`Document`] for one parsed file.
pub fn build_document(tree: &ParseTree, text: &str, line_index: &LineIndex) -> Document {
    let builder = Builder { text, line_index };
    builder.document(&tree.root)
}

struct Builder<'a> {
    text: &'a str,
    line_index: &'a LineIndex,
}

impl Builder<'_> {
    fn locate(&self, span: ByteSpan) -> SourceLocation {
        self.line_index.locate(self.text, span)
    }

    /// Yields `node`'s children, looking one level into ERROR nodes so
    /// recovered declarations are not lost.
    fn unwrapped<'n>(&self, node: &'n CstNode) -> impl Iterator<Item = &'n CstNode> {
        node.children.iter().flat_map(|child| {
            if child.kind == SyntaxKind::Error {
                child.children.iter().collect::<Vec<_>>()
            } else {
                vec![child]
            }
        })
    }

    fn document(&self, root: &CstNode) -> Document {
        let mut doc = Document { location: self.locate(root.span), ..Default::default() };
        for child in self.unwrapped(root) {
            match child.kind {
                SyntaxKind::DescriptionBlock => {
                    let location = self.locate(child.span);
                    doc.description_occurrences.push(location);
                    // Last occurrence wins; duplicates surface as
                    // diagnostics downstream.
                    doc.description =
                        Some(Description { text: self.body_text(child), location });
                }
                SyntaxKind::ModuleBlock => doc.modules.push(self.module(child)),
                _ => {}
            }
        }
        doc
    }

    fn module(&self, node: &CstNode) -> Module {
        let (name, name_location) = self.declaration_name(node);
        let mut module = Module {
            name,
            name_location,
            location: self.locate(node.span),
            description: self.body_text(node),
            depends_on: Vec::new(),
            constraints: Vec::new(),
            requirements: Vec::new(),
            features: Vec::new(),
        };
        for child in self.unwrapped(node) {
            match child.kind {
                SyntaxKind::FeatureBlock => module.features.push(self.feature(child)),
                SyntaxKind::RequirementBlock => module.requirements.push(self.requirement(child)),
                SyntaxKind::Constraint => module.constraints.push(self.constraint(child)),
                SyntaxKind::DependsOn => module.depends_on.push(self.depends_on(child)),
                _ => {}
            }
        }
        module
    }

    fn feature(&self, node: &CstNode) -> Feature {
        let (name, name_location) = self.declaration_name(node);
        let mut feature = Feature {
            name,
            name_location,
            location: self.locate(node.span),
            description: self.body_text(node),
            depends_on: Vec::new(),
            constraints: Vec::new(),
            requirements: Vec::new(),
        };
        for child in self.unwrapped(node) {
            match child.kind {
                SyntaxKind::RequirementBlock => feature.requirements.push(self.requirement(child)),
                SyntaxKind::Constraint => feature.constraints.push(self.constraint(child)),
                SyntaxKind::DependsOn => feature.depends_on.push(self.depends_on(child)),
                _ => {}
            }
        }
        feature
    }

    fn requirement(&self, node: &CstNode) -> Requirement {
        let (name, name_location) = self.declaration_name(node);
        let mut requirement = Requirement {
            name,
            name_location,
            location: self.locate(node.span),
            description: self.body_text(node),
            depends_on: Vec::new(),
            constraints: Vec::new(),
        };
        for child in self.unwrapped(node) {
            match child.kind {
                SyntaxKind::Constraint => requirement.constraints.push(self.constraint(child)),
                SyntaxKind::DependsOn => requirement.depends_on.push(self.depends_on(child)),
                _ => {}
            }
        }
        requirement
    }

    fn constraint(&self, node: &CstNode) -> Constraint {
        let (name, name_location) = self.declaration_name(node);
        Constraint {
            name,
            name_location,
            location: self.locate(node.span),
            description: self.body_text(node),
        }
    }

    fn depends_on(&self, node: &CstNode) -> DependsOn {
        let references = node
            .children_of(SyntaxKind::Reference)
            .map(|r| self.reference(r))
            .collect();
        DependsOn { references, location: self.locate(node.span) }
    }

    fn reference(&self, node: &CstNode) -> Reference {
        let parts = node
            .children_of(SyntaxKind::Identifier)
            .map(|id| ReferencePart {
                text: id.text(self.text).to_string(),
                location: self.locate(id.span),
            })
            .collect();
        Reference { parts, location: self.locate(node.span) }
    }

    /// Name text and identifier location; the keyword span stands in when
    /// the name is missing so selection ranges stay usable.
    fn declaration_name(&self, node: &CstNode) -> (String, SourceLocation) {
        match node.name_field() {
            Some(name) => (name.text(self.text).to_string(), self.locate(name.span)),
            None => {
                let keyword_len =
                    node.kind.directive_keyword().map(str::len).unwrap_or(0);
                let span = ByteSpan::new(node.span.start, node.span.start + keyword_len);
                (String::new(), self.locate(span))
            }
        }
    }

    /// Description text: `description_text` lines and code-block contents
    /// joined by newlines, trimmed.
    fn body_text(&self, node: &CstNode) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for child in &node.children {
            match child.kind {
                SyntaxKind::DescriptionText => parts.push(child.text(self.text)),
                SyntaxKind::CodeBlock => {
                    if let Some(content) = child.first_child_of(SyntaxKind::DescriptionText) {
                        parts.push(content.text(self.text));
                    }
                }
                _ => {}
            }
        }
        parts.join("\n").trim().to_string()
    }
}
