//! Syntax node kinds for the Blueprint CST.

use std::fmt;

/// The kind of a concrete syntax tree node.
///
/// Kinds mirror the grammar's node names; [`SyntaxKind::grammar_name`]
/// returns the snake_case form used in grammar queries and test fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Root node of a parsed document
    SourceFile,
    /// `@description` block with its body text
    DescriptionBlock,
    /// `@module NAME` block
    ModuleBlock,
    /// `@feature NAME` block
    FeatureBlock,
    /// `@requirement NAME` block
    RequirementBlock,
    /// `@constraint NAME` declaration
    Constraint,
    /// `@depends-on REF[, REF]*` declaration
    DependsOn,
    /// A dotted reference inside `@depends-on`
    Reference,
    /// A single identifier token
    Identifier,
    /// A line of free description text
    DescriptionText,
    /// A fenced code block
    CodeBlock,
    /// A line or block comment
    Comment,
    /// Recovery node wrapping an unparseable fragment
    Error,
}

impl SyntaxKind {
    /// The grammar-level name of this kind.
    pub const fn grammar_name(self) -> &'static str {
        match self {
            SyntaxKind::SourceFile => "source_file",
            SyntaxKind::DescriptionBlock => "description_block",
            SyntaxKind::ModuleBlock => "module_block",
            SyntaxKind::FeatureBlock => "feature_block",
            SyntaxKind::RequirementBlock => "requirement_block",
            SyntaxKind::Constraint => "constraint",
            SyntaxKind::DependsOn => "depends_on",
            SyntaxKind::Reference => "reference",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::DescriptionText => "description_text",
            SyntaxKind::CodeBlock => "code_block",
            SyntaxKind::Comment => "comment",
            SyntaxKind::Error => "ERROR",
        }
    }

    /// Whether this kind is introduced by an `@keyword` directive.
    pub const fn directive_keyword(self) -> Option<&'static str> {
        match self {
            SyntaxKind::DescriptionBlock => Some("@description"),
            SyntaxKind::ModuleBlock => Some("@module"),
            SyntaxKind::FeatureBlock => Some("@feature"),
            SyntaxKind::RequirementBlock => Some("@requirement"),
            SyntaxKind::Constraint => Some("@constraint"),
            SyntaxKind::DependsOn => Some("@depends-on"),
            _ => None,
        }
    }

    /// Whether this kind declares a named symbol.
    pub const fn is_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::ModuleBlock
                | SyntaxKind::FeatureBlock
                | SyntaxKind::RequirementBlock
                | SyntaxKind::Constraint
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.grammar_name())
    }
}
