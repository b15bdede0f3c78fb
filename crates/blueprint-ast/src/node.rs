//! Typed AST node definitions.
//!
//! One struct per declaration kind rather than a duck-typed tree: every node
//! carries its resolved [`SourceLocation`], containers carry their
//! `@depends-on` lists and children. Names are simple identifiers; dotted
//! paths are assembled by the symbol table.

use blueprint_position_tracking::SourceLocation;

/// A parsed document: at most one kept description plus its modules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// The kept `@description` block (the last one when duplicated)
    pub description: Option<Description>,
    /// Locations of every `@description` block seen, in document order.
    /// More than one entry means the query layer reports duplicates.
    pub description_occurrences: Vec<SourceLocation>,
    /// Top-level modules in document order
    pub modules: Vec<Module>,
    /// Span of the whole document
    pub location: SourceLocation,
}

/// A `@description` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    /// Body text: description lines and code-block contents joined by
    /// newlines, trimmed
    pub text: String,
    /// Span of the block including its body
    pub location: SourceLocation,
}

/// A `@module` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Simple name; empty when the declaration is missing its name
    pub name: String,
    /// Location of the name identifier (the keyword when the name is absent)
    pub name_location: SourceLocation,
    /// Span of the whole block
    pub location: SourceLocation,
    /// Description text gathered from body lines
    pub description: String,
    /// `@depends-on` declarations in document order
    pub depends_on: Vec<DependsOn>,
    /// Constraints declared directly on the module
    pub constraints: Vec<Constraint>,
    /// Module-direct requirements (these precede any feature)
    pub requirements: Vec<Requirement>,
    /// Features in document order
    pub features: Vec<Feature>,
}

/// A `@feature` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Simple name; empty when absent
    pub name: String,
    /// Location of the name identifier
    pub name_location: SourceLocation,
    /// Span of the whole block
    pub location: SourceLocation,
    /// Description text
    pub description: String,
    /// `@depends-on` declarations
    pub depends_on: Vec<DependsOn>,
    /// Constraints declared directly on the feature
    pub constraints: Vec<Constraint>,
    /// Requirements in document order
    pub requirements: Vec<Requirement>,
}

/// A `@requirement` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Simple name; empty when absent
    pub name: String,
    /// Location of the name identifier
    pub name_location: SourceLocation,
    /// Span of the whole block
    pub location: SourceLocation,
    /// Description text
    pub description: String,
    /// `@depends-on` declarations
    pub depends_on: Vec<DependsOn>,
    /// Declared constraints
    pub constraints: Vec<Constraint>,
}

/// A `@constraint` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// Simple name; empty when absent
    pub name: String,
    /// Location of the name identifier
    pub name_location: SourceLocation,
    /// Span including any trailing description lines
    pub location: SourceLocation,
    /// Description text following the declaration
    pub description: String,
}

/// One `@depends-on` declaration and its references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependsOn {
    /// References in declaration order
    pub references: Vec<Reference>,
    /// Span of the declaration line
    pub location: SourceLocation,
}

/// A dotted reference inside `@depends-on`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Identifier parts in order; never empty
    pub parts: Vec<ReferencePart>,
    /// Span of the whole reference
    pub location: SourceLocation,
}

/// One identifier part of a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePart {
    /// Identifier text
    pub text: String,
    /// Span of this part
    pub location: SourceLocation,
}

impl Reference {
    /// Canonical dotted form, e.g. `auth.login.basic-auth`.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&part.text);
        }
        out
    }

    /// The dotted prefix ending at `part_index` (inclusive).
    ///
    /// Used by go-to-definition: hovering the second part of `a.b.c`
    /// resolves `a.b`.
    pub fn prefix_at(&self, part_index: usize) -> String {
        let end = (part_index + 1).min(self.parts.len());
        let mut out = String::new();
        for (i, part) in self.parts.iter().take(end).enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&part.text);
        }
        out
    }

    /// Index of the part whose span contains `offset`, if any.
    pub fn part_at_offset(&self, offset: usize) -> Option<usize> {
        self.parts.iter().position(|p| p.location.span.contains(offset))
    }
}

impl Module {
    /// All references declared on this module itself.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.depends_on.iter().flat_map(|d| d.references.iter())
    }
}

impl Feature {
    /// All references declared on this feature itself.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.depends_on.iter().flat_map(|d| d.references.iter())
    }
}

impl Requirement {
    /// All references declared on this requirement itself.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.depends_on.iter().flat_map(|d| d.references.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_position_tracking::{ByteSpan, SourceLocation};

    fn part(text: &str, start: usize) -> ReferencePart {
        ReferencePart {
            text: text.to_string(),
            location: SourceLocation {
                span: ByteSpan::new(start, start + text.len()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_canonical_and_prefix() {
        let reference = Reference {
            parts: vec![part("auth", 0), part("login", 5), part("basic", 11)],
            location: SourceLocation::default(),
        };
        assert_eq!(reference.canonical(), "auth.login.basic");
        assert_eq!(reference.prefix_at(0), "auth");
        assert_eq!(reference.prefix_at(1), "auth.login");
        assert_eq!(reference.prefix_at(9), "auth.login.basic");
    }

    #[test]
    fn test_part_at_offset() {
        let reference = Reference {
            parts: vec![part("auth", 0), part("login", 5)],
            location: SourceLocation::default(),
        };
        assert_eq!(reference.part_at_offset(2), Some(0));
        assert_eq!(reference.part_at_offset(6), Some(1));
        assert_eq!(reference.part_at_offset(4), None);
    }
}
