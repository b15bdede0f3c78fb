//! Per-file symbol tables for the Blueprint LSP.
//!
//! One [`FileSymbolTable`] is built per ingested document. It maps
//! fully-qualified dotted paths to [`Symbol`]s, split by kind into four
//! maps, and records within-file [`DuplicateSymbol`]s. Cross-file merging,
//! conflicts, and reference resolution live in `blueprint-workspace-index`.
//!
//! # Paths
//!
//! - module: `M`
//! - feature: `M.F`
//! - requirement: `M.R` (module-direct) or `M.F.R`
//! - constraint: `<container-path>.C`
//!
//! `M.R` and `M.F.R` are distinct keys; identical simple names at different
//! depths are not duplicates.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use blueprint_ast::{Document, Reference};
use blueprint_position_tracking::SourceLocation;
use rustc_hash::FxHashMap;
use std::fmt;

/// Classification of Blueprint symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// `@module` block
    Module,
    /// `@feature` block
    Feature,
    /// `@requirement` block
    Requirement,
    /// `@constraint` declaration
    Constraint,
}

impl SymbolKind {
    /// Lowercase display name, as used in hovers and diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Feature => "feature",
            SymbolKind::Requirement => "requirement",
            SymbolKind::Constraint => "constraint",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A symbol definition with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Classification
    pub kind: SymbolKind,
    /// Simple name (last path segment)
    pub name: String,
    /// Fully-qualified dotted path
    pub path: String,
    /// Description text; may be empty
    pub description: String,
    /// Span of the whole declaration block
    pub location: SourceLocation,
    /// Span of the name identifier (selection range)
    pub name_location: SourceLocation,
    /// URI of the owning file
    pub file_uri: String,
    /// `@depends-on` references owned by this symbol
    pub references: Vec<Reference>,
    /// Fully-qualified paths of direct children
    pub children: Vec<String>,
}

/// A within-file duplicate: the same fully-qualified path declared twice.
///
/// The last occurrence is kept in the table for best-effort downstream
/// analysis; `original` is what it displaced.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateSymbol {
    /// The first (displaced) declaration
    pub original: Symbol,
    /// The later declaration that was kept
    pub duplicate: Symbol,
    /// Kind of both symbols
    pub kind: SymbolKind,
}

/// Symbol table for one file.
#[derive(Debug, Clone, Default)]
pub struct FileSymbolTable {
    /// URI of the file this table was built from
    pub file_uri: String,
    /// Modules by path
    pub modules: FxHashMap<String, Symbol>,
    /// Features by path
    pub features: FxHashMap<String, Symbol>,
    /// Requirements by path (`M.R` and `M.F.R` forms)
    pub requirements: FxHashMap<String, Symbol>,
    /// Constraints by path
    pub constraints: FxHashMap<String, Symbol>,
    /// Within-file duplicates, in document order
    pub duplicates: Vec<DuplicateSymbol>,
}

impl FileSymbolTable {
    /// Builds the table for `document`.
    ///
    /// Declarations whose name failed to parse (empty name) are skipped
    /// together with their subtrees; their parse errors are reported
    /// separately, and a path cannot be formed for them.
    pub fn from_document(file_uri: &str, document: &Document) -> Self {
        let mut table = FileSymbolTable { file_uri: file_uri.to_string(), ..Default::default() };
        for module in &document.modules {
            if module.name.is_empty() {
                continue;
            }
            table.add_module(module);
        }
        table
    }

    fn add_module(&mut self, module: &blueprint_ast::Module) {
        let path = module.name.clone();
        let mut children = Vec::new();
        for constraint in &module.constraints {
            if let Some(p) = self.add_constraint(&path, constraint) {
                children.push(p);
            }
        }
        for requirement in &module.requirements {
            if let Some(p) = self.add_requirement(&path, requirement) {
                children.push(p);
            }
        }
        for feature in &module.features {
            if let Some(p) = self.add_feature(&path, feature) {
                children.push(p);
            }
        }
        let symbol = Symbol {
            kind: SymbolKind::Module,
            name: module.name.clone(),
            path: path.clone(),
            description: module.description.clone(),
            location: module.location,
            name_location: module.name_location,
            file_uri: self.file_uri.clone(),
            references: module.references().cloned().collect(),
            children,
        };
        insert(&mut self.modules, &mut self.duplicates, symbol);
    }

    fn add_feature(&mut self, module_path: &str, feature: &blueprint_ast::Feature) -> Option<String> {
        if feature.name.is_empty() {
            return None;
        }
        let path = format!("{module_path}.{}", feature.name);
        let mut children = Vec::new();
        for constraint in &feature.constraints {
            if let Some(p) = self.add_constraint(&path, constraint) {
                children.push(p);
            }
        }
        for requirement in &feature.requirements {
            if let Some(p) = self.add_requirement(&path, requirement) {
                children.push(p);
            }
        }
        let symbol = Symbol {
            kind: SymbolKind::Feature,
            name: feature.name.clone(),
            path: path.clone(),
            description: feature.description.clone(),
            location: feature.location,
            name_location: feature.name_location,
            file_uri: self.file_uri.clone(),
            references: feature.references().cloned().collect(),
            children,
        };
        insert(&mut self.features, &mut self.duplicates, symbol);
        Some(path)
    }

    fn add_requirement(
        &mut self,
        container_path: &str,
        requirement: &blueprint_ast::Requirement,
    ) -> Option<String> {
        if requirement.name.is_empty() {
            return None;
        }
        let path = format!("{container_path}.{}", requirement.name);
        let mut children = Vec::new();
        for constraint in &requirement.constraints {
            if let Some(p) = self.add_constraint(&path, constraint) {
                children.push(p);
            }
        }
        let symbol = Symbol {
            kind: SymbolKind::Requirement,
            name: requirement.name.clone(),
            path: path.clone(),
            description: requirement.description.clone(),
            location: requirement.location,
            name_location: requirement.name_location,
            file_uri: self.file_uri.clone(),
            references: requirement.references().cloned().collect(),
            children,
        };
        insert(&mut self.requirements, &mut self.duplicates, symbol);
        Some(path)
    }

    fn add_constraint(
        &mut self,
        container_path: &str,
        constraint: &blueprint_ast::Constraint,
    ) -> Option<String> {
        if constraint.name.is_empty() {
            return None;
        }
        let path = format!("{container_path}.{}", constraint.name);
        let symbol = Symbol {
            kind: SymbolKind::Constraint,
            name: constraint.name.clone(),
            path: path.clone(),
            description: constraint.description.clone(),
            location: constraint.location,
            name_location: constraint.name_location,
            file_uri: self.file_uri.clone(),
            references: Vec::new(),
            children: Vec::new(),
        };
        insert(&mut self.constraints, &mut self.duplicates, symbol);
        Some(path)
    }

    /// Looks a path up across all four maps.
    pub fn get(&self, path: &str) -> Option<&Symbol> {
        self.modules
            .get(path)
            .or_else(|| self.features.get(path))
            .or_else(|| self.requirements.get(path))
            .or_else(|| self.constraints.get(path))
    }

    /// All symbols in the table, in unspecified order.
    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.modules
            .values()
            .chain(self.features.values())
            .chain(self.requirements.values())
            .chain(self.constraints.values())
    }

    /// Total number of kept symbols.
    pub fn len(&self) -> usize {
        self.modules.len() + self.features.len() + self.requirements.len() + self.constraints.len()
    }

    /// Whether the table holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert(
    map: &mut FxHashMap<String, Symbol>,
    duplicates: &mut Vec<DuplicateSymbol>,
    symbol: Symbol,
) {
    if let Some(original) = map.insert(symbol.path.clone(), symbol.clone()) {
        duplicates.push(DuplicateSymbol { original, duplicate: symbol.clone(), kind: symbol.kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_ast::build_document;
    use blueprint_parser::parse;
    use blueprint_position_tracking::LineIndex;
    use pretty_assertions::assert_eq;

    fn table(src: &str) -> FileSymbolTable {
        let tree = parse(src);
        let line_index = LineIndex::new(src);
        let doc = build_document(&tree, src, &line_index);
        FileSymbolTable::from_document("file:///test.bp", &doc)
    }

    #[test]
    fn test_paths() {
        let t = table(
            "@module auth\n@requirement direct\n@feature login\n@requirement basic\n@constraint hashed\n",
        );
        assert!(t.modules.contains_key("auth"));
        assert!(t.features.contains_key("auth.login"));
        assert!(t.requirements.contains_key("auth.direct"));
        assert!(t.requirements.contains_key("auth.login.basic"));
        assert!(t.constraints.contains_key("auth.login.basic.hashed"));
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn test_same_simple_name_at_different_depths_is_not_duplicate() {
        let t = table("@module m\n@requirement x\n@feature f\n@requirement x\n");
        assert!(t.requirements.contains_key("m.x"));
        assert!(t.requirements.contains_key("m.f.x"));
        assert!(t.duplicates.is_empty());
    }

    #[test]
    fn test_duplicate_module_keeps_last() {
        let src = "@module auth\n@feature a\n@module auth\n@feature b\n";
        let t = table(src);
        assert_eq!(t.duplicates.len(), 1);
        let dup = &t.duplicates[0];
        assert_eq!(dup.kind, SymbolKind::Module);
        assert!(dup.original.location.start_line < dup.duplicate.location.start_line);
        // The kept module is the second occurrence.
        let kept = &t.modules["auth"];
        assert_eq!(kept.location.start_line, dup.duplicate.location.start_line);
        assert_eq!(kept.children, vec!["auth.b".to_string()]);
    }

    #[test]
    fn test_duplicate_detection_is_symmetric() {
        let a = table("@module m\n@feature f\n@requirement one\n@requirement two\n@requirement one\n");
        let b = table("@module m\n@feature f\n@requirement one\n@requirement one\n@requirement two\n");
        let paths_a: Vec<_> = a.duplicates.iter().map(|d| d.duplicate.path.clone()).collect();
        let paths_b: Vec<_> = b.duplicates.iter().map(|d| d.duplicate.path.clone()).collect();
        assert_eq!(paths_a, paths_b);
        assert_eq!(paths_a, vec!["m.f.one".to_string()]);
    }

    #[test]
    fn test_references_attached_to_owner() {
        let t = table("@module m\n@feature f\n@depends-on other.mod, third\n");
        let feature = &t.features["m.f"];
        let refs: Vec<_> = feature.references.iter().map(|r| r.canonical()).collect();
        assert_eq!(refs, vec!["other.mod".to_string(), "third".to_string()]);
        assert!(t.modules["m"].references.is_empty());
    }

    #[test]
    fn test_nameless_declarations_are_skipped() {
        let t = table("@module\n@feature f\n");
        assert!(t.is_empty());
    }

    #[test]
    fn test_get_searches_all_kinds() {
        let t = table("@module m\n@feature f\n@requirement r\n@constraint c\n");
        assert_eq!(t.get("m").map(|s| s.kind), Some(SymbolKind::Module));
        assert_eq!(t.get("m.f").map(|s| s.kind), Some(SymbolKind::Feature));
        assert_eq!(t.get("m.f.r").map(|s| s.kind), Some(SymbolKind::Requirement));
        assert_eq!(t.get("m.f.r.c").map(|s| s.kind), Some(SymbolKind::Constraint));
        assert_eq!(t.get("missing"), None);
    }
}
