//! Workspace-wide symbol index for cross-file lookups.
//!
//! The index is the union of per-file symbol tables plus reverse indexes:
//!
//! - `by_path`: path → all defining symbols (more than one = conflict)
//! - `by_file`: file URI → its table and the references it declares
//! - by-kind listings for workspace symbol search and completion
//!
//! Ingesting a file replaces its slice atomically; queries between
//! mutations observe a consistent snapshot. Reference resolution is exact
//! on the joined dotted path, falling back to the longest existing prefix
//! plus that prefix's direct children (used by diagnostics and completion).
//! The same rule serves references of any depth: deeper-than-three
//! references resolve only when a defined path matches exactly.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use blueprint_ast::{Document, Reference};
use blueprint_graph::{DependencyGraph, Edge};
use blueprint_symbol_table::{FileSymbolTable, Symbol, SymbolKind};
use rustc_hash::{FxHashMap, FxHashSet};

/// A `@depends-on` reference together with its owning symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedReference {
    /// Fully-qualified path of the symbol declaring the reference
    pub owner_path: String,
    /// File the reference appears in
    pub file_uri: String,
    /// The reference itself
    pub reference: Reference,
}

/// One file's slice of the index.
#[derive(Debug, Clone, Default)]
pub struct FileSlice {
    /// Per-file symbol table
    pub table: FileSymbolTable,
    /// References declared in this file, in document order
    pub references: Vec<OwnedReference>,
}

/// Outcome of resolving a reference against the index.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// The joined path is defined; all defining symbols, same-file
    /// definitions first, then by file URI
    Resolved(Vec<&'a Symbol>),
    /// Only a proper dot-prefix of the path exists
    Partial {
        /// The longest existing prefix
        prefix: String,
        /// Symbols defined at that prefix
        symbols: Vec<&'a Symbol>,
        /// Direct children of the prefix, sorted
        children: Vec<String>,
    },
    /// Not even the first segment matches a defined path
    Unresolved,
}

/// Workspace-wide symbol index.
#[derive(Debug, Default)]
pub struct WorkspaceIndex {
    by_file: FxHashMap<String, FileSlice>,
    by_path: FxHashMap<String, Vec<Symbol>>,
    version: u64,
}

impl WorkspaceIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter bumped on every mutation; derived caches key off
    /// it.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Ingests (or replaces) one file's document.
    pub fn add_file(&mut self, uri: &str, document: &Document) {
        let table = FileSymbolTable::from_document(uri, document);
        self.remove_slice(uri);

        let mut references = Vec::new();
        for symbol in table.all_symbols() {
            for reference in &symbol.references {
                references.push(OwnedReference {
                    owner_path: symbol.path.clone(),
                    file_uri: uri.to_string(),
                    reference: reference.clone(),
                });
            }
        }
        references.sort_by_key(|r| r.reference.location.span.start);

        for symbol in table.all_symbols() {
            let slot = self.by_path.entry(symbol.path.clone()).or_default();
            slot.push(symbol.clone());
            slot.sort_by(|a, b| {
                a.file_uri
                    .cmp(&b.file_uri)
                    .then(a.location.span.start.cmp(&b.location.span.start))
            });
        }

        self.by_file.insert(uri.to_string(), FileSlice { table, references });
        self.version += 1;
    }

    /// Erases one file's slice.
    pub fn remove_file(&mut self, uri: &str) {
        if self.by_file.contains_key(uri) {
            self.remove_slice(uri);
            self.by_file.remove(uri);
            self.version += 1;
        }
    }

    fn remove_slice(&mut self, uri: &str) {
        self.by_path.retain(|_, symbols| {
            symbols.retain(|s| s.file_uri != uri);
            !symbols.is_empty()
        });
    }

    /// The slice for `uri`, if ingested.
    pub fn file(&self, uri: &str) -> Option<&FileSlice> {
        self.by_file.get(uri)
    }

    /// URIs of all ingested files.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.by_file.keys().map(String::as_str)
    }

    /// Number of ingested files.
    pub fn file_count(&self) -> usize {
        self.by_file.len()
    }

    /// All defining symbols for `path` (empty when undefined).
    pub fn symbols_at(&self, path: &str) -> &[Symbol] {
        self.by_path.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `path` is defined by any file.
    pub fn is_defined(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Paths defined by more than one file (or more than once across
    /// files), sorted.
    pub fn conflicts(&self) -> Vec<(&str, &[Symbol])> {
        let mut out: Vec<(&str, &[Symbol])> = self
            .by_path
            .iter()
            .filter(|(_, symbols)| symbols.len() > 1)
            .map(|(path, symbols)| (path.as_str(), symbols.as_slice()))
            .collect();
        out.sort_by_key(|(path, _)| *path);
        out
    }

    /// All symbols of `kind`, sorted by path ascending.
    pub fn symbols_of_kind(&self, kind: SymbolKind) -> Vec<&Symbol> {
        let mut out: Vec<&Symbol> =
            self.by_path.values().flatten().filter(|s| s.kind == kind).collect();
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }

    /// Every symbol in the workspace, sorted by path.
    pub fn all_symbols(&self) -> Vec<&Symbol> {
        let mut out: Vec<&Symbol> = self.by_path.values().flatten().collect();
        out.sort_by(|a, b| a.path.cmp(&b.path).then(a.file_uri.cmp(&b.file_uri)));
        out
    }

    /// Direct children of `path`, sorted: defined paths of the form
    /// `path.<segment>` with exactly one extra segment.
    pub fn direct_children(&self, path: &str) -> Vec<String> {
        let prefix = format!("{path}.");
        let mut out: Vec<String> = self
            .by_path
            .keys()
            .filter(|p| {
                p.starts_with(&prefix) && !p[prefix.len()..].contains('.')
            })
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Resolves a dotted path against the index.
    ///
    /// `from_file` breaks ambiguity: definitions in that file sort first.
    pub fn resolve_path<'a>(&'a self, path: &str, from_file: Option<&str>) -> Resolution<'a> {
        if let Some(symbols) = self.by_path.get(path) {
            let mut hits: Vec<&Symbol> = symbols.iter().collect();
            if let Some(preferred) = from_file {
                hits.sort_by_key(|s| (s.file_uri != preferred, s.file_uri.clone()));
            }
            return Resolution::Resolved(hits);
        }

        // Longest existing dot-prefix.
        let mut prefix = path;
        while let Some(dot) = prefix.rfind('.') {
            prefix = &prefix[..dot];
            if let Some(symbols) = self.by_path.get(prefix) {
                return Resolution::Partial {
                    prefix: prefix.to_string(),
                    symbols: symbols.iter().collect(),
                    children: self.direct_children(prefix),
                };
            }
        }
        Resolution::Unresolved
    }

    /// Resolves a parsed reference (exact on its canonical form).
    pub fn resolve_reference<'a>(
        &'a self,
        reference: &Reference,
        from_file: Option<&str>,
    ) -> Resolution<'a> {
        self.resolve_path(&reference.canonical(), from_file)
    }

    /// References (across all files) that do not resolve exactly.
    pub fn unresolved_references(&self) -> Vec<&OwnedReference> {
        let mut out: Vec<&OwnedReference> = self
            .by_file
            .values()
            .flat_map(|slice| slice.references.iter())
            .filter(|r| !self.is_defined(&r.reference.canonical()))
            .collect();
        out.sort_by(|a, b| {
            a.file_uri.cmp(&b.file_uri).then(
                a.reference.location.span.start.cmp(&b.reference.location.span.start),
            )
        });
        out
    }

    /// All references declared anywhere, in stable (file, position) order.
    pub fn all_references(&self) -> Vec<&OwnedReference> {
        let mut out: Vec<&OwnedReference> =
            self.by_file.values().flat_map(|slice| slice.references.iter()).collect();
        out.sort_by(|a, b| {
            a.file_uri.cmp(&b.file_uri).then(
                a.reference.location.span.start.cmp(&b.reference.location.span.start),
            )
        });
        out
    }

    /// Builds the dependency graph from every reference that resolves.
    ///
    /// Unresolved references never become edges; they surface through
    /// [`WorkspaceIndex::unresolved_references`] instead.
    pub fn build_graph(&self) -> DependencyGraph {
        let mut edges = Vec::new();
        for owned in self.all_references() {
            let target = owned.reference.canonical();
            if self.is_defined(&target) {
                edges.push(Edge {
                    from: owned.owner_path.clone(),
                    to: target,
                    file_uri: owned.file_uri.clone(),
                    location: owned.reference.location,
                });
            }
        }
        DependencyGraph::build(edges)
    }

    /// Whether adding an edge `from → to` would close a dependency cycle.
    ///
    /// Completion uses this to hide cycle-creating candidates. Prefer the
    /// cached graph in hot paths; this convenience rebuilds.
    pub fn would_create_circular_dependency(&self, from: &str, to: &str) -> bool {
        self.build_graph().would_create_cycle(from, to)
    }

    /// Files `uri` depends on: the defining files of every resolved
    /// reference declared in `uri`. Used for incremental invalidation.
    pub fn file_dependencies(&self, uri: &str) -> FxHashSet<String> {
        let mut deps = FxHashSet::default();
        let Some(slice) = self.by_file.get(uri) else { return deps };
        for owned in &slice.references {
            for symbol in self.symbols_at(&owned.reference.canonical()) {
                if symbol.file_uri != uri {
                    deps.insert(symbol.file_uri.clone());
                }
            }
        }
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_ast::build_document;
    use blueprint_parser::parse;
    use blueprint_position_tracking::LineIndex;
    use pretty_assertions::assert_eq;

    fn index_files(files: &[(&str, &str)]) -> WorkspaceIndex {
        let mut index = WorkspaceIndex::new();
        for (uri, text) in files {
            add(&mut index, uri, text);
        }
        index
    }

    fn add(index: &mut WorkspaceIndex, uri: &str, text: &str) {
        let tree = parse(text);
        let line_index = LineIndex::new(text);
        let doc = build_document(&tree, text, &line_index);
        index.add_file(uri, &doc);
    }

    const AUTH: &str = "@module auth\n@feature login\n@requirement basic-auth\n";

    #[test]
    fn test_resolution_exact() {
        let index = index_files(&[("file:///a.bp", AUTH)]);
        match index.resolve_path("auth.login.basic-auth", None) {
            Resolution::Resolved(symbols) => {
                assert_eq!(symbols.len(), 1);
                assert_eq!(symbols[0].kind, SymbolKind::Requirement);
            }
            other => panic!("expected resolution, got {other:?}"),
        }
        assert!(matches!(index.resolve_path("auth.login", None), Resolution::Resolved(_)));
        assert!(matches!(index.resolve_path("auth", None), Resolution::Resolved(_)));
    }

    #[test]
    fn test_resolution_partial_with_children() {
        let index = index_files(&[("file:///a.bp", AUTH)]);
        match index.resolve_path("auth.login.missing", None) {
            Resolution::Partial { prefix, children, .. } => {
                assert_eq!(prefix, "auth.login");
                assert_eq!(children, vec!["auth.login.basic-auth".to_string()]);
            }
            other => panic!("expected partial, got {other:?}"),
        }
        assert!(matches!(index.resolve_path("nothing.here", None), Resolution::Unresolved));
    }

    #[test]
    fn test_atomic_replacement() {
        let mut index = index_files(&[("file:///a.bp", AUTH)]);
        add(&mut index, "file:///a.bp", "@module auth\n@feature session\n");
        assert!(index.is_defined("auth.session"));
        assert!(!index.is_defined("auth.login"));
        assert_eq!(index.file_count(), 1);
    }

    #[test]
    fn test_incremental_equals_batch() {
        // Same end state whether built in one batch or with interleaved
        // replacements and removals.
        let mut a = WorkspaceIndex::new();
        add(&mut a, "file:///a.bp", AUTH);
        add(&mut a, "file:///b.bp", "@module store\n");
        add(&mut a, "file:///a.bp", "@module auth\n@feature session\n");
        a.remove_file("file:///b.bp");
        add(&mut a, "file:///b.bp", "@module store\n@feature cache\n");

        let b = index_files(&[
            ("file:///a.bp", "@module auth\n@feature session\n"),
            ("file:///b.bp", "@module store\n@feature cache\n"),
        ]);

        let paths_a: Vec<_> = a.all_symbols().iter().map(|s| s.path.clone()).collect();
        let paths_b: Vec<_> = b.all_symbols().iter().map(|s| s.path.clone()).collect();
        assert_eq!(paths_a, paths_b);
    }

    #[test]
    fn test_conflicts_across_files() {
        let index = index_files(&[
            ("file:///a.bp", "@module auth\n"),
            ("file:///b.bp", "@module auth\n"),
        ]);
        let conflicts = index.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].0, "auth");
        assert_eq!(conflicts[0].1.len(), 2);
        // Still resolvable; both definitions returned.
        match index.resolve_path("auth", Some("file:///b.bp")) {
            Resolution::Resolved(symbols) => {
                assert_eq!(symbols.len(), 2);
                assert_eq!(symbols[0].file_uri, "file:///b.bp");
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_by_kind_sorted() {
        let index = index_files(&[
            ("file:///b.bp", "@module zeta\n@feature z\n"),
            ("file:///a.bp", "@module alpha\n@feature a\n"),
        ]);
        let modules: Vec<_> =
            index.symbols_of_kind(SymbolKind::Module).iter().map(|s| s.path.clone()).collect();
        assert_eq!(modules, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_unresolved_references() {
        let index = index_files(&[
            ("file:///a.bp", "@module a\n@depends-on missing.path, b\n"),
            ("file:///b.bp", "@module b\n"),
        ]);
        let unresolved = index.unresolved_references();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].reference.canonical(), "missing.path");
        assert_eq!(unresolved[0].owner_path, "a");
    }

    #[test]
    fn test_graph_edges_only_for_resolved() {
        let index = index_files(&[
            ("file:///a.bp", "@module a\n@depends-on b, ghost\n"),
            ("file:///b.bp", "@module b\n"),
        ]);
        let graph = index.build_graph();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dependencies("a"), vec!["b".to_string()]);
    }

    #[test]
    fn test_file_dependencies() {
        let index = index_files(&[
            ("file:///a.bp", "@module a\n@depends-on b\n"),
            ("file:///b.bp", "@module b\n"),
        ]);
        let deps = index.file_dependencies("file:///a.bp");
        assert!(deps.contains("file:///b.bp"));
        assert!(index.file_dependencies("file:///b.bp").is_empty());
    }

    #[test]
    fn test_would_create_circular_dependency() {
        let index = index_files(&[
            ("file:///a.bp", "@module a\n@depends-on b\n"),
            ("file:///b.bp", "@module b\n"),
        ]);
        assert!(index.would_create_circular_dependency("b", "a"));
        assert!(!index.would_create_circular_dependency("a", "b"));
    }

    #[test]
    fn test_deep_reference_resolves_only_by_exact_match() {
        let index = index_files(&[(
            "file:///a.bp",
            "@module m\n@feature f\n@requirement r\n@constraint c\n",
        )]);
        // Depth-4 path exists: constraint under a feature requirement.
        assert!(matches!(index.resolve_path("m.f.r.c", None), Resolution::Resolved(_)));
        // Depth-4 path that matches nothing resolves as partial/unresolved.
        assert!(!matches!(index.resolve_path("m.f.r.x", None), Resolution::Resolved(_)));
    }
}
