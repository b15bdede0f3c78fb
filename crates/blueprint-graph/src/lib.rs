//! Dependency graph over fully-qualified Blueprint paths.
//!
//! Edges are flat records over an arena of interned paths (path → `u32`
//! node id); no owning graph-of-pointers exists. The graph is rebuilt from
//! the workspace index whenever a file changes and answers:
//!
//! - direct neighbors ([`DependencyGraph::dependencies`] /
//!   [`DependencyGraph::dependents`])
//! - transitive closures (depth-first with a visited set)
//! - reachability ([`DependencyGraph::has_path`]), used to refuse
//!   cycle-creating completion candidates
//! - simple-cycle enumeration with rotation/direction deduplication

#![deny(unsafe_code)]
#![warn(missing_docs)]

use blueprint_position_tracking::SourceLocation;
use rustc_hash::{FxHashMap, FxHashSet};

/// A resolved dependency edge between two fully-qualified paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Path of the symbol owning the `@depends-on` reference
    pub from: String,
    /// Path the reference resolved to
    pub to: String,
    /// File the reference appears in
    pub file_uri: String,
    /// Location of the reference text (for navigation)
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
struct EdgeRecord {
    from: u32,
    to: u32,
    file_uri: String,
    location: SourceLocation,
}

/// One simple cycle through the graph.
///
/// `nodes` is an ordered path with the first element repeated at the end to
/// signal closure (`[a, b, a]`); `edges` are the edges along it, in order.
/// The rotation starts at the lexicographically smallest node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Node paths along the cycle, first element repeated at the end
    pub nodes: Vec<String>,
    /// Edges along the cycle, one per consecutive node pair
    pub edges: Vec<Edge>,
}

impl Cycle {
    /// Distinct paths participating in this cycle.
    pub fn members(&self) -> &[String] {
        &self.nodes[..self.nodes.len().saturating_sub(1)]
    }
}

/// Directed dependency graph, rebuilt per index version.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    paths: Vec<String>,
    ids: FxHashMap<String, u32>,
    edges: Vec<EdgeRecord>,
    forward: Vec<Vec<u32>>,
    backward: Vec<Vec<u32>>,
}

impl DependencyGraph {
    /// Builds a graph from resolved edges.
    pub fn build(edges: impl IntoIterator<Item = Edge>) -> Self {
        let mut graph = DependencyGraph::default();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    /// Interns `path`, returning its node id.
    fn intern(&mut self, path: &str) -> u32 {
        if let Some(&id) = self.ids.get(path) {
            return id;
        }
        let id = self.paths.len() as u32;
        self.paths.push(path.to_string());
        self.ids.insert(path.to_string(), id);
        self.forward.push(Vec::new());
        self.backward.push(Vec::new());
        id
    }

    /// Adds one edge. Parallel edges (same from/to from different
    /// references) are kept; traversals deduplicate by node.
    pub fn add_edge(&mut self, edge: Edge) {
        let from = self.intern(&edge.from);
        let to = self.intern(&edge.to);
        self.forward[from as usize].push(to);
        self.backward[to as usize].push(from);
        self.edges.push(EdgeRecord { from, to, file_uri: edge.file_uri, location: edge.location });
    }

    /// Number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().map(|e| self.materialize(e))
    }

    /// Edges whose source is `path`.
    pub fn edges_from(&self, path: &str) -> Vec<Edge> {
        match self.ids.get(path) {
            Some(&id) => {
                self.edges.iter().filter(|e| e.from == id).map(|e| self.materialize(e)).collect()
            }
            None => Vec::new(),
        }
    }

    /// Edges whose target is `path` or a child of `path`.
    ///
    /// A reference to `M.F.R` implicitly points through `M` and `M.F`; the
    /// prefix form serves find-references on containers.
    pub fn edges_to_path_or_children(&self, path: &str) -> Vec<Edge> {
        let prefix = format!("{path}.");
        self.edges
            .iter()
            .filter(|e| {
                let to = &self.paths[e.to as usize];
                to == path || to.starts_with(&prefix)
            })
            .map(|e| self.materialize(e))
            .collect()
    }

    /// Edges whose target is exactly `path`.
    pub fn edges_to(&self, path: &str) -> Vec<Edge> {
        match self.ids.get(path) {
            Some(&id) => {
                self.edges.iter().filter(|e| e.to == id).map(|e| self.materialize(e)).collect()
            }
            None => Vec::new(),
        }
    }

    fn materialize(&self, record: &EdgeRecord) -> Edge {
        Edge {
            from: self.paths[record.from as usize].clone(),
            to: self.paths[record.to as usize].clone(),
            file_uri: record.file_uri.clone(),
            location: record.location,
        }
    }

    /// Direct dependencies of `path`, sorted and deduplicated.
    pub fn dependencies(&self, path: &str) -> Vec<String> {
        self.neighbors(path, &self.forward)
    }

    /// Direct dependents of `path`, sorted and deduplicated.
    pub fn dependents(&self, path: &str) -> Vec<String> {
        self.neighbors(path, &self.backward)
    }

    fn neighbors(&self, path: &str, adjacency: &[Vec<u32>]) -> Vec<String> {
        let Some(&id) = self.ids.get(path) else { return Vec::new() };
        let mut out: Vec<String> =
            adjacency[id as usize].iter().map(|&n| self.paths[n as usize].clone()).collect();
        out.sort();
        out.dedup();
        out
    }

    /// Every path reachable from `path` following dependencies, excluding
    /// `path` itself unless it lies on a cycle through itself.
    pub fn transitive_dependencies(&self, path: &str) -> Vec<String> {
        self.reachable(path, &self.forward)
    }

    /// Every path that transitively depends on `path`.
    pub fn transitive_dependents(&self, path: &str) -> Vec<String> {
        self.reachable(path, &self.backward)
    }

    fn reachable(&self, path: &str, adjacency: &[Vec<u32>]) -> Vec<String> {
        let Some(&start) = self.ids.get(path) else { return Vec::new() };
        let mut visited: FxHashSet<u32> = FxHashSet::default();
        let mut stack: Vec<u32> = adjacency[start as usize].clone();
        while let Some(node) = stack.pop() {
            if visited.insert(node) {
                stack.extend(adjacency[node as usize].iter().copied());
            }
        }
        // The start node is excluded unless a cycle loops back through it.
        if !visited.contains(&start) || !self.on_cycle_through(start, adjacency) {
            visited.remove(&start);
        }
        let mut out: Vec<String> = visited.iter().map(|&n| self.paths[n as usize].clone()).collect();
        out.sort();
        out
    }

    fn on_cycle_through(&self, node: u32, adjacency: &[Vec<u32>]) -> bool {
        adjacency[node as usize].contains(&node) || {
            let mut visited: FxHashSet<u32> = FxHashSet::default();
            let mut stack: Vec<u32> = adjacency[node as usize].clone();
            let mut found = false;
            while let Some(n) = stack.pop() {
                if n == node {
                    found = true;
                    break;
                }
                if visited.insert(n) {
                    stack.extend(adjacency[n as usize].iter().copied());
                }
            }
            found
        }
    }

    /// Whether a path from `from` to `to` exists (including `from == to`
    /// when either lies on a cycle reaching the other).
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        let (Some(&from), Some(&to)) = (self.ids.get(from), self.ids.get(to)) else {
            return false;
        };
        if from == to {
            return true;
        }
        let mut visited: FxHashSet<u32> = FxHashSet::default();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if visited.insert(node) {
                stack.extend(self.forward[node as usize].iter().copied());
            }
        }
        false
    }

    /// Whether adding an edge `from → to` would close a cycle, i.e. a path
    /// from `to` back to `from` already exists.
    pub fn would_create_cycle(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        self.has_path(to, from)
    }

    /// Enumerates distinct simple cycles.
    ///
    /// Depth-first search with an explicit recursion stack; when a node
    /// already on the stack is revisited, the stack slice from its first
    /// appearance is emitted. Cycles differing only by rotation or
    /// direction are deduplicated by canonicalising to the rotation
    /// starting at the lexicographically smallest node.
    pub fn find_cycles(&self) -> Vec<Cycle> {
        let node_count = self.paths.len();
        let mut cycles = Vec::new();
        let mut seen_keys: FxHashSet<String> = FxHashSet::default();
        let mut done: Vec<bool> = vec![false; node_count];

        for root in 0..node_count as u32 {
            if done[root as usize] {
                continue;
            }
            self.dfs_cycles(root, &mut Vec::new(), &mut vec![false; node_count], &mut done, &mut seen_keys, &mut cycles);
        }
        cycles
    }

    fn dfs_cycles(
        &self,
        node: u32,
        stack: &mut Vec<u32>,
        on_stack: &mut Vec<bool>,
        done: &mut Vec<bool>,
        seen_keys: &mut FxHashSet<String>,
        cycles: &mut Vec<Cycle>,
    ) {
        stack.push(node);
        on_stack[node as usize] = true;
        for &next in &self.forward[node as usize] {
            if on_stack[next as usize] {
                if let Some(first) = stack.iter().position(|&n| n == next) {
                    self.emit_cycle(&stack[first..], seen_keys, cycles);
                }
            } else if !done[next as usize] {
                self.dfs_cycles(next, stack, on_stack, done, seen_keys, cycles);
            }
        }
        on_stack[node as usize] = false;
        done[node as usize] = true;
        stack.pop();
    }

    fn emit_cycle(&self, ids: &[u32], seen_keys: &mut FxHashSet<String>, cycles: &mut Vec<Cycle>) {
        let names: Vec<&str> = ids.iter().map(|&id| self.paths[id as usize].as_str()).collect();

        // Canonical rotation: start at the smallest member.
        let mut smallest = 0;
        for i in 1..names.len() {
            if names[i] < names[smallest] {
                smallest = i;
            }
        }
        let rotated: Vec<&str> =
            names[smallest..].iter().chain(names[..smallest].iter()).copied().collect();

        let forward_key = rotated.join(" -> ");
        let mut reversed: Vec<&str> = rotated.clone();
        reversed[1..].reverse();
        let reverse_key = reversed.join(" -> ");
        if seen_keys.contains(&forward_key) || seen_keys.contains(&reverse_key) {
            return;
        }
        seen_keys.insert(forward_key);

        let mut nodes: Vec<String> = rotated.iter().map(|s| s.to_string()).collect();
        nodes.push(nodes[0].clone());
        let mut edges = Vec::new();
        for pair in nodes.windows(2) {
            if let Some(edge) = self.find_edge(&pair[0], &pair[1]) {
                edges.push(edge);
            }
        }
        cycles.push(Cycle { nodes, edges });
    }

    fn find_edge(&self, from: &str, to: &str) -> Option<Edge> {
        let (&from, &to) = (self.ids.get(from)?, self.ids.get(to)?);
        self.edges.iter().find(|e| e.from == from && e.to == to).map(|e| self.materialize(e))
    }

    /// Cycles that `path` participates in.
    pub fn cycles_containing(&self, path: &str) -> Vec<Cycle> {
        self.find_cycles().into_iter().filter(|c| c.members().iter().any(|m| m == path)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_position_tracking::SourceLocation;
    use pretty_assertions::assert_eq;

    fn edge(from: &str, to: &str) -> Edge {
        Edge {
            from: from.to_string(),
            to: to.to_string(),
            file_uri: "file:///test.bp".to_string(),
            location: SourceLocation::default(),
        }
    }

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        DependencyGraph::build(edges.iter().map(|(f, t)| edge(f, t)))
    }

    #[test]
    fn test_direct_neighbors() {
        let g = graph(&[("a", "b"), ("a", "c"), ("d", "a")]);
        assert_eq!(g.dependencies("a"), vec!["b".to_string(), "c".to_string()]);
        assert_eq!(g.dependents("a"), vec!["d".to_string()]);
        assert!(g.dependencies("missing").is_empty());
    }

    #[test]
    fn test_transitive_closure() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "d")]);
        assert_eq!(
            g.transitive_dependencies("a"),
            vec!["b".to_string(), "c".to_string(), "d".to_string()]
        );
        assert_eq!(
            g.transitive_dependents("d"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        // Superset of direct dependencies; self excluded.
        assert!(!g.transitive_dependencies("a").contains(&"a".to_string()));
    }

    #[test]
    fn test_self_included_only_on_cycle() {
        let g = graph(&[("a", "b"), ("b", "a"), ("c", "a")]);
        assert!(g.transitive_dependencies("a").contains(&"a".to_string()));
        assert!(!g.transitive_dependencies("c").contains(&"c".to_string()));
    }

    #[test]
    fn test_two_node_cycle_enumerated_once() {
        let g = graph(&[("a", "b"), ("b", "a")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].nodes, vec!["a".to_string(), "b".to_string(), "a".to_string()]);
        assert_eq!(cycles[0].edges.len(), 2);
        assert_eq!(cycles[0].edges[0].from, "a");
        assert_eq!(cycles[0].edges[1].to, "a");
    }

    #[test]
    fn test_cycle_canonical_rotation() {
        let g = graph(&[("z", "m"), ("m", "q"), ("q", "z")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 1);
        // Rotation starts at the lexicographically smallest member.
        assert_eq!(cycles[0].nodes.first().map(String::as_str), Some("m"));
        assert_eq!(cycles[0].nodes.last().map(String::as_str), Some("m"));
    }

    #[test]
    fn test_self_loop() {
        let g = graph(&[("a", "a")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].nodes, vec!["a".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_cycles_containing() {
        let g = graph(&[("a", "b"), ("b", "a"), ("c", "d")]);
        assert_eq!(g.cycles_containing("a").len(), 1);
        assert!(g.cycles_containing("c").is_empty());
    }

    #[test]
    fn test_would_create_cycle() {
        let g = graph(&[("a", "b"), ("b", "c")]);
        assert!(g.would_create_cycle("a", "a"));
        assert!(g.would_create_cycle("c", "a"));
        assert!(!g.would_create_cycle("a", "c"));
    }

    #[test]
    fn test_edges_to_path_or_children() {
        let g = graph(&[("x", "m.f.r"), ("y", "m.f"), ("z", "mx")]);
        let hits = g.edges_to_path_or_children("m.f");
        assert_eq!(hits.len(), 2);
        let hits = g.edges_to_path_or_children("m");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|e| e.to.starts_with("m.")));
    }

    #[test]
    fn test_parallel_edges_dedup_in_neighbors() {
        let g = graph(&[("a", "b"), ("a", "b")]);
        assert_eq!(g.dependencies("a"), vec!["b".to_string()]);
        assert_eq!(g.edge_count(), 2);
    }
}
