//! Workspace status snapshot: derived statuses, blocking info, cycles.

use crate::{Blocker, BlockingInfo, BlockingStatus, DerivedStatus, derive_status};
use blueprint_graph::{Cycle, DependencyGraph};
use blueprint_symbol_table::SymbolKind;
use blueprint_tickets::TicketStore;
use blueprint_workspace_index::WorkspaceIndex;
use rustc_hash::{FxHashMap, FxHashSet};

/// A fully computed analysis snapshot for one (index, tickets) version
/// pair.
///
/// Everything here is a pure function of the index and ticket store at the
/// recorded versions; [`AnalysisCache`](crate::AnalysisCache) recomputes
/// lazily when either version moves.
#[derive(Debug)]
pub struct StatusAnalysis {
    index_version: u64,
    tickets_version: u64,
    graph: DependencyGraph,
    cycles: Vec<Cycle>,
    derived: FxHashMap<String, DerivedStatus>,
    blocking: FxHashMap<String, BlockingInfo>,
}

impl StatusAnalysis {
    /// Computes the snapshot.
    pub fn compute(index: &WorkspaceIndex, tickets: &TicketStore) -> Self {
        let graph = index.build_graph();
        let cycles = graph.find_cycles();

        // Cycle membership: path -> sorted peers (all other members of any
        // cycle the path participates in).
        let mut cycle_peers: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
        for cycle in &cycles {
            for member in cycle.members() {
                let peers = cycle_peers.entry(member.clone()).or_default();
                for other in cycle.members() {
                    if other != member {
                        peers.insert(other.clone());
                    }
                }
            }
        }

        // Pass 1: ticket-derived status for every requirement.
        let mut derived: FxHashMap<String, DerivedStatus> = FxHashMap::default();
        for symbol in index.symbols_of_kind(SymbolKind::Requirement) {
            let matched = tickets.tickets_for(&symbol.path);
            let declared: Vec<String> =
                symbol.children.iter().map(|c| simple_name(c).to_string()).collect();
            derived.insert(symbol.path.clone(), derive_status(&matched, &declared));
        }

        // Pass 2: containers aggregate over their descendant requirements.
        for kind in [SymbolKind::Feature, SymbolKind::Module] {
            for symbol in index.symbols_of_kind(kind) {
                let status = aggregate_derived(&derived, &symbol.path);
                derived.insert(symbol.path.clone(), status);
            }
        }

        // Pass 3: blocking info for requirements.
        let mut blocking: FxHashMap<String, BlockingInfo> = FxHashMap::default();
        for symbol in index.symbols_of_kind(SymbolKind::Requirement) {
            let info = blocking_for(&symbol.path, &graph, &derived, &cycle_peers);
            blocking.insert(symbol.path.clone(), info);
        }

        // Pass 4: containers propagate from their requirements (and their
        // own cycle membership).
        for kind in [SymbolKind::Feature, SymbolKind::Module] {
            for symbol in index.symbols_of_kind(kind) {
                let info =
                    container_blocking(&symbol.path, &graph, &derived, &cycle_peers, &blocking);
                blocking.insert(symbol.path.clone(), info);
            }
        }

        Self {
            index_version: index.version(),
            tickets_version: tickets.version(),
            graph,
            cycles,
            derived,
            blocking,
        }
    }

    /// The versions this snapshot was computed against.
    pub fn versions(&self) -> (u64, u64) {
        (self.index_version, self.tickets_version)
    }

    /// The dependency graph underlying this snapshot.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// All dependency cycles, canonically rotated and deduplicated.
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Ticket-derived status of `path` (`no-ticket` when unknown).
    pub fn derived_status(&self, path: &str) -> DerivedStatus {
        self.derived.get(path).copied().unwrap_or(DerivedStatus::NoTicket)
    }

    /// Blocking info for `path`, if it names an analyzed symbol.
    pub fn blocking(&self, path: &str) -> Option<&BlockingInfo> {
        self.blocking.get(path)
    }

    /// Requirements that would flip from `blocked` to `not-blocked` if
    /// `path` became complete.
    ///
    /// Fixpoint over transitive dependents: a blocked dependent joins when
    /// every one of its blockers is `path` itself or a dependent that
    /// already joined (its last missing ancestor is `path`).
    pub fn unblocked_if_completed(&self, path: &str) -> Vec<String> {
        let dependents: FxHashSet<String> =
            self.graph.transitive_dependents(path).into_iter().collect();
        let mut unblocked: FxHashSet<String> = FxHashSet::default();
        loop {
            let mut changed = false;
            for candidate in &dependents {
                if unblocked.contains(candidate) {
                    continue;
                }
                let Some(info) = self.blocking.get(candidate) else { continue };
                if info.status != BlockingStatus::Blocked {
                    continue;
                }
                let released = info
                    .direct_blockers
                    .iter()
                    .chain(info.transitive_blockers.iter())
                    .all(|b| b.path == path || unblocked.contains(&b.path));
                if released {
                    unblocked.insert(candidate.clone());
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        let mut out: Vec<String> = unblocked.into_iter().collect();
        out.sort();
        out
    }
}

fn simple_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Aggregated ticket status for a container: the container counts as
/// complete only when every descendant requirement does.
fn aggregate_derived(derived: &FxHashMap<String, DerivedStatus>, container: &str) -> DerivedStatus {
    let prefix = format!("{container}.");
    let statuses: Vec<DerivedStatus> = derived
        .iter()
        .filter(|(path, _)| path.starts_with(&prefix))
        .map(|(_, status)| *status)
        .collect();
    if statuses.is_empty() {
        return DerivedStatus::NoTicket;
    }
    if statuses.iter().all(|s| *s == DerivedStatus::Obsolete) {
        return DerivedStatus::Obsolete;
    }
    if statuses.iter().all(|s| s.satisfies_dependency()) {
        return DerivedStatus::Complete;
    }
    if statuses.iter().any(|s| matches!(*s, DerivedStatus::InProgress | DerivedStatus::Complete)) {
        return DerivedStatus::InProgress;
    }
    if statuses.iter().all(|s| *s == DerivedStatus::NoTicket) {
        return DerivedStatus::NoTicket;
    }
    DerivedStatus::Pending
}

fn blocking_for(
    path: &str,
    graph: &DependencyGraph,
    derived: &FxHashMap<String, DerivedStatus>,
    cycle_peers: &FxHashMap<String, FxHashSet<String>>,
) -> BlockingInfo {
    if let Some(peers) = cycle_peers.get(path) {
        let mut cycle_peers: Vec<String> = peers.iter().cloned().collect();
        cycle_peers.sort();
        return BlockingInfo {
            path: path.to_string(),
            status: BlockingStatus::InCycle,
            cycle_peers,
            direct_blockers: Vec::new(),
            transitive_blockers: Vec::new(),
        };
    }

    let status_of = |dep: &str| -> DerivedStatus {
        derived.get(dep).copied().unwrap_or(DerivedStatus::NoTicket)
    };
    let direct: Vec<String> = graph.dependencies(path);
    let direct_set: FxHashSet<&str> = direct.iter().map(String::as_str).collect();

    let direct_blockers: Vec<Blocker> = direct
        .iter()
        .filter(|dep| !status_of(dep).satisfies_dependency())
        .map(|dep| Blocker { path: dep.clone(), status: status_of(dep) })
        .collect();
    let transitive_blockers: Vec<Blocker> = graph
        .transitive_dependencies(path)
        .into_iter()
        .filter(|dep| !direct_set.contains(dep.as_str()) && dep != path)
        .filter(|dep| !status_of(dep).satisfies_dependency())
        .map(|dep| {
            let status = status_of(&dep);
            Blocker { path: dep, status }
        })
        .collect();

    if direct_blockers.is_empty() && transitive_blockers.is_empty() {
        BlockingInfo::not_blocked(path)
    } else {
        BlockingInfo {
            path: path.to_string(),
            status: BlockingStatus::Blocked,
            cycle_peers: Vec::new(),
            direct_blockers,
            transitive_blockers,
        }
    }
}

/// Containers: in-cycle if any descendant requirement is (or the container
/// itself cycles), else blocked if any descendant requirement is, else
/// not-blocked.
fn container_blocking(
    path: &str,
    graph: &DependencyGraph,
    derived: &FxHashMap<String, DerivedStatus>,
    cycle_peers: &FxHashMap<String, FxHashSet<String>>,
    blocking: &FxHashMap<String, BlockingInfo>,
) -> BlockingInfo {
    let own = blocking_for(path, graph, derived, cycle_peers);
    if own.status == BlockingStatus::InCycle {
        return own;
    }

    let prefix = format!("{path}.");
    let mut any_blocked = false;
    let mut in_cycle_peers: FxHashSet<String> = FxHashSet::default();
    for (child, info) in blocking {
        if !child.starts_with(&prefix) {
            continue;
        }
        match info.status {
            BlockingStatus::InCycle => {
                in_cycle_peers.extend(info.cycle_peers.iter().cloned());
            }
            BlockingStatus::Blocked => any_blocked = true,
            BlockingStatus::NotBlocked => {}
        }
    }
    if !in_cycle_peers.is_empty() {
        let mut cycle_peers: Vec<String> = in_cycle_peers.into_iter().collect();
        cycle_peers.sort();
        return BlockingInfo {
            path: path.to_string(),
            status: BlockingStatus::InCycle,
            cycle_peers,
            direct_blockers: Vec::new(),
            transitive_blockers: Vec::new(),
        };
    }
    if any_blocked || own.status == BlockingStatus::Blocked {
        return BlockingInfo {
            path: path.to_string(),
            status: BlockingStatus::Blocked,
            cycle_peers: Vec::new(),
            direct_blockers: own.direct_blockers,
            transitive_blockers: own.transitive_blockers,
        };
    }
    own
}

/// Lazily recomputed [`StatusAnalysis`] keyed by source versions.
///
/// Mutations only bump version counters on the index and ticket store;
/// recomputation happens on the next query.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    snapshot: Option<StatusAnalysis>,
}

impl AnalysisCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot valid for the current versions, recomputing when
    /// stale.
    pub fn get(&mut self, index: &WorkspaceIndex, tickets: &TicketStore) -> &StatusAnalysis {
        let wanted = (index.version(), tickets.version());
        if self.snapshot.as_ref().is_none_or(|s| s.versions() != wanted) {
            self.snapshot = Some(StatusAnalysis::compute(index, tickets));
        }
        self.snapshot.get_or_insert_with(|| StatusAnalysis::compute(index, tickets))
    }

    /// Drops the cached snapshot.
    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }
}
