//! End-to-end blocking analysis scenarios.

use blueprint_analysis::{AnalysisCache, BlockingStatus, DerivedStatus, StatusAnalysis};
use blueprint_ast::build_document;
use blueprint_parser::parse;
use blueprint_position_tracking::LineIndex;
use blueprint_tickets::TicketStore;
use blueprint_workspace_index::WorkspaceIndex;

fn add_bp(index: &mut WorkspaceIndex, uri: &str, text: &str) {
    let tree = parse(text);
    let line_index = LineIndex::new(text);
    let doc = build_document(&tree, text, &line_index);
    index.add_file(uri, &doc);
}

fn ticket_json(id: &str, reference: &str, status: &str) -> String {
    format!(
        r#"{{ "id": "{id}", "ref": "{reference}", "description": "", "status": "{status}", "constraints_satisfied": [] }}"#
    )
}

fn tickets_file(tickets: &[String]) -> String {
    format!(r#"{{ "version": "1.0", "source": "a.bp", "tickets": [{}] }}"#, tickets.join(", "))
}

#[test]
fn test_module_cycle_detected() {
    // Two modules depending on each other: exactly one cycle, both sides
    // report in-cycle with the other as peer.
    let mut index = WorkspaceIndex::new();
    add_bp(&mut index, "file:///a.bp", "@module a\n  @depends-on b\n");
    add_bp(&mut index, "file:///b.bp", "@module b\n  @depends-on a\n");
    let tickets = TicketStore::new();
    let analysis = StatusAnalysis::compute(&index, &tickets);

    let cycles = analysis.cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(
        cycles[0].nodes,
        vec!["a".to_string(), "b".to_string(), "a".to_string()]
    );

    let info = analysis.blocking("a").unwrap();
    assert_eq!(info.status, BlockingStatus::InCycle);
    assert_eq!(info.cycle_peers, vec!["b".to_string()]);
}

#[test]
fn test_transitive_blocker_reported_with_status() {
    // x <- y <- z; y is complete, x pending. z's direct blockers are empty
    // and x shows up transitively.
    let mut index = WorkspaceIndex::new();
    add_bp(
        &mut index,
        "file:///m.bp",
        "@module m\n@feature f\n@requirement x\n@requirement y\n@depends-on m.f.x\n@requirement z\n@depends-on m.f.y\n",
    );
    let mut tickets = TicketStore::new();
    tickets.upsert_file(
        "/ws/.blueprint/tickets/m.tickets.json",
        &tickets_file(&[
            ticket_json("T1", "m.f.x", "pending"),
            ticket_json("T2", "m.f.y", "complete"),
            ticket_json("T3", "m.f.z", "pending"),
        ]),
    );
    let analysis = StatusAnalysis::compute(&index, &tickets);

    assert_eq!(analysis.derived_status("m.f.y"), DerivedStatus::Complete);
    let info = analysis.blocking("m.f.z").unwrap();
    assert_eq!(info.status, BlockingStatus::Blocked);
    assert!(info.direct_blockers.is_empty());
    assert_eq!(info.transitive_blockers.len(), 1);
    assert_eq!(info.transitive_blockers[0].path, "m.f.x");
    assert_eq!(info.transitive_blockers[0].status, DerivedStatus::Pending);
}

#[test]
fn test_missing_ticket_counts_as_blocking() {
    let mut index = WorkspaceIndex::new();
    add_bp(
        &mut index,
        "file:///m.bp",
        "@module m\n@feature f\n@requirement dep\n@requirement top\n@depends-on m.f.dep\n",
    );
    let tickets = TicketStore::new();
    let analysis = StatusAnalysis::compute(&index, &tickets);

    let info = analysis.blocking("m.f.top").unwrap();
    assert_eq!(info.status, BlockingStatus::Blocked);
    assert_eq!(info.direct_blockers.len(), 1);
    assert_eq!(info.direct_blockers[0].status, DerivedStatus::NoTicket);
}

#[test]
fn test_container_propagation() {
    let mut index = WorkspaceIndex::new();
    add_bp(
        &mut index,
        "file:///m.bp",
        "@module m\n@feature f\n@requirement blocked-one\n@depends-on m.g.dep\n@feature g\n@requirement dep\n",
    );
    let tickets = TicketStore::new();
    let analysis = StatusAnalysis::compute(&index, &tickets);

    // f contains a blocked requirement, so f and m are blocked.
    assert_eq!(analysis.blocking("m.f").map(|i| i.status), Some(BlockingStatus::Blocked));
    assert_eq!(analysis.blocking("m").map(|i| i.status), Some(BlockingStatus::Blocked));
    // g's requirement has no dependencies at all.
    assert_eq!(analysis.blocking("m.g").map(|i| i.status), Some(BlockingStatus::NotBlocked));
}

#[test]
fn test_unblocked_if_completed_chain() {
    // z -> y -> x, nothing ticketed: completing x unblocks y, and z's last
    // missing ancestor is x, so z is included too.
    let mut index = WorkspaceIndex::new();
    add_bp(
        &mut index,
        "file:///m.bp",
        "@module m\n@feature f\n@requirement x\n@requirement y\n@depends-on m.f.x\n@requirement z\n@depends-on m.f.y\n",
    );
    let mut tickets = TicketStore::new();
    tickets.upsert_file(
        "/ws/.blueprint/tickets/m.tickets.json",
        &tickets_file(&[ticket_json("T2", "m.f.y", "complete")]),
    );
    let analysis = StatusAnalysis::compute(&index, &tickets);

    // Both dependents are blocked solely through x: completing it releases
    // the whole chain.
    let unblocked = analysis.unblocked_if_completed("m.f.x");
    assert_eq!(unblocked, vec!["m.f.y".to_string(), "m.f.z".to_string()]);
}

#[test]
fn test_unblocked_if_completed_excludes_multi_blocked() {
    // w depends on both x and v; completing x alone leaves w blocked by v.
    let mut index = WorkspaceIndex::new();
    add_bp(
        &mut index,
        "file:///m.bp",
        "@module m\n@feature f\n@requirement x\n@requirement v\n@requirement w\n@depends-on m.f.x, m.f.v\n",
    );
    let tickets = TicketStore::new();
    let analysis = StatusAnalysis::compute(&index, &tickets);

    assert!(analysis.unblocked_if_completed("m.f.x").is_empty());
    // Members are always transitive dependents of the completed path.
    for member in analysis.unblocked_if_completed("m.f.v") {
        assert!(analysis.graph().transitive_dependents("m.f.v").contains(&member));
    }
}

#[test]
fn test_cache_recomputes_on_version_change() {
    let mut index = WorkspaceIndex::new();
    add_bp(&mut index, "file:///m.bp", "@module m\n@feature f\n@requirement r\n");
    let mut tickets = TicketStore::new();
    let mut cache = AnalysisCache::new();

    assert_eq!(cache.get(&index, &tickets).derived_status("m.f.r"), DerivedStatus::NoTicket);

    tickets.upsert_file(
        "/ws/.blueprint/tickets/m.tickets.json",
        &tickets_file(&[ticket_json("T1", "m.f.r", "complete")]),
    );
    assert_eq!(cache.get(&index, &tickets).derived_status("m.f.r"), DerivedStatus::Complete);

    // Document change also invalidates.
    add_bp(&mut index, "file:///m.bp", "@module m\n@feature f\n@requirement other\n");
    assert_eq!(cache.get(&index, &tickets).derived_status("m.f.other"), DerivedStatus::NoTicket);
}

#[test]
fn test_constraint_coverage_through_analysis() {
    let mut index = WorkspaceIndex::new();
    add_bp(
        &mut index,
        "file:///m.bp",
        "@module m\n@feature f\n@requirement r\n@constraint hashed\n@constraint salted\n",
    );
    let mut tickets = TicketStore::new();
    tickets.upsert_file(
        "/ws/.blueprint/tickets/m.tickets.json",
        r#"{ "version": "1.0", "source": "m.bp", "tickets": [
            { "id": "T1", "ref": "m.f.r", "description": "", "status": "complete", "constraints_satisfied": ["hashed"] }
        ] }"#,
    );
    let analysis = StatusAnalysis::compute(&index, &tickets);
    // Declared constraint "salted" is not covered: in progress.
    assert_eq!(analysis.derived_status("m.f.r"), DerivedStatus::InProgress);
}
