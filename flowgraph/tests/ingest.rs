use flowgraph::model::{MarkerKind, NodeKind};
use flowgraph::{EditorSession, ReconcileOutcome};
use serde_json::json;

fn push(s: &mut EditorSession, v: &serde_json::Value) -> ReconcileOutcome {
    s.receive_value(Some(v), 800.0, 600.0)
}

#[test]
fn missing_nodes_and_edges_are_empty_sequences() {
    let mut s = EditorSession::new();
    assert_eq!(push(&mut s, &json!({})), ReconcileOutcome::Unchanged);
    assert!(s.graph().is_empty());

    let mut s = EditorSession::new();
    push(&mut s, &json!({"nodes": [{"id": "a", "label": "A"}]}));
    assert_eq!(s.graph().node_count(), 1);
    assert_eq!(s.graph().edge_count(), 0);
}

#[test]
fn non_object_payloads_degrade_to_empty() {
    let mut s = EditorSession::new();
    assert_eq!(push(&mut s, &json!([1, 2, 3])), ReconcileOutcome::Unchanged);
    assert_eq!(push(&mut s, &json!("nope")), ReconcileOutcome::Unchanged);
    assert!(s.graph().is_empty());
}

#[test]
fn malformed_entries_are_skipped_not_fatal() {
    let mut s = EditorSession::new();
    let payload = json!({
        "nodes": [
            {"label": "no id"},
            {"id": "", "label": "empty id"},
            42,
            {"id": "ok", "label": "fine"},
        ],
        "edges": [
            {"id": "e1", "source": "ok"},
            {"id": "e2", "source": "", "target": "ok"},
            {"id": "e3", "source": "ok", "target": "ok"},
        ],
    });
    push(&mut s, &payload);
    assert_eq!(s.graph().node_count(), 1);
    assert_eq!(s.graph().edge_count(), 1);
    assert_eq!(s.graph().edges()[0].id, "e3");
}

#[test]
fn original_host_dialect_is_accepted() {
    let mut s = EditorSession::new();
    let payload = json!({
        "nodes": [
            {
                "id": "n1",
                "type": "decision",
                "position": {"x": 12.5, "y": -3.0},
                "data": {"label": "Treat?", "cost": 100.0, "note": "hello"},
                "style": {"background": "#fff"},
            },
        ],
        "edges": [
            {
                "id": "e1",
                "source": "n1",
                "target": "n1",
                "data": {"prob": 0.25},
                "markerEnd": {"type": "arrowclosed"},
                "style": {"stroke": "#ff0000"},
            },
        ],
    });
    push(&mut s, &payload);
    let n = s.graph().node("n1").unwrap();
    assert_eq!(n.kind, NodeKind::Decision);
    assert_eq!(n.label, "Treat?");
    assert_eq!(n.position.x, 12.5);
    assert_eq!(n.attr("cost"), Some(100.0));
    assert!(n.hints.is_some());
    let e = s.graph().edge("e1").unwrap();
    assert_eq!(e.probability, Some(0.25));
    assert_eq!(e.marker, MarkerKind::ArrowClosed);
    assert_eq!(e.color.as_deref(), Some("#ff0000"));
}

#[test]
fn unknown_kind_folds_into_other() {
    let mut s = EditorSession::new();
    push(
        &mut s,
        &json!({"nodes": [{"id": "a", "kind": "response", "label": "R"}]}),
    );
    assert_eq!(
        s.graph().node("a").unwrap().kind,
        NodeKind::Other("response".into())
    );
}

#[test]
fn out_of_range_probability_is_dropped() {
    let mut s = EditorSession::new();
    let payload = json!({
        "nodes": [{"id": "a", "label": "A"}, {"id": "b", "label": "B"}],
        "edges": [
            {"id": "e1", "source": "a", "target": "b", "probability": 1.5},
            {"id": "e2", "source": "a", "target": "b", "probability": 0.5},
        ],
    });
    push(&mut s, &payload);
    assert_eq!(s.graph().edge("e1").unwrap().probability, None);
    assert_eq!(s.graph().edge("e2").unwrap().probability, Some(0.5));
}

#[test]
fn non_finite_positions_fall_back_to_origin() {
    let mut s = EditorSession::new();
    let payload = json!({
        "nodes": [{"id": "a", "label": "A", "position": {"x": "NaNish", "y": 5.0}}],
        "edges": [],
    });
    push(&mut s, &payload);
    let p = s.graph().node("a").unwrap().position;
    assert_eq!(p.x, 0.0);
    assert_eq!(p.y, 5.0);
}

#[test]
fn strict_path_rejects_what_the_tolerant_path_degrades() {
    let mut s = EditorSession::new();
    let bad = json!("not an object");
    let err = s
        .receive_value_strict(Some(&bad), 800.0, 600.0)
        .unwrap_err();
    assert_eq!(err.0, "bad_payload");

    let oob = json!({
        "nodes": [{"id": "a", "label": "A", "position": {"x": 1.0e9, "y": 0.0}}],
        "edges": [],
    });
    let err = s
        .receive_value_strict(Some(&oob), 800.0, 600.0)
        .unwrap_err();
    assert_eq!(err.0, "coord_out_of_bounds");

    // The tolerant path accepts the same payload as-is.
    assert_eq!(push(&mut s, &oob), ReconcileOutcome::Seeded);
}

#[test]
fn export_document_is_a_pure_projection() {
    let mut s = EditorSession::new();
    let payload = json!({
        "nodes": [{"id": "a", "kind": "chance", "label": "A", "position": {"x": 1.0, "y": 2.0}}],
        "edges": [],
    });
    push(&mut s, &payload);
    let doc = s.export_document();
    let parsed: serde_json::Value = serde_json::from_str(&doc).unwrap();
    assert_eq!(parsed["nodes"][0]["id"], "a");
    assert_eq!(parsed["nodes"][0]["kind"], "chance");
    // Exporting does not schedule a report.
    s.mark_ready(0.0);
    let _ = s.poll_report(0.0);
    let _ = s.export_document();
    assert!(s.poll_report(10_000.0).is_none());
}
