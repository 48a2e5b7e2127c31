use flowgraph::{EditorSession, PositionDelta, ReportPolicy, SessionConfig, StructuralDelta};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;

#[derive(Clone, Debug)]
enum Op {
    Push { nodes: u8, edges: u8 },
    PushSame,
    PushNull,
    Drag { idx: u8, x: i16, y: i16 },
    Connect { a: u8, b: u8 },
    RemoveNode { idx: u8 },
    Poll { advance: u16 },
    Flush,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8, 0u8..12).prop_map(|(nodes, edges)| Op::Push { nodes, edges }),
        Just(Op::PushSame),
        Just(Op::PushNull),
        (any::<u8>(), any::<i16>(), any::<i16>()).prop_map(|(idx, x, y)| Op::Drag { idx, x, y }),
        (any::<u8>(), any::<u8>()).prop_map(|(a, b)| Op::Connect { a, b }),
        any::<u8>().prop_map(|idx| Op::RemoveNode { idx }),
        (0u16..1000).prop_map(|advance| Op::Poll { advance }),
        Just(Op::Flush),
    ]
}

fn host_payload(nodes: u8, edges: u8) -> serde_json::Value {
    let node_list: Vec<_> = (0..nodes)
        .map(|i| {
            json!({
                "id": format!("n{}", i),
                "label": format!("N{}", i),
                "position": {"x": (i as f32) * 40.0, "y": 0.0},
            })
        })
        .collect();
    // Includes deliberate duplicates and dangling endpoints.
    let edge_list: Vec<_> = (0..edges)
        .map(|i| {
            let src = format!("n{}", i % nodes.max(1));
            let tgt = format!("n{}", (i / 2) % nodes.max(1));
            json!({
                "id": format!("e{}", i % 6),
                "source": src,
                "target": tgt,
            })
        })
        .collect();
    json!({ "nodes": node_list, "edges": edge_list })
}

fn assert_report_invariants(session: &EditorSession) {
    let snap = session.snapshot();
    let mut node_ids = HashSet::new();
    for n in &snap.nodes {
        assert!(!n.id.is_empty());
        assert!(node_ids.insert(n.id.clone()), "duplicate node id {}", n.id);
    }
    let mut triples = HashSet::new();
    for e in &snap.edges {
        assert!(!e.id.is_empty());
        assert!(
            node_ids.contains(&e.source),
            "report contains dangling source {}",
            e.source
        );
        assert!(
            node_ids.contains(&e.target),
            "report contains dangling target {}",
            e.target
        );
        assert!(
            triples.insert((e.id.clone(), e.source.clone(), e.target.clone())),
            "duplicate triple for edge {}",
            e.id
        );
    }
}

fn run_sequence(seq: Vec<Op>) {
    let mut session = EditorSession::with_config(SessionConfig {
        report_policy: ReportPolicy::Debounced { window_ms: 300.0 },
        ..SessionConfig::default()
    });
    let mut now = 0.0f64;
    let mut last_payload: Option<serde_json::Value> = None;
    session.mark_ready(now);

    for op in seq {
        now += 1.0;
        match op {
            Op::Push { nodes, edges } => {
                let payload = host_payload(nodes, edges);
                session.receive_value(Some(&payload), 800.0, 600.0);
                last_payload = Some(payload);
            }
            Op::PushSame => {
                if let Some(p) = &last_payload {
                    let before = session.snapshot();
                    let vp = session.viewport();
                    session.receive_value(Some(p), 800.0, 600.0);
                    assert_eq!(session.snapshot(), before, "identical push perturbed state");
                    assert_eq!(session.viewport(), vp, "identical push moved the camera");
                }
            }
            Op::PushNull => {
                session.receive_value(None, 800.0, 600.0);
                assert!(session.graph().is_empty());
                last_payload = None;
            }
            Op::Drag { idx, x, y } => {
                let id = format!("n{}", idx % 8);
                session.apply_position_deltas(
                    &[PositionDelta {
                        id,
                        x: x as f32 * 0.5,
                        y: y as f32 * 0.5,
                    }],
                    now,
                );
            }
            Op::Connect { a, b } => {
                let src = format!("n{}", a % 8);
                let tgt = format!("n{}", b % 8);
                if let Some(id) = session.connect(&src, &tgt, now) {
                    let second = session.connect(&src, &tgt, now).expect("repeat connect");
                    assert_ne!(id, second, "connect reused an edge id");
                }
            }
            Op::RemoveNode { idx } => {
                // Default policy suppresses render-layer deletes.
                let id = format!("n{}", idx % 8);
                let existed = session.graph().contains_node(&id);
                session.apply_structural_deltas(vec![StructuralDelta::RemoveNode { id: id.clone() }], now);
                assert_eq!(session.graph().contains_node(&id), existed);
            }
            Op::Poll { advance } => {
                now += advance as f64;
                let _ = session.poll_report(now);
            }
            Op::Flush => {
                let _ = session.flush_report();
            }
        }
        assert_report_invariants(&session);
    }
}

proptest! {
    #[test]
    fn sync_invariants_hold_under_random_event_sequences(
        seq in prop::collection::vec(op_strategy(), 5..40)
    ) {
        run_sequence(seq);
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 2_000, .. ProptestConfig::default() })]
    // Soak run; enable with: cargo test --features long-sync
    #[cfg_attr(not(feature = "long-sync"), ignore)]
    #[test]
    fn sync_invariants_soak(
        seq in prop::collection::vec(op_strategy(), 10..120)
    ) {
        run_sequence(seq);
    }
}
