use crate::model::{Edge, Node};
use crate::GraphModel;
use serde::Deserialize;

/// How render-layer delete gestures are handled. `SuppressLocal` drops them:
/// removal only happens through host-authoritative reconciliation, so a stray
/// keystroke in the canvas can never destroy data. `ForwardToHost` applies
/// them locally and lets the next report carry them to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    SuppressLocal,
    ForwardToHost,
}

impl Default for DeletePolicy {
    fn default() -> Self {
        DeletePolicy::SuppressLocal
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PositionDelta {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug)]
pub enum StructuralDelta {
    UpsertNode(Node),
    UpsertEdge(Edge),
    RemoveNode { id: String },
    RemoveEdge { id: String },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ReduceOutcome {
    pub changed: bool,
    pub suppressed_removes: usize,
}

/// Updates positions of existing nodes by id. Unknown ids and non-finite
/// coordinates are ignored; host and UI may be transiently out of step.
pub fn apply_position_deltas(graph: &mut GraphModel, deltas: &[PositionDelta]) -> bool {
    let mut changed = false;
    for d in deltas {
        if !d.x.is_finite() || !d.y.is_finite() {
            continue;
        }
        if let Some(node) = graph.node_mut(&d.id) {
            if node.position.x != d.x || node.position.y != d.y {
                node.position.x = d.x;
                node.position.y = d.y;
                changed = true;
            }
        }
    }
    changed
}

pub fn apply_structural_deltas(
    graph: &mut GraphModel,
    deltas: Vec<StructuralDelta>,
    policy: DeletePolicy,
) -> ReduceOutcome {
    let mut outcome = ReduceOutcome::default();
    for delta in deltas {
        match delta {
            StructuralDelta::UpsertNode(node) => {
                if node.id.is_empty() {
                    continue;
                }
                match graph.node_mut(&node.id) {
                    Some(existing) => {
                        if *existing != node {
                            *existing = node;
                            outcome.changed = true;
                        }
                    }
                    None => {
                        graph.nodes.push(node);
                        outcome.changed = true;
                    }
                }
            }
            StructuralDelta::UpsertEdge(edge) => {
                if edge.id.is_empty() || edge.source.is_empty() || edge.target.is_empty() {
                    continue;
                }
                match graph.edge_mut(&edge.id) {
                    Some(existing) => {
                        if *existing != edge {
                            *existing = edge;
                            outcome.changed = true;
                        }
                    }
                    None => {
                        graph.edges.push(edge);
                        outcome.changed = true;
                    }
                }
            }
            StructuralDelta::RemoveNode { id } => match policy {
                DeletePolicy::SuppressLocal => {
                    outcome.suppressed_removes += 1;
                }
                DeletePolicy::ForwardToHost => {
                    let before = graph.nodes.len() + graph.edges.len();
                    graph.nodes.retain(|n| n.id != id);
                    // Incident edges go with the node.
                    graph.edges.retain(|e| e.source != id && e.target != id);
                    if graph.nodes.len() + graph.edges.len() != before {
                        outcome.changed = true;
                    }
                }
            },
            StructuralDelta::RemoveEdge { id } => match policy {
                DeletePolicy::SuppressLocal => {
                    outcome.suppressed_removes += 1;
                }
                DeletePolicy::ForwardToHost => {
                    let before = graph.edges.len();
                    graph.edges.retain(|e| e.id != id);
                    if graph.edges.len() != before {
                        outcome.changed = true;
                    }
                }
            },
        }
    }
    if outcome.suppressed_removes > 0 {
        log::debug!(
            "suppressed {} render-layer remove delta(s)",
            outcome.suppressed_removes
        );
    }
    outcome
}

/// Creates a new edge with a fresh unique id, default marker and no
/// probability. No-op when either endpoint is unknown.
pub fn connect(
    graph: &mut GraphModel,
    source: &str,
    target: &str,
    seq: &mut u64,
) -> Option<String> {
    if !graph.contains_node(source) || !graph.contains_node(target) {
        return None;
    }
    let id = fresh_edge_id(graph, seq);
    graph.edges.push(Edge::new(id.clone(), source, target));
    Some(id)
}

/// Rebinds an existing edge's endpoints in place, preserving id, label and
/// style. Fails when the edge or either new endpoint is unknown.
pub fn update_edge_endpoints(
    graph: &mut GraphModel,
    edge_id: &str,
    source: &str,
    target: &str,
) -> bool {
    if !graph.contains_node(source) || !graph.contains_node(target) {
        return false;
    }
    match graph.edge_mut(edge_id) {
        Some(edge) => {
            edge.source = source.to_string();
            edge.target = target.to_string();
            true
        }
        None => false,
    }
}

fn fresh_edge_id(graph: &GraphModel, seq: &mut u64) -> String {
    loop {
        *seq += 1;
        let candidate = format!("e{}", *seq);
        if graph.edge(&candidate).is_none() {
            return candidate;
        }
    }
}
