use crate::limits;
use crate::model::{AttrValue, Edge, MarkerKind, Node, NodeKind, Position, Snapshot};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Tolerant decode of a host payload. Absent `nodes`/`edges` become empty
/// sequences, malformed entries are skipped, non-finite coordinates fall back
/// to the origin. Never errors: inbound defects degrade to "treat as empty".
pub fn snapshot_from_value(v: &Value) -> Snapshot {
    let obj = match v.as_object() {
        Some(o) => o,
        None => return Snapshot::default(),
    };
    let nodes = obj
        .get("nodes")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(node_from_value).collect())
        .unwrap_or_default();
    let edges = obj
        .get("edges")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(edge_from_value).collect())
        .unwrap_or_default();
    Snapshot { nodes, edges }
}

/// Strict decode for the `_res` boundary path: enforces caps and coordinate
/// bounds instead of silently degrading.
pub fn snapshot_from_value_strict(v: &Value) -> Result<Snapshot, (&'static str, String)> {
    if !v.is_object() {
        return Err(("bad_payload", "value is not an object".to_string()));
    }
    let snap = snapshot_from_value(v);
    if snap.nodes.len() > limits::MAX_NODES {
        return Err(("too_many_nodes", format!("{} nodes", snap.nodes.len())));
    }
    if snap.edges.len() > limits::MAX_EDGES {
        return Err(("too_many_edges", format!("{} edges", snap.edges.len())));
    }
    for n in &snap.nodes {
        if n.id.len() > limits::MAX_ID_LEN {
            return Err(("id_too_long", format!("node id {} chars", n.id.len())));
        }
        if !limits::in_coord_bounds(n.position.x) || !limits::in_coord_bounds(n.position.y) {
            return Err((
                "coord_out_of_bounds",
                format!("node '{}' position out of bounds", n.id),
            ));
        }
    }
    for e in &snap.edges {
        if e.id.len() > limits::MAX_ID_LEN {
            return Err(("id_too_long", format!("edge id {} chars", e.id.len())));
        }
    }
    Ok(snap)
}

pub fn snapshot_to_value(s: &Snapshot) -> Value {
    serde_json::to_value(s).unwrap_or_else(|_| {
        let mut m = Map::new();
        m.insert("nodes".to_string(), Value::Array(Vec::new()));
        m.insert("edges".to_string(), Value::Array(Vec::new()));
        Value::Object(m)
    })
}

/// Read-only projection for the download/export collaborator.
pub fn export_document(s: &Snapshot) -> String {
    serde_json::to_string_pretty(&snapshot_to_value(s)).unwrap_or_else(|_| "{}".to_string())
}

fn nonempty_str(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn finite_f32(v: Option<&Value>) -> Option<f32> {
    v.and_then(Value::as_f64)
        .map(|f| f as f32)
        .filter(|f| f.is_finite())
}

// Accepts both canonical fields and the original host dialect ("type",
// "data.label", "data.prob", "markerEnd.type", "style").
fn node_from_value(v: &Value) -> Option<Node> {
    let obj = v.as_object()?;
    let id = nonempty_str(obj.get("id"))?.to_string();
    let data = obj.get("data").and_then(Value::as_object);

    let kind = nonempty_str(obj.get("kind"))
        .or_else(|| nonempty_str(obj.get("type")))
        .map(NodeKind::parse)
        .unwrap_or_default();
    let label = nonempty_str(obj.get("label"))
        .or_else(|| nonempty_str(data.and_then(|d| d.get("label"))))
        .unwrap_or("")
        .to_string();
    let position = obj
        .get("position")
        .and_then(Value::as_object)
        .map(|p| Position {
            x: finite_f32(p.get("x")).unwrap_or(0.0),
            y: finite_f32(p.get("y")).unwrap_or(0.0),
        })
        .unwrap_or_default();

    let mut attributes: BTreeMap<String, AttrValue> = BTreeMap::new();
    if let Some(attrs) = obj.get("attributes").and_then(Value::as_object) {
        for (k, av) in attrs {
            if let Some(a) = attr_from_value(av) {
                attributes.insert(k.clone(), a);
            }
        }
    }
    if let Some(d) = data {
        for (k, av) in d {
            if k == "label" || attributes.contains_key(k) {
                continue;
            }
            if let Some(a) = attr_from_value(av) {
                attributes.insert(k.clone(), a);
            }
        }
    }

    let hints = obj
        .get("hints")
        .or_else(|| obj.get("style"))
        .filter(|h| !h.is_null())
        .cloned();

    Some(Node {
        id,
        kind,
        label,
        position,
        attributes,
        hints,
    })
}

fn attr_from_value(v: &Value) -> Option<AttrValue> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(AttrValue::Number),
        Value::String(s) => Some(AttrValue::Text(s.clone())),
        _ => None,
    }
}

fn edge_from_value(v: &Value) -> Option<Edge> {
    let obj = v.as_object()?;
    let id = nonempty_str(obj.get("id"))?.to_string();
    let source = nonempty_str(obj.get("source"))?.to_string();
    let target = nonempty_str(obj.get("target"))?.to_string();
    let data = obj.get("data").and_then(Value::as_object);

    let label = nonempty_str(obj.get("label"))
        .or_else(|| nonempty_str(data.and_then(|d| d.get("label"))))
        .map(str::to_string);
    let probability = obj
        .get("probability")
        .or_else(|| data.and_then(|d| d.get("prob")))
        .and_then(Value::as_f64)
        .filter(|p| p.is_finite() && (0.0..=1.0).contains(p));
    let color = nonempty_str(obj.get("color"))
        .or_else(|| {
            nonempty_str(
                obj.get("style")
                    .and_then(Value::as_object)
                    .and_then(|s| s.get("stroke")),
            )
        })
        .map(str::to_string);
    let marker = nonempty_str(obj.get("marker"))
        .or_else(|| {
            nonempty_str(
                obj.get("markerEnd")
                    .and_then(Value::as_object)
                    .and_then(|m| m.get("type")),
            )
        })
        .map(MarkerKind::parse)
        .unwrap_or_default();

    Some(Edge {
        id,
        source,
        target,
        label,
        probability,
        color,
        marker,
    })
}
