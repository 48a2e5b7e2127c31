use crate::model::Edge;
use std::collections::HashSet;

/// Drops edges with an empty id/source/target and collapses edges sharing an
/// identical (id, source, target) triple to the first occurrence, preserving
/// sequence order. Runs before every render projection and outbound report.
pub fn dedup_edges(edges: &[Edge]) -> Vec<Edge> {
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut out = Vec::with_capacity(edges.len());
    for e in edges {
        if e.id.is_empty() || e.source.is_empty() || e.target.is_empty() {
            continue;
        }
        let key = (e.id.clone(), e.source.clone(), e.target.clone());
        if seen.insert(key) {
            out.push(e.clone());
        }
    }
    out
}
