use crate::model::Edge;
use crate::GraphModel;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A fully qualified path from a root node to a leaf, with cumulative
/// probability and accumulated cost/benefit/value attributes. Edge labels
/// appear bracketed between the node labels they connect.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Pathway {
    pub steps: Vec<String>,
    pub probability: f64,
    pub cost: f64,
    pub benefit: f64,
    pub value: f64,
}

/// Enumerates every root-to-leaf pathway. Roots are nodes with no incoming
/// edge; an edge without a probability counts as certain (1.0). Edges that
/// reference unknown nodes are skipped, and a node already on the current
/// path is not revisited, so a cycle terminates the pathway at its back-edge.
pub fn enumerate_pathways(graph: &GraphModel) -> Vec<Pathway> {
    let edges = graph.render_edges();
    let mut outgoing: HashMap<&str, Vec<&Edge>> = HashMap::new();
    let mut has_incoming: HashSet<&str> = HashSet::new();
    for e in &edges {
        if graph.contains_node(&e.source) && graph.contains_node(&e.target) {
            outgoing.entry(e.source.as_str()).or_default().push(e);
            has_incoming.insert(e.target.as_str());
        }
    }

    let mut results = Vec::new();
    for root in graph
        .nodes()
        .iter()
        .filter(|n| !has_incoming.contains(n.id.as_str()))
    {
        let mut on_path = HashSet::new();
        walk(
            graph,
            &outgoing,
            &root.id,
            &mut Vec::new(),
            &mut on_path,
            Totals {
                probability: 1.0,
                ..Totals::default()
            },
            &mut results,
        );
    }
    results
}

#[derive(Clone, Copy, Default)]
struct Totals {
    probability: f64,
    cost: f64,
    benefit: f64,
    value: f64,
}

fn walk<'a>(
    graph: &'a GraphModel,
    outgoing: &HashMap<&'a str, Vec<&'a Edge>>,
    node_id: &'a str,
    steps: &mut Vec<String>,
    on_path: &mut HashSet<&'a str>,
    totals: Totals,
    results: &mut Vec<Pathway>,
) {
    let node = match graph.node(node_id) {
        Some(n) => n,
        None => return,
    };
    steps.push(node.label.clone());
    on_path.insert(node_id);
    let totals = Totals {
        probability: totals.probability,
        cost: totals.cost + node.attr("cost").unwrap_or(0.0),
        benefit: totals.benefit + node.attr("benefit").unwrap_or(0.0),
        value: totals.value + node.attr("value").unwrap_or(0.0),
    };

    let children: Vec<&Edge> = outgoing
        .get(node_id)
        .map(|v| {
            v.iter()
                .filter(|e| !on_path.contains(e.target.as_str()))
                .copied()
                .collect()
        })
        .unwrap_or_default();

    if children.is_empty() {
        results.push(Pathway {
            steps: steps.clone(),
            probability: totals.probability,
            cost: totals.cost,
            benefit: totals.benefit,
            value: totals.value,
        });
    } else {
        for edge in children {
            let pushed_label = match &edge.label {
                Some(l) if !l.is_empty() => {
                    steps.push(format!("[{}]", l));
                    true
                }
                _ => false,
            };
            let next = Totals {
                probability: totals.probability * edge.probability.unwrap_or(1.0),
                ..totals
            };
            walk(graph, outgoing, &edge.target, steps, on_path, next, results);
            if pushed_label {
                steps.pop();
            }
        }
    }
    steps.pop();
    on_path.remove(node_id);
}
