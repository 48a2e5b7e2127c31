use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Decision,
    Chance,
    Outcome,
    Utility,
    Event,
    Result,
    #[serde(untagged)]
    Other(String),
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Chance
    }
}

impl NodeKind {
    pub fn parse(s: &str) -> NodeKind {
        match s {
            "decision" => NodeKind::Decision,
            "chance" => NodeKind::Chance,
            "outcome" => NodeKind::Outcome,
            "utility" => NodeKind::Utility,
            "event" => NodeKind::Event,
            "result" => NodeKind::Result,
            other => NodeKind::Other(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Text(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttrValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<serde_json::Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Node {
        Node {
            id: id.into(),
            kind,
            label: label.into(),
            position: Position::default(),
            attributes: BTreeMap::new(),
            hints: None,
        }
    }

    pub fn attr(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(|a| a.as_number())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Arrow,
    ArrowClosed,
    None,
}

impl Default for MarkerKind {
    fn default() -> Self {
        MarkerKind::Arrow
    }
}

impl MarkerKind {
    pub fn parse(s: &str) -> MarkerKind {
        match s {
            "arrowclosed" => MarkerKind::ArrowClosed,
            "none" => MarkerKind::None,
            _ => MarkerKind::Arrow,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub marker: MarkerKind,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Edge {
        Edge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
            probability: None,
            color: None,
            marker: MarkerKind::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pan: Position,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            pan: Position::default(),
            zoom: 1.0,
        }
    }
}
