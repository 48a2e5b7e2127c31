pub mod limits;
pub mod model;
pub mod pathways;
pub mod viewport;
pub mod sync {
    pub mod dedup;
    pub mod outbound;
    pub mod reconcile;
    pub mod reducer;
}
mod json;

use model::{Edge, Node, Snapshot, Viewport};
use serde::Deserialize;
use serde_json::Value;
use sync::dedup::dedup_edges;
use sync::outbound::OutboundChannel;
use sync::reconcile::Reconciler;
use sync::reducer;
use viewport::ViewportMemory;

pub use sync::outbound::ReportPolicy;
pub use sync::reconcile::{PositionPolicy, ReconcileOutcome};
pub use sync::reducer::{DeletePolicy, PositionDelta, ReduceOutcome, StructuralDelta};

/// In-memory nodes + edges. Pure container: all mutation goes through the
/// reducer (user-driven) or the reconciler (host-driven) so the invariants
/// stay centralized.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
}

impl GraphModel {
    pub fn new() -> GraphModel {
        GraphModel::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub(crate) fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Edges valid for rendering or reporting: deduplicated, and with edges
    /// whose endpoints do not (yet) exist filtered out. Dangling references
    /// are tolerated in storage during batched updates, never surfaced.
    pub fn render_edges(&self) -> Vec<Edge> {
        dedup_edges(&self.edges)
            .into_iter()
            .filter(|e| self.contains_node(&e.source) && self.contains_node(&e.target))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub delete_policy: DeletePolicy,
    pub position_policy: PositionPolicy,
    pub report_policy: ReportPolicy,
}

/// One embedding session: the graph model plus the sync machinery around it.
/// Created empty or seeded by the first inbound snapshot; discarded when the
/// session ends. Single-threaded by construction; every method runs an event
/// to completion.
pub struct EditorSession {
    graph: GraphModel,
    reconciler: Reconciler,
    channel: OutboundChannel,
    viewport: ViewportMemory,
    config: SessionConfig,
    edge_seq: u64,
    pending_height: Option<f32>,
}

impl Default for EditorSession {
    fn default() -> Self {
        EditorSession::new()
    }
}

impl EditorSession {
    pub fn new() -> EditorSession {
        EditorSession::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> EditorSession {
        EditorSession {
            graph: GraphModel::new(),
            reconciler: Reconciler::new(config.position_policy),
            channel: OutboundChannel::new(config.report_policy),
            viewport: ViewportMemory::new(),
            config,
            edge_seq: 0,
            pending_height: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    // Inbound boundary

    /// Handles a host "render with arguments" event. `value` is the pushed
    /// payload (`None` for absent/null). Reconciles into local state, then
    /// auto-fits the camera once or restores the remembered one. Never
    /// schedules an outbound report: an inbound push must not echo back.
    pub fn receive_value(
        &mut self,
        value: Option<&Value>,
        view_w: f32,
        view_h: f32,
    ) -> ReconcileOutcome {
        let snapshot = value.map(json::snapshot_from_value);
        self.apply_incoming(snapshot, view_w, view_h)
    }

    /// Strict variant for the `_res` boundary path: malformed payloads are
    /// reported instead of degraded.
    pub fn receive_value_strict(
        &mut self,
        value: Option<&Value>,
        view_w: f32,
        view_h: f32,
    ) -> Result<ReconcileOutcome, (&'static str, String)> {
        let snapshot = match value {
            Some(v) => Some(json::snapshot_from_value_strict(v)?),
            None => None,
        };
        Ok(self.apply_incoming(snapshot, view_w, view_h))
    }

    fn apply_incoming(
        &mut self,
        snapshot: Option<Snapshot>,
        view_w: f32,
        view_h: f32,
    ) -> ReconcileOutcome {
        let outcome = self.reconciler.reconcile(&mut self.graph, snapshot);
        if outcome != ReconcileOutcome::Unchanged {
            let _ = self.viewport.after_merge(&self.graph.nodes, view_w, view_h);
        }
        outcome
    }

    // Reducer operations. `now` is the caller's millisecond clock; each
    // marks the outbound channel dirty only when state actually changed.

    pub fn mark_ready(&mut self, now: f64) {
        self.channel.mark_ready(now);
    }

    pub fn apply_position_deltas(&mut self, deltas: &[PositionDelta], now: f64) -> bool {
        let changed = reducer::apply_position_deltas(&mut self.graph, deltas);
        if changed {
            self.channel.note_change(now);
        }
        changed
    }

    pub fn apply_structural_deltas(
        &mut self,
        deltas: Vec<StructuralDelta>,
        now: f64,
    ) -> ReduceOutcome {
        let outcome =
            reducer::apply_structural_deltas(&mut self.graph, deltas, self.config.delete_policy);
        if outcome.changed {
            self.channel.note_change(now);
        }
        outcome
    }

    pub fn connect(&mut self, source: &str, target: &str, now: f64) -> Option<String> {
        let id = reducer::connect(&mut self.graph, source, target, &mut self.edge_seq);
        if id.is_some() {
            self.channel.note_change(now);
        }
        id
    }

    pub fn update_edge_endpoints(
        &mut self,
        edge_id: &str,
        source: &str,
        target: &str,
        now: f64,
    ) -> bool {
        let ok = reducer::update_edge_endpoints(&mut self.graph, edge_id, source, target);
        if ok {
            self.channel.note_change(now);
        }
        ok
    }

    // Outbound boundary

    pub fn poll_report(&mut self, now: f64) -> Option<Snapshot> {
        if self.channel.poll(now) {
            Some(self.snapshot())
        } else {
            None
        }
    }

    pub fn flush_report(&mut self) -> Option<Snapshot> {
        if self.channel.flush() {
            Some(self.snapshot())
        } else {
            None
        }
    }

    pub fn report_pending(&self) -> bool {
        self.channel.is_pending()
    }

    /// The `{nodes, edges}` payload as the host should see it: nodes in
    /// sequence order, edges deduplicated and free of dangling references.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.graph.nodes.clone(),
            edges: self.graph.render_edges(),
        }
    }

    // Viewport

    pub fn set_viewport(&mut self, vp: Viewport) -> bool {
        self.viewport.capture(vp)
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport.restore()
    }

    // Frame sizing: presentation concern, carried but not part of the sync
    // correctness contract.

    pub fn note_resize(&mut self, height: f32) {
        if height.is_finite() && height > 0.0 {
            self.pending_height = Some(height);
        }
    }

    pub fn take_frame_height(&mut self) -> Option<f32> {
        self.pending_height.take()
    }

    // Projections

    pub fn export_document(&self) -> String {
        json::export_document(&self.snapshot())
    }

    pub fn pathways(&self) -> Vec<pathways::Pathway> {
        pathways::enumerate_pathways(&self.graph)
    }
}
