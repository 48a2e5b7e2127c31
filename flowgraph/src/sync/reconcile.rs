use crate::model::Snapshot;
use crate::GraphModel;
use serde::Deserialize;

/// Whether a host-pushed node position may override a local drag. The host
/// re-renders for reasons unrelated to the canvas; under `LocalWins` a stale
/// push never snaps dragged nodes back to old coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPolicy {
    LocalWins,
    HostWins,
}

impl Default for PositionPolicy {
    fn default() -> Self {
        PositionPolicy::LocalWins
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Incoming snapshot matched the last one seen (or there was nothing to
    /// clear); local state untouched.
    Unchanged,
    /// Host delivered an absent value after a previous snapshot: session reset.
    Cleared,
    /// First snapshot of the session populated an empty graph.
    Seeded,
    /// Incoming content merged over local state.
    Merged,
}

#[derive(Debug, Default)]
pub struct Reconciler {
    last_seen: Option<Snapshot>,
    policy: PositionPolicy,
}

impl Reconciler {
    pub fn new(policy: PositionPolicy) -> Reconciler {
        Reconciler {
            last_seen: None,
            policy,
        }
    }

    pub fn last_seen(&self) -> Option<&Snapshot> {
        self.last_seen.as_ref()
    }

    pub fn reconcile(
        &mut self,
        graph: &mut GraphModel,
        incoming: Option<Snapshot>,
    ) -> ReconcileOutcome {
        let incoming = match incoming {
            None => {
                if self.last_seen.is_none() && graph.is_empty() {
                    return ReconcileOutcome::Unchanged;
                }
                graph.clear();
                self.last_seen = None;
                log::debug!("reconcile: host value absent, session reset");
                return ReconcileOutcome::Cleared;
            }
            Some(s) => s,
        };

        // Deep structural equality against the last host push. Repeated
        // identical pushes must not perturb in-progress drags.
        if self.last_seen.as_ref() == Some(&incoming) {
            return ReconcileOutcome::Unchanged;
        }

        // An empty push onto an empty session carries no content.
        if incoming.is_empty() && graph.is_empty() {
            self.last_seen = Some(incoming);
            return ReconcileOutcome::Unchanged;
        }

        let seeded = graph.is_empty() && self.last_seen.is_none();

        let mut merged_nodes = Vec::with_capacity(incoming.nodes.len());
        for inc in &incoming.nodes {
            let mut node = inc.clone();
            if let Some(local) = graph.node(&inc.id) {
                if self.policy == PositionPolicy::LocalWins {
                    node.position = local.position;
                }
            }
            merged_nodes.push(node);
        }
        // Edges carry no ephemeral local state, so incoming content wins.
        graph.nodes = merged_nodes;
        graph.edges = incoming.edges.clone();
        self.last_seen = Some(incoming);

        if seeded {
            log::debug!("reconcile: seeded {} node(s)", graph.nodes.len());
            ReconcileOutcome::Seeded
        } else {
            log::debug!(
                "reconcile: merged {} node(s), {} edge(s)",
                graph.nodes.len(),
                graph.edges.len()
            );
            ReconcileOutcome::Merged
        }
    }
}
