use crate::model::{Node, Position, Viewport};

pub const FIT_PADDING: f32 = 40.0;
pub const MIN_FIT_ZOOM: f32 = 0.2;
pub const MAX_FIT_ZOOM: f32 = 2.0;

/// Session-local camera memory. The viewport is never part of the host
/// payload: it is captured on every user pan/zoom and reapplied after each
/// reconciliation so a content push does not reset the camera. Fit-to-content
/// runs exactly once per session, on the first non-empty node set.
#[derive(Debug, Default)]
pub struct ViewportMemory {
    remembered: Option<Viewport>,
    auto_fit_done: bool,
}

impl ViewportMemory {
    pub fn new() -> ViewportMemory {
        ViewportMemory::default()
    }

    pub fn capture(&mut self, vp: Viewport) -> bool {
        if !vp.pan.x.is_finite() || !vp.pan.y.is_finite() || !vp.zoom.is_finite() || vp.zoom <= 0.0
        {
            return false;
        }
        self.remembered = Some(vp);
        true
    }

    pub fn restore(&self) -> Option<Viewport> {
        self.remembered
    }

    pub fn auto_fit_done(&self) -> bool {
        self.auto_fit_done
    }

    /// Called after every reconciliation merge. Returns the viewport the
    /// renderer should apply: the remembered camera when one exists,
    /// otherwise a one-time fit of the incoming content.
    pub fn after_merge(&mut self, nodes: &[Node], view_w: f32, view_h: f32) -> Option<Viewport> {
        if self.remembered.is_some() {
            return self.remembered;
        }
        self.fit_once(nodes, view_w, view_h)
    }

    pub fn fit_once(&mut self, nodes: &[Node], view_w: f32, view_h: f32) -> Option<Viewport> {
        if self.auto_fit_done || nodes.is_empty() {
            return None;
        }
        if !(view_w > 0.0) || !(view_h > 0.0) {
            return None;
        }
        let vp = fit_to_content(nodes, view_w, view_h)?;
        self.auto_fit_done = true;
        self.remembered = Some(vp);
        log::debug!(
            "viewport: auto-fit to {} node(s), zoom {:.3}",
            nodes.len(),
            vp.zoom
        );
        Some(vp)
    }
}

fn fit_to_content(nodes: &[Node], view_w: f32, view_h: f32) -> Option<Viewport> {
    let mut bbox: Option<(f32, f32, f32, f32)> = None;
    for n in nodes {
        let p = n.position;
        if !p.x.is_finite() || !p.y.is_finite() {
            continue;
        }
        bbox = Some(match bbox {
            None => (p.x, p.y, p.x, p.y),
            Some((x0, y0, x1, y1)) => (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        });
    }
    let (minx, miny, maxx, maxy) = bbox?;
    let content_w = (maxx - minx) + 2.0 * FIT_PADDING;
    let content_h = (maxy - miny) + 2.0 * FIT_PADDING;
    let zoom = (view_w / content_w)
        .min(view_h / content_h)
        .clamp(MIN_FIT_ZOOM, MAX_FIT_ZOOM);
    let cx = (minx + maxx) * 0.5;
    let cy = (miny + maxy) * 0.5;
    Some(Viewport {
        pan: Position {
            x: view_w * 0.5 - cx * zoom,
            y: view_h * 0.5 - cy * zoom,
        },
        zoom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    fn node_at(id: &str, x: f32, y: f32) -> Node {
        let mut n = Node::new(id, NodeKind::Chance, id);
        n.position = Position { x, y };
        n
    }

    #[test]
    fn fit_runs_once() {
        let mut mem = ViewportMemory::new();
        let nodes = vec![node_at("a", 0.0, 0.0), node_at("b", 100.0, 100.0)];
        let first = mem.fit_once(&nodes, 800.0, 600.0);
        assert!(first.is_some());
        assert!(mem.fit_once(&nodes, 800.0, 600.0).is_none());
        // The fitted camera is remembered.
        assert_eq!(mem.restore(), first);
    }

    #[test]
    fn empty_nodes_do_not_consume_the_fit() {
        let mut mem = ViewportMemory::new();
        assert!(mem.fit_once(&[], 800.0, 600.0).is_none());
        assert!(!mem.auto_fit_done());
        let nodes = vec![node_at("a", 10.0, 10.0)];
        assert!(mem.fit_once(&nodes, 800.0, 600.0).is_some());
    }

    #[test]
    fn remembered_camera_survives_merge() {
        let mut mem = ViewportMemory::new();
        let vp = Viewport {
            pan: Position { x: -20.0, y: 35.0 },
            zoom: 1.5,
        };
        assert!(mem.capture(vp));
        let nodes = vec![node_at("a", 0.0, 0.0)];
        assert_eq!(mem.after_merge(&nodes, 800.0, 600.0), Some(vp));
    }

    #[test]
    fn fit_centers_content() {
        let mut mem = ViewportMemory::new();
        let nodes = vec![node_at("a", 0.0, 0.0), node_at("b", 200.0, 0.0)];
        let vp = mem.fit_once(&nodes, 800.0, 600.0).unwrap();
        // Content centroid maps to the view center.
        let cx = 100.0 * vp.zoom + vp.pan.x;
        assert!((cx - 400.0).abs() < 1e-3);
    }

    #[test]
    fn rejects_degenerate_viewports() {
        let mut mem = ViewportMemory::new();
        assert!(!mem.capture(Viewport {
            pan: Position {
                x: f32::NAN,
                y: 0.0
            },
            zoom: 1.0,
        }));
        assert!(!mem.capture(Viewport {
            pan: Position { x: 0.0, y: 0.0 },
            zoom: 0.0,
        }));
        assert!(mem.restore().is_none());
    }
}
