use crate::error;
use crate::Editor;
use flowgraph::model::{Position, Viewport};
use flowgraph::{PositionDelta, ReconcileOutcome, SessionConfig, StructuralDelta};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub fn init_logging() {
    let _ = console_log::init_with_level(log::Level::Debug);
}

// Render-layer change entries, decoded from the JS side.
#[derive(Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum ChangeDe {
    UpsertNode { node: flowgraph::model::Node },
    UpsertEdge { edge: flowgraph::model::Edge },
    RemoveNode { id: String },
    RemoveEdge { id: String },
}

impl From<ChangeDe> for StructuralDelta {
    fn from(c: ChangeDe) -> StructuralDelta {
        match c {
            ChangeDe::UpsertNode { node } => StructuralDelta::UpsertNode(node),
            ChangeDe::UpsertEdge { edge } => StructuralDelta::UpsertEdge(edge),
            ChangeDe::RemoveNode { id } => StructuralDelta::RemoveNode { id },
            ChangeDe::RemoveEdge { id } => StructuralDelta::RemoveEdge { id },
        }
    }
}

fn outcome_str(o: ReconcileOutcome) -> &'static str {
    match o {
        ReconcileOutcome::Unchanged => "unchanged",
        ReconcileOutcome::Cleared => "cleared",
        ReconcileOutcome::Seeded => "seeded",
        ReconcileOutcome::Merged => "merged",
    }
}

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Editor {
        crate::Editor::rs_new()
    }

    /// Builds an editor from a JS config object; unknown fields are ignored
    /// and a missing/invalid config falls back to the defaults.
    pub fn with_config(config: JsValue) -> Editor {
        let cfg: SessionConfig = serde_wasm_bindgen::from_value(config).unwrap_or_default();
        Editor {
            inner: flowgraph::EditorSession::with_config(cfg),
        }
    }

    // Inbound: the host "render with arguments" event.
    pub fn receive_value(&mut self, v: JsValue, view_w: f32, view_h: f32) -> JsValue {
        let value: serde_json::Value = match serde_wasm_bindgen::from_value(v) {
            Ok(val) => val,
            Err(_) => serde_json::Value::Null,
        };
        let opt = if value.is_null() { None } else { Some(&value) };
        let outcome = self.inner.receive_value(opt, view_w, view_h);
        JsValue::from_str(outcome_str(outcome))
    }

    pub fn receive_value_res(&mut self, v: JsValue, view_w: f32, view_h: f32) -> JsValue {
        let value: serde_json::Value = match serde_wasm_bindgen::from_value(v) {
            Ok(val) => val,
            Err(e) => return error::bad_payload(format!("{}", e)),
        };
        let opt = if value.is_null() { None } else { Some(&value) };
        match self.inner.receive_value_strict(opt, view_w, view_h) {
            Ok(outcome) => error::ok(JsValue::from_str(outcome_str(outcome))),
            Err((code, msg)) => error::err(code, msg, None),
        }
    }

    pub fn mark_ready(&mut self, now: f64) {
        self.inner.mark_ready(now);
    }

    // Reducer operations

    pub fn apply_position_deltas(&mut self, deltas: JsValue, now: f64) -> bool {
        let deltas: Vec<PositionDelta> = match serde_wasm_bindgen::from_value(deltas) {
            Ok(d) => d,
            Err(_) => return false,
        };
        self.inner.apply_position_deltas(&deltas, now)
    }

    pub fn apply_position_deltas_res(&mut self, deltas: JsValue, now: f64) -> JsValue {
        let deltas: Vec<PositionDelta> = match serde_wasm_bindgen::from_value(deltas) {
            Ok(d) => d,
            Err(e) => return error::bad_payload(format!("{}", e)),
        };
        for d in &deltas {
            if !d.x.is_finite() || !d.y.is_finite() {
                return error::non_finite("position");
            }
        }
        let changed = self.inner.apply_position_deltas(&deltas, now);
        error::ok(JsValue::from_bool(changed))
    }

    pub fn apply_changes(&mut self, changes: JsValue, now: f64) -> bool {
        let changes: Vec<ChangeDe> = match serde_wasm_bindgen::from_value(changes) {
            Ok(c) => c,
            Err(_) => return false,
        };
        let deltas = changes.into_iter().map(StructuralDelta::from).collect();
        self.inner.apply_structural_deltas(deltas, now).changed
    }

    pub fn apply_changes_res(&mut self, changes: JsValue, now: f64) -> JsValue {
        let changes: Vec<ChangeDe> = match serde_wasm_bindgen::from_value(changes) {
            Ok(c) => c,
            Err(e) => return error::bad_payload(format!("{}", e)),
        };
        let deltas = changes.into_iter().map(StructuralDelta::from).collect();
        let outcome = self.inner.apply_structural_deltas(deltas, now);
        let obj = crate::interop::new_obj();
        crate::interop::set_kv(&obj, "changed", &JsValue::from_bool(outcome.changed));
        crate::interop::set_kv(
            &obj,
            "suppressed_removes",
            &JsValue::from_f64(outcome.suppressed_removes as f64),
        );
        error::ok(obj.into())
    }

    pub fn connect(&mut self, source: &str, target: &str, now: f64) -> JsValue {
        match self.inner.connect(source, target, now) {
            Some(id) => JsValue::from_str(&id),
            None => JsValue::NULL,
        }
    }

    pub fn connect_res(&mut self, source: &str, target: &str, now: f64) -> JsValue {
        if !self.inner.graph().contains_node(source) {
            return error::invalid_id("node", source);
        }
        if !self.inner.graph().contains_node(target) {
            return error::invalid_id("node", target);
        }
        match self.inner.connect(source, target, now) {
            Some(id) => error::ok(JsValue::from_str(&id)),
            None => error::err("invalid_edge", "failed to connect", None),
        }
    }

    pub fn update_edge_endpoints(
        &mut self,
        edge_id: &str,
        source: &str,
        target: &str,
        now: f64,
    ) -> bool {
        self.inner.update_edge_endpoints(edge_id, source, target, now)
    }

    pub fn update_edge_endpoints_res(
        &mut self,
        edge_id: &str,
        source: &str,
        target: &str,
        now: f64,
    ) -> JsValue {
        if self.inner.graph().edge(edge_id).is_none() {
            return error::invalid_id("edge", edge_id);
        }
        if !self.inner.graph().contains_node(source) {
            return error::invalid_id("node", source);
        }
        if !self.inner.graph().contains_node(target) {
            return error::invalid_id("node", target);
        }
        let ok = self.inner.update_edge_endpoints(edge_id, source, target, now);
        error::ok(JsValue::from_bool(ok))
    }

    // Outbound: host "set value" payloads.

    pub fn poll_report(&mut self, now: f64) -> JsValue {
        match self.inner.poll_report(now) {
            Some(snap) => serde_wasm_bindgen::to_value(&snap).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    pub fn flush_report(&mut self) -> JsValue {
        match self.inner.flush_report() {
            Some(snap) => serde_wasm_bindgen::to_value(&snap).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    pub fn report_pending(&self) -> bool {
        self.inner.report_pending()
    }

    // Viewport

    pub fn set_viewport(&mut self, pan_x: f32, pan_y: f32, zoom: f32) -> bool {
        self.inner.set_viewport(Viewport {
            pan: Position { x: pan_x, y: pan_y },
            zoom,
        })
    }

    pub fn set_viewport_res(&mut self, pan_x: f32, pan_y: f32, zoom: f32) -> JsValue {
        if !pan_x.is_finite() {
            return error::non_finite("pan_x");
        }
        if !pan_y.is_finite() {
            return error::non_finite("pan_y");
        }
        if !zoom.is_finite() || zoom <= 0.0 {
            return error::non_finite("zoom");
        }
        let ok = self.set_viewport(pan_x, pan_y, zoom);
        error::ok(JsValue::from_bool(ok))
    }

    pub fn get_viewport(&self) -> JsValue {
        match self.inner.viewport() {
            Some(vp) => serde_wasm_bindgen::to_value(&vp).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    // Frame sizing signal for the host's layout.

    pub fn note_resize(&mut self, height: f32) {
        self.inner.note_resize(height);
    }

    pub fn take_frame_height(&mut self) -> JsValue {
        match self.inner.take_frame_height() {
            Some(h) => JsValue::from_f64(h as f64),
            None => JsValue::NULL,
        }
    }

    // Projections

    pub fn snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.snapshot()).unwrap_or(JsValue::NULL)
    }

    pub fn export_json(&self) -> String {
        self.inner.export_document()
    }

    pub fn pathways(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.pathways()).unwrap_or(JsValue::NULL)
    }

    pub fn node_count(&self) -> u32 {
        self.inner.graph().node_count() as u32
    }

    pub fn edge_count(&self) -> u32 {
        self.inner.graph().edge_count() as u32
    }
}
