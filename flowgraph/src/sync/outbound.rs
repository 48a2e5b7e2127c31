use serde::Deserialize;

/// When local changes are reported to the host. `Debounced` coalesces rapid
/// bursts (a drag emits many position events) into one report carrying the
/// final state; the window resets on every new change.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPolicy {
    Immediate,
    Debounced { window_ms: f64 },
}

pub const DEFAULT_DEBOUNCE_MS: f64 = 300.0;

impl Default for ReportPolicy {
    fn default() -> Self {
        ReportPolicy::Debounced {
            window_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Outbound report scheduler. Time is an explicit millisecond clock supplied
/// by the caller (`performance.now()` at the wasm boundary, synthetic values
/// in tests); the debounce deadline is the only deferred unit of work and is
/// cancelled and rescheduled on every change.
#[derive(Debug, Default)]
pub struct OutboundChannel {
    policy: ReportPolicy,
    ready: bool,
    pending: bool,
    deadline: Option<f64>,
}

impl OutboundChannel {
    pub fn new(policy: ReportPolicy) -> OutboundChannel {
        OutboundChannel {
            policy,
            ready: false,
            pending: false,
            deadline: None,
        }
    }

    /// The component is mounted: schedule the one guaranteed initial report
    /// so the host has a baseline even before any user action.
    pub fn mark_ready(&mut self, now: f64) {
        if self.ready {
            return;
        }
        self.ready = true;
        self.pending = true;
        self.deadline = Some(now);
        log::debug!("outbound: initial report scheduled");
    }

    /// A user-originated mutation occurred. Reconciliation must never call
    /// this; an inbound push echoed back as if user-originated would loop.
    pub fn note_change(&mut self, now: f64) {
        self.pending = true;
        self.deadline = Some(match self.policy {
            ReportPolicy::Immediate => now,
            ReportPolicy::Debounced { window_ms } => now + window_ms,
        });
    }

    /// True when a report is due; clears the pending state.
    pub fn poll(&mut self, now: f64) -> bool {
        if !self.ready || !self.pending {
            return false;
        }
        match self.deadline {
            Some(t) if t <= now => {
                self.pending = false;
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Teardown path: a pending deadline fires immediately.
    pub fn flush(&mut self) -> bool {
        if self.ready && self.pending {
            self.pending = false;
            self.deadline = None;
            return true;
        }
        false
    }

    /// Discards any pending deadline without reporting.
    pub fn cancel(&mut self) {
        self.pending = false;
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
