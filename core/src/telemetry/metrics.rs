use serde::Serialize;
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

/// Point-in-time copy of the pipeline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: usize,
    pub frames: usize,
    pub slot_failures: usize,
    pub alerts: usize,
    pub persist_errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_request(&self) {
        self.update(|metrics| metrics.requests += 1);
    }

    pub fn record_frame(&self) {
        self.update(|metrics| metrics.frames += 1);
    }

    pub fn record_slot_failure(&self) {
        self.update(|metrics| metrics.slot_failures += 1);
    }

    pub fn record_alerts(&self, count: usize) {
        self.update(|metrics| metrics.alerts += count);
    }

    pub fn record_persist_error(&self) {
        self.update(|metrics| metrics.persist_errors += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
