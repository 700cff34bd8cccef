use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Centre of a satellite patch as reported by the detection backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Per-patch detection results. Only `is_alert` is interpreted; everything
/// else the backend sends is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detections {
    #[serde(default)]
    pub is_alert: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One georeferenced detection tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub patch_id: String,
    pub coordinates: PatchCoordinates,
    #[serde(default)]
    pub detections: Detections,
}

impl Patch {
    pub fn new(patch_id: impl Into<String>, latitude: f64, longitude: f64, is_alert: bool) -> Self {
        Self {
            patch_id: patch_id.into(),
            coordinates: PatchCoordinates {
                latitude,
                longitude,
            },
            detections: Detections {
                is_alert,
                extra: Map::new(),
            },
        }
    }

    pub fn is_alert(&self) -> bool {
        self.detections.is_alert
    }
}

/// All patches returned for one timestamp slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesFrame {
    pub timestamp: String,
    #[serde(default)]
    pub patches: Vec<Patch>,
    #[serde(default)]
    pub alerts: Vec<Value>,
}

impl TimeSeriesFrame {
    pub fn new(timestamp: impl Into<String>, patches: Vec<Patch>) -> Self {
        Self {
            timestamp: timestamp.into(),
            patches,
            alerts: Vec::new(),
        }
    }

    /// Stand-in for a slot whose request failed.
    pub fn placeholder(slot: &str) -> Self {
        Self::new(slot, Vec::new())
    }

    pub fn alert_patches(&self) -> impl Iterator<Item = &Patch> {
        self.patches.iter().filter(|patch| patch.is_alert())
    }
}
