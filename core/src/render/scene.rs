use crate::model::{AlertRecord, DetectionMode, Location, Overlay};
use crate::projection::TimelineTile;
use serde::{Deserialize, Serialize};

/// World view shown before any search and after a view reset.
pub const HOME_VIEW: MapView = MapView {
    lat: 20.0,
    lon: 0.0,
    zoom: 2,
};
pub const COORDINATE_ZOOM: u8 = 8;
pub const PLACE_ZOOM: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        HOME_VIEW
    }
}

/// Pin dropped for a search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

/// Position of the displayed frame within the fetched sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub index: usize,
    pub count: usize,
    pub timestamp: String,
    pub patch_count: usize,
}

/// Everything a renderer needs to draw the map. Published whole on every
/// change; renderers reconcile it against what they last drew.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapScene {
    pub revision: u64,
    pub view: MapView,
    pub markers: Vec<MapMarker>,
    pub alerts: Vec<AlertRecord>,
    pub overlays: Vec<Overlay>,
    pub overlays_visible: bool,
    pub mode: DetectionMode,
    pub selected_location: Option<Location>,
    pub frame: Option<FrameInfo>,
    pub timeline: Vec<Option<TimelineTile>>,
    pub monitoring: bool,
}

impl MapScene {
    /// Whether the "fetch time series" action is currently allowed.
    pub fn can_monitor(&self) -> bool {
        !self.monitoring && self.selected_location.is_some()
    }
}
