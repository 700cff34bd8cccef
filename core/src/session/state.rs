use crate::alerts::AlertAccumulator;
use crate::locate::ResolvedBy;
use crate::model::{AlertRecord, DetectionMode, Location, TimeSeriesFrame};
use crate::prelude::StoreResult;
use crate::projection::{timeline_grid, OverlayProjector};
use crate::render::{FrameInfo, MapMarker, MapScene, MapView, COORDINATE_ZOOM, HOME_VIEW, PLACE_ZOOM};
use crate::telemetry::LogManager;
use crate::timeseries::{MonitoringFlag, TimeSeries};
use tokio::sync::watch;

/// Map page state. Every mutation republishes the derived [`MapScene`].
pub struct MapSession {
    alerts: AlertAccumulator,
    projector: OverlayProjector,
    series: TimeSeries,
    selected: Option<Location>,
    mode: DetectionMode,
    view: MapView,
    markers: Vec<MapMarker>,
    monitoring: MonitoringFlag,
    scene: watch::Sender<MapScene>,
    revision: u64,
    logger: LogManager,
}

impl MapSession {
    pub fn new(alerts: AlertAccumulator, projector: OverlayProjector, monitoring: MonitoringFlag) -> Self {
        let (scene, _) = watch::channel(MapScene::default());
        let mut session = Self {
            alerts,
            projector,
            series: TimeSeries::new(),
            selected: None,
            mode: DetectionMode::None,
            view: HOME_VIEW,
            markers: Vec::new(),
            monitoring,
            scene,
            revision: 0,
            logger: LogManager::new("session"),
        };
        session.publish();
        session
    }

    pub fn subscribe(&self) -> watch::Receiver<MapScene> {
        self.scene.subscribe()
    }

    pub fn scene(&self) -> MapScene {
        self.scene.borrow().clone()
    }

    pub fn selected_location(&self) -> Option<&Location> {
        self.selected.as_ref()
    }

    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn alerts(&self) -> &[AlertRecord] {
        self.alerts.records()
    }

    /// Centres the map on a freshly resolved location and pins it.
    pub fn apply_location(&mut self, location: Location, source: ResolvedBy) {
        let zoom = match source {
            ResolvedBy::Coordinates => COORDINATE_ZOOM,
            ResolvedBy::Geocoder => PLACE_ZOOM,
        };
        self.view = MapView {
            lat: location.lat,
            lon: location.lon,
            zoom,
        };
        self.markers.push(MapMarker {
            lat: location.lat,
            lon: location.lon,
            label: location.name.clone(),
        });
        self.logger.record(&format!("selected {}", location.name));
        self.selected = Some(location);
        self.publish();
    }

    pub fn set_mode(&mut self, mode: DetectionMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.logger
            .record(&format!("detection mode {} -> {}", self.mode, mode));
        self.mode = mode;
        self.publish();
        true
    }

    /// Drops frames from a previous run.
    pub fn start_series(&mut self) {
        self.series.clear();
        self.publish();
    }

    /// Appends a fetched frame, shows it, and records its alerts against the
    /// location that started the run.
    pub fn apply_frame(&mut self, frame: &TimeSeriesFrame, origin: &Location) {
        self.series.push(frame.clone());
        self.alerts.accumulate(frame, origin);
        self.publish();
    }

    pub fn select_frame(&mut self, index: usize) -> bool {
        self.publish_if(|session| session.series.select(index))
    }

    pub fn next_frame(&mut self) -> bool {
        self.publish_if(|session| session.series.next())
    }

    pub fn previous_frame(&mut self) -> bool {
        self.publish_if(|session| session.series.previous())
    }

    pub fn reset_alerts(&mut self) -> StoreResult<()> {
        let result = self.alerts.reset();
        self.publish();
        result
    }

    /// Back to the world view with no search pins.
    pub fn reset_view(&mut self) {
        self.view = HOME_VIEW;
        self.markers.clear();
        self.publish();
    }

    /// Recomputes the scene and hands it to subscribers.
    pub fn publish(&mut self) {
        self.revision += 1;
        let scene = self.build_scene();
        self.scene.send_replace(scene);
    }

    fn publish_if(&mut self, change: impl FnOnce(&mut Self) -> bool) -> bool {
        let changed = change(self);
        if changed {
            self.publish();
        }
        changed
    }

    fn build_scene(&self) -> MapScene {
        let active = self.series.active();
        let frame = active.zip(self.series.active_index()).map(|(frame, index)| FrameInfo {
            index,
            count: self.series.len(),
            timestamp: frame.timestamp.clone(),
            patch_count: frame.patches.len(),
        });
        let timeline = active
            .map(|frame| timeline_grid(frame, self.mode, self.projector.backend_url()))
            .unwrap_or_default();

        MapScene {
            revision: self.revision,
            view: self.view,
            markers: self.markers.clone(),
            alerts: self.alerts.records().to_vec(),
            overlays: self.projector.project(active, self.mode),
            overlays_visible: self.mode.shows_overlays(),
            mode: self.mode,
            selected_location: self.selected.clone(),
            frame,
            timeline,
            monitoring: self.monitoring.is_active(),
        }
    }
}
