use aquacore::model::{AlertRecord, Overlay};
use aquacore::render::{MapRenderer, MapScene, SceneReconciler};
use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Headless map widget that writes every command to the log.
#[derive(Debug, Default)]
pub struct LogRenderer {
    pub overlays_visible: bool,
    pub overlay_count: usize,
    pub alert_count: usize,
    pub marker_count: usize,
}

impl MapRenderer for LogRenderer {
    fn set_view(&mut self, lat: f64, lon: f64, zoom: u8) {
        info!("[map] view {:.4}, {:.4} zoom {}", lat, lon, zoom);
    }

    fn add_marker(&mut self, lat: f64, lon: f64, label: &str) {
        self.marker_count += 1;
        info!("[map] marker '{}' at {:.4}, {:.4}", label, lat, lon);
    }

    fn add_markers_to_alerts(&mut self, records: &[AlertRecord]) {
        self.alert_count = records.len();
        info!("[map] {} alert markers", records.len());
    }

    fn clear_alerts(&mut self) {
        self.alert_count = 0;
        info!("[map] alert markers cleared");
    }

    fn set_image_overlays(&mut self, overlays: &[Overlay]) {
        self.overlay_count = overlays.len();
        info!("[map] {} image overlays", overlays.len());
    }

    fn toggle_overlays(&mut self, visible: bool) {
        self.overlays_visible = visible;
        info!("[map] overlays {}", if visible { "shown" } else { "hidden" });
    }

    fn clear_overlays(&mut self) {
        self.overlay_count = 0;
        info!("[map] overlays cleared");
    }

    fn clear_vessels(&mut self) {
        info!("[map] vessel layer cleared");
    }

    fn clear_debris(&mut self) {
        info!("[map] debris layer cleared");
    }

    fn clear_markers(&mut self) {
        self.marker_count = 0;
        info!("[map] markers cleared");
    }
}

/// Follows published scenes until the session goes away.
pub fn spawn_log_renderer(mut scenes: watch::Receiver<MapScene>) -> JoinHandle<LogRenderer> {
    tokio::spawn(async move {
        let mut reconciler = SceneReconciler::new();
        let mut renderer = LogRenderer::default();
        loop {
            let scene = scenes.borrow_and_update().clone();
            reconciler.render(&scene, &mut renderer);
            if scenes.changed().await.is_err() {
                break;
            }
        }
        renderer
    })
}
