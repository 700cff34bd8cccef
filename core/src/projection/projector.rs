use crate::model::{DetectionMode, Overlay, OverlayBounds, Patch, TimeSeriesFrame};

/// Edge length, in degrees, of one satellite patch tile.
pub const TILE_STEP_DEG: f64 = 0.017297;
pub const TILE_HALF_STEP_DEG: f64 = TILE_STEP_DEG / 2.0;

/// `<backend>/api/view/<timestamp>/<view>/<lat>/<lon>`
pub fn tile_url(backend_url: &str, timestamp: &str, view: &str, patch: &Patch) -> String {
    format!(
        "{}/api/view/{}/{}/{}/{}",
        backend_url.trim_end_matches('/'),
        timestamp,
        view,
        patch.coordinates.latitude,
        patch.coordinates.longitude
    )
}

/// Turns the active frame into image overlays for `mode`.
#[derive(Debug, Clone)]
pub struct OverlayProjector {
    backend_url: String,
    opacity: f32,
}

impl OverlayProjector {
    pub fn new(backend_url: impl Into<String>, opacity: f32) -> Self {
        Self {
            backend_url: backend_url.into(),
            opacity,
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// One overlay per patch; empty when there is no frame or `mode` is `none`.
    pub fn project(&self, frame: Option<&TimeSeriesFrame>, mode: DetectionMode) -> Vec<Overlay> {
        let (Some(frame), Some(view)) = (frame, mode.view_segment()) else {
            return Vec::new();
        };

        frame
            .patches
            .iter()
            .map(|patch| Overlay {
                key: format!("{}-{}", frame.timestamp, patch.patch_id),
                url: tile_url(&self.backend_url, &frame.timestamp, view, patch),
                bounds: OverlayBounds::centered(
                    patch.coordinates.latitude,
                    patch.coordinates.longitude,
                    TILE_HALF_STEP_DEG,
                ),
                opacity: self.opacity,
            })
            .collect()
    }
}
