use crate::model::{DetectionMode, TimeSeriesFrame};
use crate::projection::projector::tile_url;
use serde::{Deserialize, Serialize};

pub const TIMELINE_GRID_SIDE: usize = 4;

/// Thumbnail of one patch in the timeline panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineTile {
    pub patch_id: String,
    pub url: String,
    pub is_alert: bool,
}

/// Row-major 4x4 thumbnail grid for a frame. Cells past the last patch are
/// `None`. `none` mode shows the combined distance view.
pub fn timeline_grid(
    frame: &TimeSeriesFrame,
    mode: DetectionMode,
    backend_url: &str,
) -> Vec<Option<TimelineTile>> {
    let view = mode.view_segment().unwrap_or("distance");
    (0..TIMELINE_GRID_SIDE * TIMELINE_GRID_SIDE)
        .map(|index| {
            frame.patches.get(index).map(|patch| TimelineTile {
                patch_id: patch.patch_id.clone(),
                url: tile_url(backend_url, &frame.timestamp, view, patch),
                is_alert: patch.is_alert(),
            })
        })
        .collect()
}
