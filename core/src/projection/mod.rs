pub mod projector;
pub mod timeline;

pub use projector::{tile_url, OverlayProjector, TILE_HALF_STEP_DEG, TILE_STEP_DEG};
pub use timeline::{timeline_grid, TimelineTile, TIMELINE_GRID_SIDE};
