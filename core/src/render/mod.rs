pub mod reconcile;
pub mod scene;

pub use reconcile::{apply, reconcile, MapCommand, MapRenderer, SceneReconciler};
pub use scene::{FrameInfo, MapMarker, MapScene, MapView, COORDINATE_ZOOM, HOME_VIEW, PLACE_ZOOM};
