pub mod alert;
pub mod location;
pub mod overlay;
pub mod patch;

pub use alert::AlertRecord;
pub use location::{Location, SearchInput};
pub use overlay::{DetectionMode, Overlay, OverlayBounds};
pub use patch::{Detections, Patch, PatchCoordinates, TimeSeriesFrame};
