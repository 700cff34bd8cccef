//! Monitoring core for the AquaSentinel map.
//!
//! A search is resolved to a location, a fixed dataset of timestamp slots is
//! replayed against the detection backend one paced request at a time, alert
//! patches are accumulated into a persisted marker list, and the active frame
//! is projected into georeferenced image overlays. Renderers never get called
//! from here; they subscribe to a declarative [`render::MapScene`] and
//! reconcile it themselves.

pub mod alerts;
pub mod locate;
pub mod model;
pub mod prelude;
pub mod projection;
pub mod render;
pub mod session;
pub mod telemetry;
pub mod timeseries;

pub use model::{AlertRecord, DetectionMode, Location, Overlay, Patch, SearchInput, TimeSeriesFrame};
pub use prelude::{PipelineError, PipelineResult, PipelineSettings};
pub use session::MonitorService;
