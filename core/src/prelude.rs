use crate::timeseries::DatasetSelection;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_GEOCODER_URL: &str =
    "https://nominatim.openstreetmap.org/search?format=json&limit=1&q=";
pub const DEFAULT_PACING: Duration = Duration::from_secs(10);
pub const DEFAULT_OVERLAY_OPACITY: f32 = 0.8;

/// Shared configuration for the resolver, fetcher and projector.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub backend_url: String,
    pub geocoder_url: String,
    pub pacing: Duration,
    pub dataset: DatasetSelection,
    pub overlay_opacity: f32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            pacing: DEFAULT_PACING,
            dataset: DatasetSelection::default(),
            overlay_opacity: DEFAULT_OVERLAY_OPACITY,
        }
    }
}

/// Why a search produced no location.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("empty search")]
    Empty,
    #[error("coordinates out of range: {lat}, {lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },
    #[error("no match for '{0}'")]
    NoMatch(String),
    #[error("geocoding lookup failed: {0}")]
    Lookup(String),
}

/// Failures of the alert persistence port.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("alert store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("alert store encoding: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("alert store lock poisoned")]
    Poisoned,
}

/// Common error type for the monitoring pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    #[error("no location selected")]
    NoLocation,
    #[error("a time series run is already in progress")]
    AlreadyMonitoring,
    #[error("backend request for slot {slot} failed: {reason}")]
    Backend { slot: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
pub type ResolveResult<T> = Result<T, ResolveError>;
pub type StoreResult<T> = Result<T, StoreError>;
