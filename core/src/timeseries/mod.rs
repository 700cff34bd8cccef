pub mod backend;
pub mod cursor;
pub mod dataset;
pub mod fetcher;
pub mod monitoring;

pub use backend::{DetectionBackend, HttpDetectionBackend};
pub use cursor::TimeSeries;
pub use dataset::{DatasetSelection, DATASETS, SLOTS_PER_DATASET};
pub use fetcher::{FetchRun, TimeSeriesFetcher};
pub use monitoring::{MonitoringFlag, MonitoringGuard};
