use crate::model::{Location, TimeSeriesFrame};
use crate::prelude::{PipelineError, PipelineResult, PipelineSettings};
use crate::telemetry::{LogManager, MetricsRecorder};
use crate::timeseries::backend::DetectionBackend;
use crate::timeseries::dataset::{DatasetSelection, SLOTS_PER_DATASET};
use crate::timeseries::monitoring::{MonitoringFlag, MonitoringGuard};
use std::sync::Arc;
use std::time::Duration;

/// Replays one dataset's timestamp slots against the detection backend,
/// strictly one request at a time with a pacing delay in between.
pub struct TimeSeriesFetcher {
    backend: Arc<dyn DetectionBackend>,
    pacing: Duration,
    dataset: DatasetSelection,
    monitoring: MonitoringFlag,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl TimeSeriesFetcher {
    pub fn new(backend: Arc<dyn DetectionBackend>, settings: &PipelineSettings) -> Self {
        Self {
            backend,
            pacing: settings.pacing,
            dataset: settings.dataset,
            monitoring: MonitoringFlag::new(),
            metrics: Arc::new(MetricsRecorder::new()),
            logger: LogManager::new("fetcher"),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn monitoring(&self) -> MonitoringFlag {
        self.monitoring.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    /// Checks preconditions and raises the monitoring flag. Nothing is
    /// requested until [`FetchRun::execute`] is awaited; the run owns what it
    /// needs, so it can be moved into a spawned task.
    pub fn begin(&self, location: &Location) -> PipelineResult<FetchRun> {
        if !location.is_finite() {
            return Err(PipelineError::InvalidLocation(format!(
                "{}, {}",
                location.lat, location.lon
            )));
        }
        let (dataset_index, slots) = self.dataset.select()?;
        let guard = self
            .monitoring
            .try_begin()
            .ok_or(PipelineError::AlreadyMonitoring)?;

        self.logger.record(&format!(
            "monitoring {} with dataset {} ({} slots)",
            location.name,
            dataset_index,
            slots.len()
        ));

        Ok(FetchRun {
            backend: self.backend.clone(),
            pacing: self.pacing,
            metrics: self.metrics.clone(),
            logger: self.logger.clone(),
            location: location.clone(),
            dataset_index,
            slots,
            _guard: guard,
        })
    }

    /// Convenience for `begin` followed by `execute`.
    pub async fn run<F>(&self, location: &Location, on_frame: F) -> PipelineResult<Vec<TimeSeriesFrame>>
    where
        F: FnMut(&TimeSeriesFrame) + Send,
    {
        let run = self.begin(location)?;
        Ok(run.execute(on_frame).await)
    }
}

/// An accepted run. Holds the monitoring flag until it finishes.
pub struct FetchRun {
    backend: Arc<dyn DetectionBackend>,
    pacing: Duration,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
    location: Location,
    dataset_index: usize,
    slots: &'static [&'static str; SLOTS_PER_DATASET],
    _guard: MonitoringGuard,
}

impl FetchRun {
    pub fn dataset_index(&self) -> usize {
        self.dataset_index
    }

    pub fn slots(&self) -> &'static [&'static str] {
        self.slots
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Fetches every slot in order. A failed slot yields a placeholder frame
    /// so the result always holds one frame per slot.
    pub async fn execute<F>(self, mut on_frame: F) -> Vec<TimeSeriesFrame>
    where
        F: FnMut(&TimeSeriesFrame) + Send,
    {
        let mut frames = Vec::with_capacity(self.slots.len());

        for (idx, slot) in self.slots.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.pacing).await;
            }
            let frame = self.fetch_slot(slot, idx == 0).await;
            self.metrics.record_frame();
            on_frame(&frame);
            frames.push(frame);
        }

        self.logger.record(&format!(
            "time series for {} complete: {} frames",
            self.location.name,
            frames.len()
        ));
        frames
    }

    async fn fetch_slot(&self, slot: &str, is_initial: bool) -> TimeSeriesFrame {
        self.metrics.record_request();
        match self.backend.fetch_frame(slot, &self.location, is_initial).await {
            Ok(frame) => {
                self.logger.detail(&format!(
                    "slot {} returned {} patches",
                    slot,
                    frame.patches.len()
                ));
                frame
            }
            Err(err) => {
                self.metrics.record_slot_failure();
                self.logger
                    .warn(&format!("slot {} failed, using empty frame: {}", slot, err));
                TimeSeriesFrame::placeholder(slot)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Patch;
    use crate::timeseries::dataset::DATASETS;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Debug, Clone)]
    struct Call {
        slot: String,
        lat: f64,
        lon: f64,
        is_initial: bool,
        at: Instant,
    }

    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<Call>>,
        failing: HashSet<String>,
    }

    impl FakeBackend {
        fn failing(slots: &[&str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: slots.iter().map(|slot| slot.to_string()).collect(),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl DetectionBackend for FakeBackend {
        async fn fetch_frame(
            &self,
            slot: &str,
            location: &Location,
            is_initial: bool,
        ) -> PipelineResult<TimeSeriesFrame> {
            self.calls.lock().unwrap().push(Call {
                slot: slot.to_string(),
                lat: location.lat,
                lon: location.lon,
                is_initial,
                at: Instant::now(),
            });
            if self.failing.contains(slot) {
                return Err(PipelineError::Backend {
                    slot: slot.to_string(),
                    reason: "HTTP 503".into(),
                });
            }
            Ok(TimeSeriesFrame::new(
                slot,
                vec![Patch::new(
                    format!("{}-0", slot),
                    location.lat,
                    location.lon,
                    false,
                )],
            ))
        }
    }

    fn settings(index: usize) -> PipelineSettings {
        PipelineSettings {
            dataset: DatasetSelection::Fixed { index },
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_fetches_each_slot_in_order_with_pacing() {
        let backend = Arc::new(FakeBackend::default());
        let fetcher = TimeSeriesFetcher::new(backend.clone(), &settings(3));
        let location = Location::from_coordinates(15.0, -85.0);

        let started = Instant::now();
        let mut seen = Vec::new();
        let frames = fetcher
            .run(&location, |frame| seen.push(frame.timestamp.clone()))
            .await
            .unwrap();

        let expected: Vec<String> = DATASETS[3].iter().map(|s| s.to_string()).collect();
        let timestamps: Vec<String> = frames.iter().map(|f| f.timestamp.clone()).collect();
        assert_eq!(timestamps, expected);
        assert_eq!(seen, expected);

        let calls = backend.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].at, started);
        assert!(calls[0].is_initial);
        assert!(calls[1..].iter().all(|call| !call.is_initial));
        assert!(calls.iter().all(|call| call.lat == 15.0 && call.lon == -85.0));
        for pair in calls.windows(2) {
            assert!(pair[1].at - pair[0].at >= Duration::from_secs(10));
        }
        assert_eq!(calls[0].slot, DATASETS[3][0]);
        assert!(!fetcher.monitoring().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_slots_become_placeholders() {
        let backend = Arc::new(FakeBackend::failing(&[DATASETS[1][0], DATASETS[1][2]]));
        let fetcher = TimeSeriesFetcher::new(backend.clone(), &settings(1));
        let location = Location::from_coordinates(1.0, 2.0);

        let frames = fetcher.run(&location, |_| {}).await.unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], TimeSeriesFrame::placeholder(DATASETS[1][0]));
        assert_eq!(frames[1].patches.len(), 1);
        assert_eq!(frames[2], TimeSeriesFrame::placeholder(DATASETS[1][2]));

        let snapshot = fetcher.metrics().snapshot();
        assert_eq!(snapshot.requests, 3);
        assert_eq!(snapshot.slot_failures, 2);
        assert_eq!(snapshot.frames, 3);
        assert!(!fetcher.monitoring().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn monitoring_flag_blocks_second_run() {
        let backend = Arc::new(FakeBackend::default());
        let fetcher = TimeSeriesFetcher::new(backend.clone(), &settings(0));
        let location = Location::from_coordinates(0.0, 0.0);

        let run = fetcher.begin(&location).unwrap();
        assert!(fetcher.monitoring().is_active());
        assert!(matches!(
            fetcher.begin(&location),
            Err(PipelineError::AlreadyMonitoring)
        ));

        run.execute(|_| {}).await;
        assert!(!fetcher.monitoring().is_active());
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_run_can_finish_on_another_task() {
        let backend = Arc::new(FakeBackend::default());
        let fetcher = TimeSeriesFetcher::new(backend.clone(), &settings(2));
        let location = Location::from_coordinates(15.0, -85.0);

        let run = fetcher.begin(&location).unwrap();
        assert_eq!(run.dataset_index(), 2);
        assert_eq!(run.location(), &location);
        let handle = tokio::spawn(run.execute(|_| {}));
        assert!(fetcher.monitoring().is_active());

        let frames = handle.await.unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].timestamp, DATASETS[2][2]);
        assert!(!fetcher.monitoring().is_active());
    }

    #[tokio::test]
    async fn invalid_location_is_refused_without_requests() {
        let backend = Arc::new(FakeBackend::default());
        let fetcher = TimeSeriesFetcher::new(backend.clone(), &settings(0));
        let location = Location {
            lat: f64::NAN,
            lon: 0.0,
            name: String::new(),
        };

        let result = fetcher.run(&location, |_| {}).await;
        assert!(matches!(result, Err(PipelineError::InvalidLocation(_))));
        assert!(backend.calls().is_empty());
        assert!(!fetcher.monitoring().is_active());
    }

    #[tokio::test]
    async fn bad_dataset_index_is_refused() {
        let backend = Arc::new(FakeBackend::default());
        let fetcher = TimeSeriesFetcher::new(backend.clone(), &settings(9));
        let location = Location::from_coordinates(0.0, 0.0);
        assert!(matches!(
            fetcher.begin(&location),
            Err(PipelineError::Config(_))
        ));
        assert!(!fetcher.monitoring().is_active());
    }
}
