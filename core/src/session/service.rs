use crate::alerts::{AlertAccumulator, AlertStore};
use crate::locate::{Geocoder, LocationResolver};
use crate::model::{DetectionMode, Location, SearchInput, TimeSeriesFrame};
use crate::prelude::{PipelineError, PipelineResult, PipelineSettings};
use crate::projection::OverlayProjector;
use crate::render::MapScene;
use crate::session::state::MapSession;
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use crate::timeseries::{DetectionBackend, FetchRun, TimeSeriesFetcher};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Entry point for user actions on the map. Cheap to clone; every clone
/// drives the same session.
#[derive(Clone)]
pub struct MonitorService {
    session: Arc<Mutex<MapSession>>,
    resolver: Arc<LocationResolver>,
    fetcher: Arc<TimeSeriesFetcher>,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl MonitorService {
    pub fn new(
        settings: &PipelineSettings,
        geocoder: Arc<dyn Geocoder>,
        backend: Arc<dyn DetectionBackend>,
        store: Arc<dyn AlertStore>,
    ) -> PipelineResult<Self> {
        settings.dataset.validate()?;

        let metrics = Arc::new(MetricsRecorder::new());
        let fetcher = TimeSeriesFetcher::new(backend, settings).with_metrics(metrics.clone());
        let alerts = AlertAccumulator::new(store).with_metrics(metrics.clone());
        let projector = OverlayProjector::new(settings.backend_url.clone(), settings.overlay_opacity);
        let session = MapSession::new(alerts, projector, fetcher.monitoring());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            resolver: Arc::new(LocationResolver::new(geocoder)),
            fetcher: Arc::new(fetcher),
            metrics,
            logger: LogManager::new("service"),
        })
    }

    fn lock(&self) -> PipelineResult<MutexGuard<'_, MapSession>> {
        self.session
            .lock()
            .map_err(|_| PipelineError::Internal("map session lock poisoned".into()))
    }

    pub fn subscribe(&self) -> PipelineResult<watch::Receiver<MapScene>> {
        Ok(self.lock()?.subscribe())
    }

    pub fn scene(&self) -> PipelineResult<MapScene> {
        Ok(self.lock()?.scene())
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn is_monitoring(&self) -> bool {
        self.fetcher.monitoring().is_active()
    }

    /// Resolves `input` and selects it. A search that finds nothing leaves
    /// the session untouched and returns `None`.
    pub async fn search(&self, input: &SearchInput) -> PipelineResult<Option<Location>> {
        match self.resolver.resolve_with_source(input).await {
            Ok((location, source)) => {
                self.lock()?.apply_location(location.clone(), source);
                Ok(Some(location))
            }
            Err(err) => {
                self.logger.warn(&format!("search ignored: {}", err));
                Ok(None)
            }
        }
    }

    /// Fetches the whole time series for the selected location. Refused
    /// with no side effects when nothing is selected or a run is active.
    pub async fn run_time_series(&self) -> PipelineResult<Vec<TimeSeriesFrame>> {
        let run = self.accept_run()?;
        self.drive(run).await
    }

    /// Accepts a run on the caller's thread and fetches it on a new task.
    /// Refusals surface here rather than from the task, so concurrent
    /// callers each get a definite answer.
    pub fn spawn_time_series(&self) -> PipelineResult<JoinHandle<PipelineResult<Vec<TimeSeriesFrame>>>> {
        let run = self.accept_run()?;
        let service = self.clone();
        Ok(tokio::spawn(async move { service.drive(run).await }))
    }

    fn accept_run(&self) -> PipelineResult<FetchRun> {
        let mut session = self.lock()?;
        let origin = session
            .selected_location()
            .cloned()
            .ok_or(PipelineError::NoLocation)?;
        let run = self.fetcher.begin(&origin)?;
        session.start_series();
        Ok(run)
    }

    async fn drive(&self, run: FetchRun) -> PipelineResult<Vec<TimeSeriesFrame>> {
        let origin = run.location().clone();
        let session = self.session.clone();
        let frames = run
            .execute(move |frame| match session.lock() {
                Ok(mut session) => session.apply_frame(frame, &origin),
                Err(_) => log::error!("map session lock poisoned; dropping frame {}", frame.timestamp),
            })
            .await;

        // The run has released the monitoring flag; let subscribers see it.
        self.lock()?.publish();
        Ok(frames)
    }

    pub fn set_mode(&self, mode: DetectionMode) -> PipelineResult<bool> {
        Ok(self.lock()?.set_mode(mode))
    }

    pub fn select_frame(&self, index: usize) -> PipelineResult<bool> {
        Ok(self.lock()?.select_frame(index))
    }

    pub fn next_frame(&self) -> PipelineResult<bool> {
        Ok(self.lock()?.next_frame())
    }

    pub fn previous_frame(&self) -> PipelineResult<bool> {
        Ok(self.lock()?.previous_frame())
    }

    pub fn reset_alerts(&self) -> PipelineResult<()> {
        Ok(self.lock()?.reset_alerts()?)
    }

    pub fn reset_view(&self) -> PipelineResult<()> {
        self.lock()?.reset_view();
        Ok(())
    }
}
