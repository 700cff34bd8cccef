use crate::workflow::config::MonitorConfig;
use anyhow::Context;
use aquacore::alerts::{AlertStore, FileAlertStore, MemoryAlertStore};
use aquacore::locate::{Geocoder, NominatimGeocoder};
use aquacore::telemetry::MetricsSnapshot;
use aquacore::timeseries::{DetectionBackend, HttpDetectionBackend};
use aquacore::{Location, MonitorService, SearchInput};
use std::sync::Arc;

/// Per-frame line of the run summary.
#[derive(Debug, Clone)]
pub struct FrameSummary {
    pub timestamp: String,
    pub patches: usize,
    pub alerts: usize,
}

pub struct WorkflowResult {
    pub location: Location,
    pub frames: Vec<FrameSummary>,
    pub alerts_total: usize,
    pub metrics: MetricsSnapshot,
}

#[derive(Clone)]
pub struct Runner {
    config: MonitorConfig,
    service: MonitorService,
}

impl Runner {
    /// Wires the HTTP geocoder, HTTP backend and configured alert store.
    pub fn new(config: MonitorConfig) -> anyhow::Result<Self> {
        let geocoder = NominatimGeocoder::new(config.geocoder_url.clone())
            .context("building geocoder client")?;
        let backend = HttpDetectionBackend::new(&config.backend_url);
        let store: Arc<dyn AlertStore> = match &config.alert_store {
            Some(path) => Arc::new(FileAlertStore::new(path.clone())),
            None => Arc::new(MemoryAlertStore::new()),
        };
        Self::from_parts(config, Arc::new(geocoder), Arc::new(backend), store)
    }

    pub fn from_parts(
        config: MonitorConfig,
        geocoder: Arc<dyn Geocoder>,
        backend: Arc<dyn DetectionBackend>,
        store: Arc<dyn AlertStore>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let service = MonitorService::new(&config.to_settings(), geocoder, backend, store)
            .context("creating monitor service")?;
        Ok(Self { config, service })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn service(&self) -> &MonitorService {
        &self.service
    }

    /// Runs the startup search. `None` when it matched nothing.
    pub async fn bootstrap(&self, input: &SearchInput) -> anyhow::Result<Option<Location>> {
        self.service
            .search(input)
            .await
            .context("running startup search")
    }

    /// Fetches the full time series for the selected location.
    pub async fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let location = self
            .service
            .scene()?
            .selected_location
            .context("no location selected; pass --search or --lat/--lon")?;

        let frames = self
            .service
            .run_time_series()
            .await
            .context("running time series")?;

        let frames = frames
            .iter()
            .map(|frame| FrameSummary {
                timestamp: frame.timestamp.clone(),
                patches: frame.patches.len(),
                alerts: frame.alert_patches().count(),
            })
            .collect();

        Ok(WorkflowResult {
            location,
            frames,
            alerts_total: self.service.scene()?.alerts.len(),
            metrics: self.service.metrics(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use aquacore::locate::GeocodeHit;
    use aquacore::prelude::{PipelineResult, ResolveResult};
    use aquacore::{Patch, TimeSeriesFrame};

    pub(crate) struct OneHitGeocoder;

    #[async_trait::async_trait]
    impl Geocoder for OneHitGeocoder {
        async fn lookup(&self, _query: &str) -> ResolveResult<Vec<GeocodeHit>> {
            Ok(vec![GeocodeHit {
                lat: "15.5".into(),
                lon: "-86.25".into(),
                display_name: Some("Roatán".into()),
            }])
        }
    }

    /// Every slot returns one alerting and one quiet patch.
    pub(crate) struct AlertingBackend;

    #[async_trait::async_trait]
    impl DetectionBackend for AlertingBackend {
        async fn fetch_frame(
            &self,
            slot: &str,
            location: &Location,
            _is_initial: bool,
        ) -> PipelineResult<TimeSeriesFrame> {
            Ok(TimeSeriesFrame::new(
                slot,
                vec![
                    Patch::new("alert", location.lat, location.lon, true),
                    Patch::new("quiet", location.lat + 0.017297, location.lon, false),
                ],
            ))
        }
    }

    pub(crate) fn test_runner() -> Runner {
        let config = MonitorConfig {
            pacing_secs: 0,
            ..Default::default()
        };
        Runner::from_parts(
            config,
            Arc::new(OneHitGeocoder),
            Arc::new(AlertingBackend),
            Arc::new(MemoryAlertStore::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn runner_executes_time_series() {
        let runner = test_runner();
        let location = runner
            .bootstrap(&SearchInput::text("Roatan"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(location.name, "15.5000, -86.2500");

        let result = runner.execute().await.unwrap();
        assert_eq!(result.frames.len(), 3);
        assert!(result.frames.iter().all(|frame| frame.patches == 2 && frame.alerts == 1));
        assert_eq!(result.alerts_total, 3);
        assert_eq!(result.metrics.requests, 3);
    }

    #[tokio::test]
    async fn execute_without_location_fails() {
        let runner = test_runner();
        assert!(runner.execute().await.is_err());
    }

    #[test]
    fn runner_restores_alerts_from_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alertMarkers.json");
        std::fs::write(
            &path,
            r#"[{"lat": 15.0, "lng": -85.0, "timestamp": "2025-08-30-13-45-00",
                "patch": {"patch_id": "p", "coordinates": {"latitude": 15.0, "longitude": -85.0},
                          "detections": {"is_alert": true}},
                "baseLocationLat": 15.0, "baseLocationLon": -85.0,
                "detectedAt": "2026-01-05T10:00:00Z"}]"#,
        )
        .unwrap();

        let config = MonitorConfig {
            alert_store: Some(path),
            ..Default::default()
        };
        let runner = Runner::new(config).unwrap();
        assert_eq!(runner.service().scene().unwrap().alerts.len(), 1);
        assert!(runner.config().alert_store.is_some());
    }
}
