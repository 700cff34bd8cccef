use anyhow::{bail, Context};
use aquacore::prelude::{
    PipelineSettings, DEFAULT_BACKEND_URL, DEFAULT_GEOCODER_URL, DEFAULT_OVERLAY_OPACITY,
    DEFAULT_PACING,
};
use aquacore::timeseries::DatasetSelection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bridge address the visualizer polls.
pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub backend_url: String,
    pub geocoder_url: String,
    pub pacing_secs: u64,
    pub dataset: DatasetSelection,
    pub overlay_opacity: f32,
    /// Where accumulated alerts persist. Without it they live for one run.
    pub alert_store: Option<PathBuf>,
    pub bind: SocketAddr,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            pacing_secs: DEFAULT_PACING.as_secs(),
            dataset: DatasetSelection::default(),
            overlay_opacity: DEFAULT_OVERLAY_OPACITY,
            alert_store: None,
            bind: default_bind_address(),
        }
    }
}

/// Command-line values that win over the config file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub geocoder_url: Option<String>,
    pub pacing_secs: Option<u64>,
    pub dataset: Option<DatasetSelection>,
    pub alert_store: Option<PathBuf>,
    pub bind: Option<SocketAddr>,
}

impl MonitorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading monitor config {}", path_ref.display()))?;
        let config: MonitorConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing monitor config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.backend_url {
            self.backend_url = url;
        }
        if let Some(url) = overrides.geocoder_url {
            self.geocoder_url = url;
        }
        if let Some(secs) = overrides.pacing_secs {
            self.pacing_secs = secs;
        }
        if let Some(dataset) = overrides.dataset {
            self.dataset = dataset;
        }
        if let Some(path) = overrides.alert_store {
            self.alert_store = Some(path);
        }
        if let Some(bind) = overrides.bind {
            self.bind = bind;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            bail!("overlay_opacity must be within 0..=1, got {}", self.overlay_opacity);
        }
        if self.backend_url.trim().is_empty() {
            bail!("backend_url must not be empty");
        }
        self.dataset.validate().context("validating dataset selection")?;
        Ok(())
    }

    pub fn to_settings(&self) -> PipelineSettings {
        PipelineSettings {
            backend_url: self.backend_url.clone(),
            geocoder_url: self.geocoder_url.clone(),
            pacing: Duration::from_secs(self.pacing_secs),
            dataset: self.dataset,
            overlay_opacity: self.overlay_opacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_pipeline_defaults() {
        let settings = MonitorConfig::default().to_settings();
        assert_eq!(settings.pacing, Duration::from_secs(10));
        assert_eq!(settings.dataset, DatasetSelection::Fixed { index: 3 });
        assert_eq!(settings.backend_url, "http://localhost:8000");
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"backend_url: http://detector:8000\npacing_secs: 2\ndataset:\n  kind: random\n  seed: 7\nalert_store: /tmp/alerts.json\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = MonitorConfig::load(&path).unwrap();
        assert_eq!(cfg.backend_url, "http://detector:8000");
        assert_eq!(cfg.pacing_secs, 2);
        assert_eq!(cfg.dataset, DatasetSelection::Random { seed: Some(7) });
        assert_eq!(cfg.geocoder_url, DEFAULT_GEOCODER_URL);
        assert_eq!(cfg.bind, default_bind_address());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let cfg = MonitorConfig::default().with_overrides(ConfigOverrides {
            backend_url: Some("http://other:9999".into()),
            dataset: Some(DatasetSelection::Fixed { index: 0 }),
            ..Default::default()
        });
        assert_eq!(cfg.backend_url, "http://other:9999");
        assert_eq!(cfg.dataset, DatasetSelection::Fixed { index: 0 });
        assert_eq!(cfg.pacing_secs, 10);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = MonitorConfig {
            overlay_opacity: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = MonitorConfig {
            dataset: DatasetSelection::Fixed { index: 8 },
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        assert!(MonitorConfig::default().validate().is_ok());
    }
}
