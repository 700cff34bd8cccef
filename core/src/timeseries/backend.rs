use crate::model::{Location, Patch, TimeSeriesFrame};
use crate::prelude::{PipelineError, PipelineResult};
use serde::Deserialize;
use serde_json::Value;

/// Source of per-timestamp detection frames.
#[async_trait::async_trait]
pub trait DetectionBackend: Send + Sync {
    async fn fetch_frame(
        &self,
        slot: &str,
        location: &Location,
        is_initial: bool,
    ) -> PipelineResult<TimeSeriesFrame>;
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    patches: Vec<Patch>,
    #[serde(default)]
    alerts: Vec<Value>,
}

impl ProcessResponse {
    fn into_frame(self, slot: &str) -> TimeSeriesFrame {
        TimeSeriesFrame {
            timestamp: self.timestamp.unwrap_or_else(|| slot.to_string()),
            patches: self.patches,
            alerts: self.alerts,
        }
    }
}

/// `GET <base>/api/process/<slot>?baseLat=..&baseLon=..&isInitial=..`
pub struct HttpDetectionBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDetectionBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn process_url(&self, slot: &str) -> String {
        format!("{}/api/process/{}", self.base_url, slot)
    }
}

fn backend_error(slot: &str, reason: impl ToString) -> PipelineError {
    PipelineError::Backend {
        slot: slot.to_string(),
        reason: reason.to_string(),
    }
}

#[async_trait::async_trait]
impl DetectionBackend for HttpDetectionBackend {
    async fn fetch_frame(
        &self,
        slot: &str,
        location: &Location,
        is_initial: bool,
    ) -> PipelineResult<TimeSeriesFrame> {
        let response = self
            .client
            .get(self.process_url(slot))
            .query(&[
                ("baseLat", location.lat.to_string()),
                ("baseLon", location.lon.to_string()),
                ("isInitial", is_initial.to_string()),
            ])
            .send()
            .await
            .map_err(|err| backend_error(slot, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(backend_error(slot, format!("HTTP {}", status)));
        }

        let body: ProcessResponse = response
            .json()
            .await
            .map_err(|err| backend_error(slot, err))?;
        Ok(body.into_frame(slot))
    }
}
