use aquacore::{DetectionMode, Location};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ModeRequest {
    pub mode: DetectionMode,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FrameStep {
    Next,
    Previous,
}

/// `{"index": 2}` or `{"step": "next"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FrameRequest {
    Index { index: usize },
    Step { step: FrameStep },
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct StatusReply {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
}

impl StatusReply {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            ..Default::default()
        }
    }

    pub fn with_status(status: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            ..Default::default()
        }
    }
}
