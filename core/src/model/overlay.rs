use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which backend view the map overlays show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    #[default]
    None,
    #[serde(alias = "vessels", alias = "ship")]
    Ships,
    Debris,
    Distance,
}

impl DetectionMode {
    /// Path segment of the tile image endpoint, if the mode renders overlays.
    pub fn view_segment(self) -> Option<&'static str> {
        match self {
            DetectionMode::None => None,
            DetectionMode::Ships => Some("ship"),
            DetectionMode::Debris => Some("debris"),
            DetectionMode::Distance => Some("distance"),
        }
    }

    pub fn shows_overlays(self) -> bool {
        self != DetectionMode::None
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DetectionMode::None => "none",
            DetectionMode::Ships => "ships",
            DetectionMode::Debris => "debris",
            DetectionMode::Distance => "distance",
        };
        f.write_str(label)
    }
}

impl FromStr for DetectionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(DetectionMode::None),
            "ships" | "ship" | "vessels" => Ok(DetectionMode::Ships),
            "debris" => Ok(DetectionMode::Debris),
            "distance" => Ok(DetectionMode::Distance),
            other => Err(format!("unknown detection mode '{}'", other)),
        }
    }
}

/// South-west and north-east corners, each `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayBounds(pub [[f64; 2]; 2]);

impl OverlayBounds {
    pub fn centered(lat: f64, lon: f64, half_step: f64) -> Self {
        OverlayBounds([
            [lat - half_step, lon - half_step],
            [lat + half_step, lon + half_step],
        ])
    }

    pub fn south_west(&self) -> [f64; 2] {
        self.0[0]
    }

    pub fn north_east(&self) -> [f64; 2] {
        self.0[1]
    }

    pub fn height(&self) -> f64 {
        self.0[1][0] - self.0[0][0]
    }

    pub fn width(&self) -> f64 {
        self.0[1][1] - self.0[0][1]
    }
}

/// Georeferenced image rectangle for the active frame and mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub key: String,
    pub url: String,
    pub bounds: OverlayBounds,
    pub opacity: f32,
}
