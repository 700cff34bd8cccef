use crate::model::{Location, Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Map marker derived from a patch the backend flagged as an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: String,
    pub patch: Patch,
    /// Search location that triggered the run, not the patch position.
    pub base_location_lat: f64,
    pub base_location_lon: f64,
    pub detected_at: DateTime<Utc>,
}

impl AlertRecord {
    pub fn from_patch(
        patch: &Patch,
        timestamp: &str,
        origin: &Location,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            lat: patch.coordinates.latitude,
            lng: patch.coordinates.longitude,
            timestamp: timestamp.to_string(),
            patch: patch.clone(),
            base_location_lat: origin.lat,
            base_location_lon: origin.lon,
            detected_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let patch = Patch::new("p-7", 14.99, -85.01, true);
        let origin = Location::from_coordinates(15.0, -85.0);
        let record = AlertRecord::from_patch(&patch, "2025-11-08-15-30-00", &origin, Utc::now());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["lat"], 14.99);
        assert_eq!(value["lng"], -85.01);
        assert_eq!(value["baseLocationLat"], 15.0);
        assert_eq!(value["baseLocationLon"], -85.0);
        assert!(value["detectedAt"].as_str().unwrap().ends_with('Z'));

        let back: AlertRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
