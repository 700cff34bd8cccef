use serde::{Deserialize, Serialize};

/// Canonical search location produced by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

impl Location {
    /// Builds a location whose name is the fixed 4-decimal `"lat, lon"` label.
    pub fn from_coordinates(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            name: coordinate_label(lat, lon),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

pub fn coordinate_label(lat: f64, lon: f64) -> String {
    format!("{:.4}, {:.4}", lat, lon)
}

pub fn in_range(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// What the user typed or clicked. The coordinate form also accepts the
/// `{"isCoordinate": true, "lat": .., "lon": ..}` object sent by map clicks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchInput {
    Coordinate { lat: f64, lon: f64 },
    Text(String),
}

impl SearchInput {
    pub fn text(query: impl Into<String>) -> Self {
        SearchInput::Text(query.into())
    }

    pub fn coordinate(lat: f64, lon: f64) -> Self {
        SearchInput::Coordinate { lat, lon }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_uses_four_decimals() {
        let location = Location::from_coordinates(15.0, -85.123456);
        assert_eq!(location.name, "15.0000, -85.1235");
    }

    #[test]
    fn range_check_includes_bounds() {
        assert!(in_range(90.0, -180.0));
        assert!(in_range(-90.0, 180.0));
        assert!(!in_range(90.0001, 0.0));
        assert!(!in_range(0.0, -180.5));
        assert!(!in_range(f64::NAN, 0.0));
    }

    #[test]
    fn search_input_accepts_coordinate_object() {
        let input: SearchInput =
            serde_json::from_str(r#"{"isCoordinate": true, "lat": 17.3, "lon": 78.5}"#).unwrap();
        assert_eq!(input, SearchInput::coordinate(17.3, 78.5));

        let text: SearchInput = serde_json::from_str(r#""Hyderabad""#).unwrap();
        assert_eq!(text, SearchInput::text("Hyderabad"));
    }
}
