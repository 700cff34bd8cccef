use crate::locate::geocoder::Geocoder;
use crate::model::location::in_range;
use crate::model::{Location, SearchInput};
use crate::prelude::{ResolveError, ResolveResult};
use crate::telemetry::LogManager;
use std::sync::Arc;

/// How a location was obtained; the map zooms closer for explicit coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    Coordinates,
    Geocoder,
}

/// Turns a search string or coordinate pair into a canonical [`Location`].
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    logger: LogManager,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            geocoder,
            logger: LogManager::new("resolver"),
        }
    }

    pub async fn resolve(&self, input: &SearchInput) -> ResolveResult<Location> {
        self.resolve_with_source(input)
            .await
            .map(|(location, _)| location)
    }

    pub async fn resolve_with_source(
        &self,
        input: &SearchInput,
    ) -> ResolveResult<(Location, ResolvedBy)> {
        match input {
            SearchInput::Coordinate { lat, lon } => {
                resolve_coordinates(*lat, *lon).map(|location| (location, ResolvedBy::Coordinates))
            }
            SearchInput::Text(text) => {
                let query = text.trim();
                if query.is_empty() {
                    return Err(ResolveError::Empty);
                }
                if let Some((lat, lon)) = parse_coordinate_text(query) {
                    return resolve_coordinates(lat, lon)
                        .map(|location| (location, ResolvedBy::Coordinates));
                }
                self.geocode(query)
                    .await
                    .map(|location| (location, ResolvedBy::Geocoder))
            }
        }
    }

    async fn geocode(&self, query: &str) -> ResolveResult<Location> {
        let hits = self.geocoder.lookup(query).await.inspect_err(|err| {
            self.logger
                .warn(&format!("search for '{}' failed: {}", query, err));
        })?;

        let first = hits
            .first()
            .ok_or_else(|| ResolveError::NoMatch(query.to_string()))?;
        let lat = first.lat.trim().parse::<f64>();
        let lon = first.lon.trim().parse::<f64>();
        match (lat, lon) {
            (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => {
                let location = Location::from_coordinates(lat, lon);
                self.logger
                    .record(&format!("'{}' resolved to {}", query, location.name));
                Ok(location)
            }
            _ => {
                self.logger.warn(&format!(
                    "unparseable coordinates for '{}': {}, {}",
                    query, first.lat, first.lon
                ));
                Err(ResolveError::NoMatch(query.to_string()))
            }
        }
    }
}

/// Validates an explicit coordinate pair. Never touches the network.
pub fn resolve_coordinates(lat: f64, lon: f64) -> ResolveResult<Location> {
    if in_range(lat, lon) {
        Ok(Location::from_coordinates(lat, lon))
    } else {
        Err(ResolveError::InvalidCoordinates { lat, lon })
    }
}

/// Recognises `"lat,lon"` typed into the search box.
pub fn parse_coordinate_text(text: &str) -> Option<(f64, f64)> {
    let mut parts = text.split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lon = parts.next()?.trim().parse::<f64>().ok()?;
    if parts.next().is_some() || !in_range(lat, lon) {
        return None;
    }
    Some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::geocoder::GeocodeHit;
    use std::sync::Mutex;

    struct FakeGeocoder {
        hits: ResolveResult<Vec<GeocodeHit>>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeGeocoder {
        fn returning(hits: Vec<GeocodeHit>) -> Arc<Self> {
            Arc::new(Self {
                hits: Ok(hits),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                hits: Err(ResolveError::Lookup("connection refused".into())),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl Geocoder for FakeGeocoder {
        async fn lookup(&self, query: &str) -> ResolveResult<Vec<GeocodeHit>> {
            self.queries.lock().unwrap().push(query.to_string());
            match &self.hits {
                Ok(hits) => Ok(hits.clone()),
                Err(err) => Err(ResolveError::Lookup(err.to_string())),
            }
        }
    }

    fn hit(lat: &str, lon: &str) -> GeocodeHit {
        GeocodeHit {
            lat: lat.into(),
            lon: lon.into(),
            display_name: Some("Somewhere, Earth".into()),
        }
    }

    #[tokio::test]
    async fn coordinates_resolve_without_lookup() {
        let geocoder = FakeGeocoder::returning(vec![]);
        let resolver = LocationResolver::new(geocoder.clone());

        let location = resolver
            .resolve(&SearchInput::coordinate(15.0, -85.0))
            .await
            .unwrap();
        assert_eq!(location.name, "15.0000, -85.0000");
        assert_eq!(geocoder.calls(), 0);
    }

    #[tokio::test]
    async fn out_of_range_coordinates_fail() {
        let resolver = LocationResolver::new(FakeGeocoder::returning(vec![]));
        for (lat, lon) in [(90.5, 0.0), (-91.0, 10.0), (0.0, 180.01), (0.0, -200.0)] {
            let result = resolver.resolve(&SearchInput::coordinate(lat, lon)).await;
            assert!(matches!(
                result,
                Err(ResolveError::InvalidCoordinates { .. })
            ));
        }
    }

    #[tokio::test]
    async fn text_uses_first_hit_and_formats_name() {
        let geocoder = FakeGeocoder::returning(vec![hit("17.385044", "78.486671"), hit("1", "2")]);
        let resolver = LocationResolver::new(geocoder.clone());

        let (location, source) = resolver
            .resolve_with_source(&SearchInput::text("  Hyderabad "))
            .await
            .unwrap();
        assert_eq!(source, ResolvedBy::Geocoder);
        assert_eq!(location.lat, 17.385044);
        assert_eq!(location.name, "17.3850, 78.4867");
        assert_eq!(geocoder.queries.lock().unwrap()[0], "Hyderabad");
    }

    #[tokio::test]
    async fn blank_text_is_ignored() {
        let geocoder = FakeGeocoder::returning(vec![hit("1", "2")]);
        let resolver = LocationResolver::new(geocoder.clone());
        assert!(matches!(
            resolver.resolve(&SearchInput::text("   ")).await,
            Err(ResolveError::Empty)
        ));
        assert_eq!(geocoder.calls(), 0);
    }

    #[tokio::test]
    async fn typed_coordinates_skip_geocoder() {
        let geocoder = FakeGeocoder::returning(vec![]);
        let resolver = LocationResolver::new(geocoder.clone());
        let (location, source) = resolver
            .resolve_with_source(&SearchInput::text("15.0, -85.0"))
            .await
            .unwrap();
        assert_eq!(source, ResolvedBy::Coordinates);
        assert_eq!(location.lon, -85.0);
        assert_eq!(geocoder.calls(), 0);
    }

    #[tokio::test]
    async fn empty_or_failed_lookup_is_no_location() {
        let resolver = LocationResolver::new(FakeGeocoder::returning(vec![]));
        assert!(matches!(
            resolver.resolve(&SearchInput::text("Atlantis")).await,
            Err(ResolveError::NoMatch(_))
        ));

        let resolver = LocationResolver::new(FakeGeocoder::failing());
        assert!(matches!(
            resolver.resolve(&SearchInput::text("Lisbon")).await,
            Err(ResolveError::Lookup(_))
        ));

        let resolver = LocationResolver::new(FakeGeocoder::returning(vec![hit("north", "2")]));
        assert!(matches!(
            resolver.resolve(&SearchInput::text("Nowhere")).await,
            Err(ResolveError::NoMatch(_))
        ));
    }

    #[test]
    fn coordinate_text_requires_two_in_range_numbers() {
        assert_eq!(parse_coordinate_text("15.0,-85.0"), Some((15.0, -85.0)));
        assert_eq!(parse_coordinate_text(" 1 , 2 "), Some((1.0, 2.0)));
        assert_eq!(parse_coordinate_text("95,10"), None);
        assert_eq!(parse_coordinate_text("1,2,3"), None);
        assert_eq!(parse_coordinate_text("Paris, France"), None);
        assert_eq!(parse_coordinate_text("42"), None);
    }
}
