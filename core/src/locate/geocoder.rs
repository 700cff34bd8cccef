use crate::prelude::{PipelineError, PipelineResult, ResolveError, ResolveResult};
use serde::Deserialize;
use url::form_urlencoded;

const USER_AGENT: &str = concat!("aquasentinel-monitor/", env!("CARGO_PKG_VERSION"));

/// One geocoding candidate. Nominatim returns coordinates as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeHit {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Free-text place lookup.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, query: &str) -> ResolveResult<Vec<GeocodeHit>>;
}

/// Geocoder backed by a Nominatim-style `GET <base><query>` endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> PipelineResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| PipelineError::Config(format!("geocoder client: {}", err)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn request_url(&self, query: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!("{}{}", self.base_url, encoded)
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, query: &str) -> ResolveResult<Vec<GeocodeHit>> {
        let response = self
            .client
            .get(self.request_url(query))
            .send()
            .await
            .map_err(|err| ResolveError::Lookup(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Lookup(format!("geocoder returned {}", status)));
        }

        // Anything other than a JSON array counts as "no match".
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|err| ResolveError::Lookup(err.to_string()))?;
        match body {
            serde_json::Value::Array(_) => serde_json::from_value(body)
                .map_err(|err| ResolveError::Lookup(err.to_string())),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use warp::http::StatusCode;
    use warp::{Filter, Reply};

    /// Local Nominatim stand-in; the `q` parameter picks the reply.
    fn spawn_search_server() -> (String, Arc<Mutex<Vec<(HashMap<String, String>, Option<String>)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let route = warp::path("search")
            .and(warp::path::end())
            .and(warp::get())
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::header::optional::<String>("user-agent"))
            .map(move |query: HashMap<String, String>, agent: Option<String>| {
                let q = query.get("q").cloned().unwrap_or_default();
                log.lock().unwrap().push((query, agent));
                match q.as_str() {
                    "Rio de Janeiro" => warp::reply::json(&serde_json::json!([
                        {"lat": "-22.9110", "lon": "-43.2094", "display_name": "Rio de Janeiro, Brasil"},
                        {"lat": "-22.0", "lon": "-42.0"}
                    ]))
                    .into_response(),
                    "Atlantis" => warp::reply::json(&serde_json::json!([])).into_response(),
                    "Nowhere" => warp::reply::json(&serde_json::json!({})).into_response(),
                    "Broken" => warp::reply::json(&serde_json::json!([{"lat": 1.5}])).into_response(),
                    _ => warp::reply::with_status("rate limited", StatusCode::TOO_MANY_REQUESTS)
                        .into_response(),
                }
            });
        let (address, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        (
            format!("http://{}/search?format=json&limit=1&q=", address),
            seen,
        )
    }

    #[tokio::test]
    async fn lookup_sends_encoded_query_and_user_agent() {
        let (base_url, seen) = spawn_search_server();
        let geocoder = NominatimGeocoder::new(base_url).unwrap();

        let hits = geocoder.lookup("Rio de Janeiro").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].lat, "-22.9110");
        assert_eq!(hits[0].lon, "-43.2094");
        assert_eq!(hits[1].display_name, None);

        let seen = seen.lock().unwrap().clone();
        let (query, agent) = &seen[0];
        assert_eq!(query["q"], "Rio de Janeiro");
        assert_eq!(query["format"], "json");
        assert_eq!(query["limit"], "1");
        assert!(agent.as_deref().unwrap_or_default().starts_with("aquasentinel-monitor/"));
    }

    #[tokio::test]
    async fn empty_or_non_array_body_means_no_hits() {
        let (base_url, _) = spawn_search_server();
        let geocoder = NominatimGeocoder::new(base_url).unwrap();

        assert!(geocoder.lookup("Atlantis").await.unwrap().is_empty());
        assert!(geocoder.lookup("Nowhere").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn error_status_and_malformed_hits_are_lookup_failures() {
        let (base_url, _) = spawn_search_server();
        let geocoder = NominatimGeocoder::new(base_url).unwrap();

        match geocoder.lookup("Lisbon").await {
            Err(ResolveError::Lookup(reason)) => assert!(reason.contains("429"), "{}", reason),
            other => panic!("expected lookup failure, got {:?}", other),
        }
        assert!(matches!(
            geocoder.lookup("Broken").await,
            Err(ResolveError::Lookup(_))
        ));
    }

    #[test]
    fn request_url_appends_encoded_query() {
        let geocoder = NominatimGeocoder::new("https://geo.example/search?q=").unwrap();
        assert_eq!(
            geocoder.request_url("Gulf of Honduras"),
            "https://geo.example/search?q=Gulf+of+Honduras"
        );
        assert_eq!(
            geocoder.request_url("a&b"),
            "https://geo.example/search?q=a%26b"
        );
    }

    #[test]
    fn hits_parse_string_coordinates() {
        let hits: Vec<GeocodeHit> = serde_json::from_str(
            r#"[{"lat": "17.385", "lon": "78.4867", "display_name": "Hyderabad, India"}]"#,
        )
        .unwrap();
        assert_eq!(hits[0].lat, "17.385");
        assert_eq!(hits[0].display_name.as_deref(), Some("Hyderabad, India"));
    }
}
