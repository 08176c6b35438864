use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{ForecastError, model::ResolvedLocation};

use super::{AddressResolver, REQUEST_TIMEOUT, truncate_body};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Geocoder backed by the OpenStreetMap Nominatim search API.
#[derive(Debug, Clone)]
pub struct NominatimResolver {
    base_url: String,
    http: Client,
}

impl NominatimResolver {
    pub fn new(base_url: &str, user_agent: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .context("Failed to build Nominatim HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NmPlace {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    address: Option<NmAddress>,
}

#[derive(Debug, Deserialize)]
struct NmAddress {
    postcode: Option<String>,
}

impl From<NmPlace> for ResolvedLocation {
    fn from(place: NmPlace) -> Self {
        Self {
            latitude: place.lat,
            longitude: place.lon,
            display_name: place.display_name,
            postcode: place.address.and_then(|a| a.postcode),
        }
    }
}

#[async_trait]
impl AddressResolver for NominatimResolver {
    async fn resolve(&self, query: &str) -> Result<Vec<ResolvedLocation>, ForecastError> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!(%url, query, "Resolving address");

        let res = self
            .http
            .get(&url)
            .query(&[("format", "jsonv2"), ("addressdetails", "1"), ("q", query)])
            .send()
            .await
            .with_context(|| format!("Failed to send request to Nominatim for: {query}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Nominatim response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Nominatim search for '{}' failed with status {}: {}",
                query,
                status,
                truncate_body(&body),
            )
            .into());
        }

        let places: Vec<NmPlace> =
            serde_json::from_str(&body).context("Failed to parse Nominatim search JSON")?;

        Ok(places.into_iter().map(ResolvedLocation::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver(server: &MockServer) -> NominatimResolver {
        NominatimResolver::new(&server.uri(), "forecast-test/0.1").unwrap()
    }

    #[tokio::test]
    async fn resolve_maps_places_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("format", "jsonv2"))
            .and(query_param("addressdetails", "1"))
            .and(query_param("q", "123 Main St, Springfield, IL 62704"))
            .and(header("user-agent", "forecast-test/0.1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "lat": "39.7817",
                    "lon": "-89.6501",
                    "display_name": "123 Main St, Springfield, IL 62704",
                    "address": { "road": "Main St", "postcode": "62704", "country_code": "us" }
                },
                {
                    "lat": "37.2090",
                    "lon": "-93.2923",
                    "display_name": "Springfield, MO"
                }
            ])))
            .mount(&server)
            .await;

        let places = resolver(&server)
            .resolve("123 Main St, Springfield, IL 62704")
            .await
            .unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].latitude, "39.7817");
        assert_eq!(places[0].longitude, "-89.6501");
        assert_eq!(places[0].postcode.as_deref(), Some("62704"));
        assert_eq!(places[1].display_name, "Springfield, MO");
        assert_eq!(places[1].postcode, None);
    }

    #[tokio::test]
    async fn resolve_returns_empty_for_no_match() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let places = resolver(&server).resolve("Nowhere, XX").await.unwrap();
        assert!(places.is_empty());
    }

    #[tokio::test]
    async fn resolve_surfaces_server_errors_as_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = resolver(&server).resolve("Springfield").await.unwrap_err();

        assert!(matches!(err, ForecastError::Upstream(_)));
        let msg = format!("{err:#}");
        assert!(msg.contains("503"));
        assert!(msg.contains("Springfield"));
    }

    #[tokio::test]
    async fn resolve_surfaces_bad_json_as_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = resolver(&server).resolve("Springfield").await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse Nominatim search JSON"));
    }
}
