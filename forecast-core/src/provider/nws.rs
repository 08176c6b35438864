use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::{ForecastError, model::Forecast};

use super::{ForecastProvider, REQUEST_TIMEOUT, truncate_body};

pub const NWS_URL: &str = "https://api.weather.gov";

/// Forecasts from the US National Weather Service.
///
/// The NWS API needs two requests: `/points/{lat},{lon}` names the forecast
/// endpoint of the nearest field office, which is then fetched. Either hop
/// coming back empty yields `Ok(None)`.
#[derive(Debug, Clone)]
pub struct NwsForecastProvider {
    base_url: String,
    http: Client,
}

impl NwsForecastProvider {
    pub fn new(base_url: &str, user_agent: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .context("Failed to build NWS HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch_office_url(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> anyhow::Result<Option<String>> {
        let url = format!("{}/points/{},{}", self.base_url, latitude, longitude);

        let Some(body) = self.get_body(&url, "points").await? else {
            tracing::warn!(latitude, longitude, "NWS has no grid point for coordinates");
            return Ok(None);
        };

        let parsed: NwsPointResponse =
            serde_json::from_str(&body).context("Failed to parse NWS points JSON")?;

        let office_url = parsed.properties.forecast.filter(|u| !u.trim().is_empty());
        if office_url.is_none() {
            tracing::warn!(
                latitude,
                longitude,
                "No National Weather Service station available for coordinates"
            );
        }
        Ok(office_url)
    }

    async fn fetch_office_forecast(&self, office_url: &str) -> anyhow::Result<Option<Forecast>> {
        // Only the path is taken so both hops go to the configured base URL.
        let path = Url::parse(office_url)
            .with_context(|| format!("NWS returned an invalid forecast URL: {office_url}"))?
            .path()
            .to_string();
        let url = format!("{}{}", self.base_url, path);

        let Some(body) = self.get_body(&url, "forecast").await? else {
            tracing::warn!(office_url, "No forecast available from NWS office");
            return Ok(None);
        };

        let parsed: NwsForecastResponse =
            serde_json::from_str(&body).context("Failed to parse NWS forecast JSON")?;

        Ok(Some(parsed.properties))
    }

    /// GET `url`; `Ok(None)` on 404, error on any other non-success status.
    async fn get_body(&self, url: &str, what: &str) -> anyhow::Result<Option<String>> {
        tracing::debug!(url, "Requesting NWS {what}");

        let res = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/geo+json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to NWS ({what}): {url}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read NWS {what} response body"))?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(anyhow!(
                "NWS {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        Ok(Some(body))
    }
}

#[derive(Debug, Deserialize)]
struct NwsPointProperties {
    forecast: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NwsPointResponse {
    properties: NwsPointProperties,
}

#[derive(Debug, Deserialize)]
struct NwsForecastResponse {
    properties: Forecast,
}

#[async_trait]
impl ForecastProvider for NwsForecastProvider {
    async fn fetch(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> Result<Option<Forecast>, ForecastError> {
        let coordinates = format!("{latitude}, {longitude}");

        let office_url = self
            .fetch_office_url(latitude, longitude)
            .await
            .with_context(|| format!("NWS office lookup failed for coordinates: {coordinates}"))?;

        let Some(office_url) = office_url else {
            return Ok(None);
        };

        let forecast = self
            .fetch_office_forecast(&office_url)
            .await
            .with_context(|| format!("NWS forecast lookup failed for coordinates: {coordinates}"))?;

        Ok(forecast)
    }
}
