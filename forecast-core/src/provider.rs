use crate::{
    Config, ForecastError,
    model::{Forecast, ResolvedLocation},
    provider::{nominatim::NominatimResolver, nws::NwsForecastProvider},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod nominatim;
pub mod nws;

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns free-form address text into candidate locations, best match first.
#[async_trait]
pub trait AddressResolver: Send + Sync + Debug {
    async fn resolve(&self, query: &str) -> Result<Vec<ResolvedLocation>, ForecastError>;
}

/// Fetches a forecast for a coordinate pair.
///
/// `Ok(None)` means the provider has no forecast for that point.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> Result<Option<Forecast>, ForecastError>;
}

/// Construct the geocoder from config.
pub fn resolver_from_config(config: &Config) -> anyhow::Result<Arc<dyn AddressResolver>> {
    let resolver = NominatimResolver::new(config.nominatim_url(), &config.user_agent())?;
    Ok(Arc::new(resolver))
}

/// Construct the forecast provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn ForecastProvider>> {
    let provider = NwsForecastProvider::new(config.nws_url(), &config.user_agent())?;
    Ok(Arc::new(provider))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
