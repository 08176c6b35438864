//! Address to forecast lookup, cached by postcode.
//!
//! Every request geocodes the address, since the postcode is what keys the
//! cache. Only the forecast fetch is skipped on a hit. Locations without a
//! postcode are never cached and always hit the forecast provider.

use std::sync::Arc;

use crate::{
    Config, ForecastError,
    cache::ForecastCache,
    model::{AddressQuery, CachedForecastResult, MAX_PERIODS, ResolvedLocation},
    provider::{AddressResolver, ForecastProvider, provider_from_config, resolver_from_config},
};

#[derive(Debug, Clone)]
pub struct ForecastService {
    resolver: Arc<dyn AddressResolver>,
    provider: Arc<dyn ForecastProvider>,
    cache: ForecastCache,
    max_periods: usize,
}

impl ForecastService {
    pub fn new(
        resolver: Arc<dyn AddressResolver>,
        provider: Arc<dyn ForecastProvider>,
        cache: ForecastCache,
    ) -> Self {
        Self {
            resolver,
            provider,
            cache,
            max_periods: MAX_PERIODS,
        }
    }

    /// Override how many forecast periods are kept. Values below 1 are raised to 1.
    pub fn with_max_periods(mut self, max_periods: usize) -> Self {
        self.max_periods = max_periods.max(1);
        self
    }

    /// Build a service talking to the configured upstreams, with a fresh cache.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let cache = ForecastCache::new(config.cache_settings());
        Ok(Self::new(resolver_from_config(config)?, provider_from_config(config)?, cache)
            .with_max_periods(config.max_periods()))
    }

    pub fn cache(&self) -> &ForecastCache {
        &self.cache
    }

    pub async fn get_forecast(
        &self,
        address: &AddressQuery,
    ) -> Result<CachedForecastResult, ForecastError> {
        let location = self.resolve_location(address).await?;
        let postcode = location.cache_key();

        match postcode {
            Some(postcode) => {
                if let Some(cached) = self.cache.get(postcode).await {
                    tracing::info!(postcode, "Cache hit");
                    return Ok(cached);
                }
                tracing::info!(postcode, "Cache miss");
            }
            None => {
                tracing::debug!(address = %address, "No postcode for location, skipping cache");
            }
        }

        let forecast = self
            .provider
            .fetch(&location.latitude, &location.longitude)
            .await?
            .ok_or_else(|| {
                ForecastError::NotFound(format!(
                    "No forecast available for coordinates: {}, {}",
                    location.latitude, location.longitude
                ))
            })?
            .truncated(self.max_periods);

        let result = CachedForecastResult::new(location.display_name.clone(), forecast, false);

        if let Some(postcode) = postcode {
            self.cache
                .put(postcode, result.clone().with_cache_flag(true))
                .await;
        }

        Ok(result)
    }

    async fn resolve_location(
        &self,
        address: &AddressQuery,
    ) -> Result<ResolvedLocation, ForecastError> {
        self.resolver
            .resolve(address.as_str())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ForecastError::NotFound(format!("No address records found for: {address}"))
            })
    }
}
