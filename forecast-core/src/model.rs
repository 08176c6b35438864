use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ForecastError;

/// Maximum number of forecast periods returned and cached per lookup.
pub const MAX_PERIODS: usize = 3;

/// A non-blank, trimmed address as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressQuery(String);

impl AddressQuery {
    pub fn parse(address: &str) -> Result<Self, ForecastError> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(ForecastError::Validation("Address cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AddressQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Best-match location for an address, as returned by a geocoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub latitude: String,
    pub longitude: String,
    pub display_name: String,
    pub postcode: Option<String>,
}

impl ResolvedLocation {
    /// Postcode usable as a cache key. Blank postcodes count as absent.
    pub fn cache_key(&self) -> Option<&str> {
        self.postcode
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub number: u32,
    pub name: String,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub start_time: DateTime<FixedOffset>,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub end_time: DateTime<FixedOffset>,
    pub temperature: i32,
    pub temperature_unit: String,
    pub icon: String,
    pub detailed_forecast: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    #[serde(serialize_with = "serialize_rfc3339")]
    pub update_time: DateTime<FixedOffset>,
    pub periods: Vec<ForecastPeriod>,
}

/// Write timestamps the way NWS sends them: a numeric offset, never `Z`.
fn serialize_rfc3339<S: Serializer>(
    at: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339())
}

impl Forecast {
    /// Keep at most `max` periods, in source order.
    pub fn truncated(mut self, max: usize) -> Self {
        self.periods.truncate(max);
        self
    }
}

/// A forecast annotated with the place it was looked up for and whether it
/// was served from the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedForecastResult {
    pub location_name: String,
    #[serde(rename = "weatherForecast")]
    pub forecast: Forecast,
    pub is_from_cache: bool,
}

impl CachedForecastResult {
    pub fn new(location_name: String, forecast: Forecast, is_from_cache: bool) -> Self {
        Self { location_name, forecast, is_from_cache }
    }

    pub fn with_cache_flag(mut self, is_from_cache: bool) -> Self {
        self.is_from_cache = is_from_cache;
        self
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const TIME: &str = "2025-10-14T20:26:19+00:00";

    pub fn period(number: u32, name: &str) -> ForecastPeriod {
        let at = DateTime::parse_from_rfc3339(TIME).expect("valid fixture time");
        ForecastPeriod {
            number,
            name: name.to_string(),
            start_time: at,
            end_time: at,
            temperature: 48,
            temperature_unit: "F".to_string(),
            icon: "https://api.weather.gov/icons/land/day/rain_showers,50?size=medium".to_string(),
            detailed_forecast: "A chance of rain showers. Mostly cloudy.".to_string(),
        }
    }

    pub fn forecast(names: &[&str]) -> Forecast {
        Forecast {
            update_time: DateTime::parse_from_rfc3339(TIME).expect("valid fixture time"),
            periods: names
                .iter()
                .enumerate()
                .map(|(i, name)| period(i as u32 + 1, name))
                .collect(),
        }
    }
}
