//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Address and forecast models, and the lookup error taxonomy
//! - The geocoding and forecast collaborators (Nominatim, NWS)
//! - A postcode-keyed forecast cache and the service that ties them together
//! - Configuration handling
//!
//! It is used by `forecast-cli`, but can also be embedded in other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;

pub use cache::{CacheSettings, ForecastCache};
pub use config::Config;
pub use error::ForecastError;
pub use model::{AddressQuery, CachedForecastResult, Forecast, ForecastPeriod, ResolvedLocation};
pub use provider::{AddressResolver, ForecastProvider};
pub use service::ForecastService;
