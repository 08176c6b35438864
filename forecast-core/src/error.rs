use thiserror::Error;

/// Failures surfaced by a forecast lookup.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// No location for the address, or no forecast for the coordinates.
    #[error("{0}")]
    NotFound(String),

    /// Transport, status or decoding failure from an upstream service.
    /// Alternate formatting (`{:#}`) prints the whole context chain.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl ForecastError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
