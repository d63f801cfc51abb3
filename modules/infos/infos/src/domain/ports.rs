use async_trait::async_trait;
use infos_sdk::GeoPoint;
use thiserror::Error;

/// Failure of a geocoder call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// Provider unreachable, timed out or answered 502/503/504.
    #[error("address lookup unavailable: {0}")]
    Unavailable(String),
    /// Any other failure: unexpected status or undecodable body.
    #[error("geocoder failed: {0}")]
    Upstream(String),
}

impl GeocodeError {
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Outbound port resolving a free-text address.
#[async_trait]
pub trait GeocoderPort: Send + Sync {
    /// Candidates ordered by provider relevance; empty when nothing matched.
    async fn geocode(&self, address: &str) -> Result<Vec<GeoPoint>, GeocodeError>;
}
