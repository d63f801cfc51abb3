use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use infos_sdk::GeoPoint;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use crate::config::GeocoderConfig;
use crate::domain::ports::{GeocodeError, GeocoderPort};

#[derive(Debug, Deserialize)]
struct CensusResponse {
    result: CensusResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CensusResult {
    #[serde(default)]
    address_matches: Vec<AddressMatch>,
}

#[derive(Debug, Deserialize)]
struct AddressMatch {
    coordinates: Coordinates,
}

/// `x` is the longitude, `y` the latitude.
#[derive(Debug, Deserialize)]
struct Coordinates {
    x: f64,
    y: f64,
}

/// HTTP adapter implementing the `GeocoderPort` against the US Census
/// one-line-address geocoder.
///
/// `reqwest::Client` is `Clone + Send + Sync`, so no external locking is needed.
pub struct CensusGeocoder {
    client: reqwest::Client,
    endpoint: Url,
    benchmark: String,
}

impl CensusGeocoder {
    /// Build the adapter; the proxy, timeout and user agent are fixed here.
    ///
    /// # Errors
    /// Fails on an invalid `base_url` or `proxy`, or when the TLS backend
    /// cannot be initialised.
    pub fn new(cfg: &GeocoderConfig) -> anyhow::Result<Self> {
        let mut endpoint =
            Url::parse(&cfg.base_url).with_context(|| format!("invalid base_url {}", cfg.base_url))?;
        endpoint
            .path_segments_mut()
            .map_err(|()| anyhow::anyhow!("base_url cannot be a base: {}", cfg.base_url))?
            .pop_if_empty()
            .extend(&["geocoder", "locations", "onelineaddress"]);

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .user_agent(cfg.user_agent.as_str());
        if let Some(proxy) = &cfg.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .with_context(|| format!("invalid geocoder proxy {proxy}"))?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().context("failed to build geocoder HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            benchmark: cfg.benchmark.clone(),
        })
    }

    fn request_url(&self, address: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("benchmark", &self.benchmark)
            .append_pair("format", "json");
        url
    }
}

#[async_trait]
impl GeocoderPort for CensusGeocoder {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn geocode(&self, address: &str) -> Result<Vec<GeoPoint>, GeocodeError> {
        let response = self
            .client
            .get(self.request_url(address))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GeocodeError::Unavailable(e.to_string()))?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
        ) {
            return Err(GeocodeError::Unavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(GeocodeError::Upstream(format!("HTTP {status}")));
        }

        let body: CensusResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Upstream(format!("undecodable response: {e}")))?;

        let points: Vec<GeoPoint> = body
            .result
            .address_matches
            .into_iter()
            .map(|m| GeoPoint {
                lat: m.coordinates.y,
                lng: m.coordinates.x,
            })
            .collect();
        tracing::debug!(candidates = points.len(), "Geocoder answered");
        Ok(points)
    }
}
