//! Reverse geocoding of the delivery point via the Google Maps Geocoding API.
//!
//! Used to prefill the address field. Every failure degrades to "no
//! suggestion"; the customer can always type the address.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use souq_core::Coordinates;
use tracing::instrument;

use crate::config::GeocodingConfig;

/// Google Maps Geocoding API endpoint.
const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Default, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}

impl GeocodeResponse {
    fn into_address(self) -> Option<String> {
        self.results
            .into_iter()
            .map(|r| r.formatted_address)
            .find(|address| !address.trim().is_empty())
    }
}

/// Reverse geocoder.
#[derive(Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl std::fmt::Debug for Geocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geocoder")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Geocoder {
    /// Create a geocoder against the public Google endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &GeocodingConfig) -> Result<Self, reqwest::Error> {
        Self::with_endpoint(config, GEOCODE_URL)
    }

    /// Create a geocoder against a custom endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_endpoint(
        config: &GeocodingConfig,
        endpoint: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(config.request_timeout)
                .build()?,
            endpoint: endpoint.into(),
            api_key: config.api_key.clone(),
        })
    }

    /// The first formatted address for `location`, if the lookup succeeds.
    #[instrument(skip(self))]
    pub async fn reverse(&self, location: Coordinates) -> Option<String> {
        let latlng = format!("{},{}", location.latitude(), location.longitude());
        let result = self
            .client
            .get(&self.endpoint)
            .query(&[("latlng", latlng.as_str()), ("key", self.api_key.expose_secret())])
            .send()
            .await;

        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Geocoding request rejected");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e.without_url(), "Geocoding request failed");
                return None;
            }
        };

        match response.json::<GeocodeResponse>().await {
            Ok(body) if body.status == "OK" || body.status.is_empty() => body.into_address(),
            Ok(body) => {
                tracing::warn!(status = %body.status, "Geocoding returned no result");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e.without_url(), "Failed to parse geocoding response");
                None
            }
        }
    }
}
