//! HTTP client for the Nominatim search API.

use std::time::Duration;

use dinercadeau_core::GeocodeSettings;
use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::types::{GeocodeResult, NominatimPlace};

/// Client for a Nominatim-compatible `/search` endpoint.
///
/// The endpoint comes from [`GeocodeSettings::provider_url`], so tests point
/// it at a mock server.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    provider_url: Url,
    email: Option<String>,
    pause: Duration,
}

impl NominatimGeocoder {
    /// Creates a geocoder from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidBaseUrl`] if the provider URL does not
    /// parse, or [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: &GeocodeSettings) -> Result<Self, GeocodeError> {
        let provider_url =
            Url::parse(&settings.provider_url).map_err(|e| GeocodeError::InvalidBaseUrl {
                url: settings.provider_url.clone(),
                reason: e.to_string(),
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            provider_url,
            email: settings.email.clone().filter(|e| !e.trim().is_empty()),
            pause: Duration::try_from_secs_f64(settings.pause_seconds).unwrap_or(Duration::ZERO),
        })
    }

    /// Delay the caller should leave between consecutive lookups.
    #[must_use]
    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Resolves a free-text address to coordinates.
    ///
    /// Returns `Ok(None)` when the provider has no match or its first match
    /// has no usable coordinates.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Http`] on network failure or timeout.
    /// - [`GeocodeError::UnexpectedStatus`] on any non-2xx status.
    /// - [`GeocodeError::Deserialize`] if the body is not a JSON array of
    ///   places.
    pub async fn geocode(&self, query: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        let url = self.build_url(query);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
                query: query.to_owned(),
            });
        }

        let body = response.text().await?;
        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("search(q={query})"),
                source: e,
            })?;

        let Some(first) = places.into_iter().next() else {
            tracing::debug!(query, "no geocoding match");
            return Ok(None);
        };
        let result = first.into_result(query);
        if result.is_none() {
            tracing::debug!(query, "first geocoding match has no usable coordinates");
        }
        Ok(result)
    }

    fn build_url(&self, query: &str) -> Url {
        let mut url = self.provider_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("format", "jsonv2")
                .append_pair("q", query)
                .append_pair("limit", "1");
            if let Some(email) = &self.email {
                pairs.append_pair("email", email);
            }
        }
        url
    }
}
