//! Listing-page fetcher.

use dinercadeau_core::{build_listing_url, FetchSettings};
use reqwest::{Client, StatusCode, Url};

use crate::client::{build_client, extract_domain};
use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// A rendered listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub url: String,
    pub page_number: u32,
    pub html: String,
}

/// Fetches `/restaurant` listing pages with retry on transient errors.
///
/// Holds the same `reqwest::Client` the extractor should use, so the user
/// agent and language preference are consistent across page and asset
/// requests.
#[derive(Debug, Clone)]
pub struct ListingFetcher {
    client: Client,
    settings: FetchSettings,
}

impl ListingFetcher {
    /// Creates a fetcher with a client built from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidHeader`] or [`ScraperError::Http`] if
    /// the client cannot be built.
    pub fn new(settings: FetchSettings) -> Result<Self, ScraperError> {
        let client = build_client(&settings)?;
        Ok(Self { client, settings })
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches listing page `page` (1-based).
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if the configured base URL is unusable.
    /// - [`ScraperError::RateLimited`] on HTTP 429 after all retries.
    /// - [`ScraperError::NotFound`] on HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ScraperError::Http`] on network failure after all retries.
    pub async fn fetch_page(&self, page: u32) -> Result<ListingPage, ScraperError> {
        let url = build_listing_url(&self.settings, page);
        Url::parse(&url).map_err(|e| ScraperError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(page, url = %url, "fetching listing page");

        let html = retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_secs,
            || {
                let url = url.clone();
                async move {
                    let response = self.client.get(&url).send().await?;
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after_secs = response
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(60);
                        return Err(ScraperError::RateLimited {
                            domain: extract_domain(&url),
                            retry_after_secs,
                        });
                    }

                    if status == StatusCode::NOT_FOUND {
                        return Err(ScraperError::NotFound { url });
                    }

                    if !status.is_success() {
                        return Err(ScraperError::UnexpectedStatus {
                            status: status.as_u16(),
                            url,
                        });
                    }

                    Ok(response.text().await?)
                }
            },
        )
        .await?;

        tracing::debug!(page, bytes = html.len(), "listing page fetched");
        Ok(ListingPage {
            url,
            page_number: page,
            html,
        })
    }
}
