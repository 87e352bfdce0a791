//! HTTP plumbing shared by the listing fetcher and the bundle extractor.

mod origin;

use std::time::Duration;

use dinercadeau_core::FetchSettings;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;

use crate::error::{ExtractError, ScraperError};

pub(crate) use origin::extract_domain;
pub use origin::{page_origin, resolve_url};

/// Builds the reusable client: one timeout for every request, plus the
/// configured user agent, language preference and extra headers.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidHeader`] if a configured header name or
/// value is not valid HTTP, or [`ScraperError::Http`] if the underlying
/// `reqwest::Client` cannot be constructed.
pub fn build_client(settings: &FetchSettings) -> Result<Client, ScraperError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("Accept-Language", &settings.accept_language)?,
    );
    for (name, value) in &settings.extra_headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ScraperError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        headers.insert(header_name, header_value(name, value)?);
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(settings.user_agent.as_str())
        .default_headers(headers)
        .build()?;
    Ok(client)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ScraperError> {
    HeaderValue::from_str(value).map_err(|e| ScraperError::InvalidHeader {
        name: name.to_owned(),
        reason: e.to_string(),
    })
}

/// Downloads a JavaScript asset as text.
///
/// # Errors
///
/// - [`ExtractError::Http`] on network failure or timeout.
/// - [`ExtractError::UnexpectedStatus`] on any non-2xx status.
pub(crate) async fn fetch_asset(client: &Client, url: &str) -> Result<String, ExtractError> {
    tracing::debug!(url, "downloading bundle asset");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }
    Ok(response.text().await?)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
