//! URL origin, domain and relative-link helpers.

use reqwest::Url;

/// Extracts the scheme+host origin from a page URL.
///
/// Given `"https://www.diner-cadeau.nl/restaurant?page=2"`, returns
/// `"https://www.diner-cadeau.nl"`.
#[must_use]
pub fn page_origin(page_url: &str) -> String {
    Url::parse(page_url).map_or_else(
        |e| {
            tracing::warn!(
                page_url,
                error = %e,
                "could not parse page URL; falling back to string split for origin extraction"
            );
            page_url
                .trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// Extracts the hostname from a URL for use in error messages.
///
/// Falls back to the full URL string if parsing fails.
pub(crate) fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

/// Resolves `href` against `base`, returning an absolute URL.
///
/// Absolute `href`s are returned unchanged (normalized); protocol-relative and
/// path-relative ones are joined. Returns `None` for blank or unparseable
/// input.
#[must_use]
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(String::from)
}
