//! Locating the page bundle and the runtime bundle on a listing page.

use reqwest::Url;

use crate::client::resolve_url;
use crate::error::ExtractError;
use crate::html::script_sources;

/// Absolute URLs of the two bundles the dataset lookup needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleAssets {
    /// Page-specific bundle holding the dataset mapping.
    pub page_bundle_url: String,
    /// Shared runtime bundle holding the chunk hash map.
    pub runtime_url: String,
}

/// Finds the first `<script src>` containing each marker and resolves it
/// against `base`.
///
/// # Errors
///
/// Returns [`ExtractError::AssetsNotFound`] if either bundle is missing.
pub(crate) fn discover_assets(
    html: &str,
    base: &Url,
    page_bundle_marker: &str,
    runtime_marker: &str,
) -> Result<BundleAssets, ExtractError> {
    let sources = script_sources(html);
    let find = |marker: &str| {
        sources
            .iter()
            .find(|src| src.contains(marker))
            .and_then(|src| resolve_url(base, src))
    };

    match (find(page_bundle_marker), find(runtime_marker)) {
        (Some(page_bundle_url), Some(runtime_url)) => Ok(BundleAssets {
            page_bundle_url,
            runtime_url,
        }),
        (page, runtime) => {
            tracing::debug!(
                script_count = sources.len(),
                page_bundle_found = page.is_some(),
                runtime_found = runtime.is_some(),
                "bundle assets not referenced by page"
            );
            Err(ExtractError::AssetsNotFound)
        }
    }
}
