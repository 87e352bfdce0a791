//! Strategy orchestration for one listing page.
//!
//! Tries the bundle dataset first, then JSON-LD blocks, then embedded Nuxt
//! payloads, and returns the first usable result.

use std::fmt;
use std::sync::Arc;

use dinercadeau_core::Restaurant;
use reqwest::{Client, Url};

use crate::bundle::{discover_assets, resolve_dataset, AssetCache, BundleSettings};
use crate::client::page_origin;
use crate::error::ExtractError;
use crate::fallback::{extract_jsonld_restaurants, extract_payload_restaurants};
use crate::normalize::normalize_records;
use crate::window::{select_window, DEFAULT_PAGE_SIZE};

/// Extraction strategies in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Dataset recovered from the compiled JavaScript bundle.
    BundleDataset,
    /// schema.org JSON-LD blocks in the page.
    StructuredData,
    /// Search of embedded Nuxt payloads.
    EmbeddedPayload,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::BundleDataset,
        Strategy::StructuredData,
        Strategy::EmbeddedPayload,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::BundleDataset => "bundle_dataset",
            Strategy::StructuredData => "structured_data",
            Strategy::EmbeddedPayload => "embedded_payload",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorSettings {
    pub bundle: BundleSettings,
    /// Records per listing page when windowing the bundle dataset.
    pub page_size: usize,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            bundle: BundleSettings::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One rendered listing page and the query it answers.
#[derive(Debug, Clone, Copy)]
pub struct ListingRequest<'a> {
    pub html: &'a str,
    /// Absolute URL the page was fetched from. Its origin is the base for
    /// relative asset and listing links.
    pub page_url: &'a str,
    pub locality: Option<&'a str>,
    /// 1-based page number; `None` returns the whole dataset.
    pub page: Option<u32>,
}

/// Restaurants found on one page, and which strategy found them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub restaurants: Vec<Restaurant>,
    /// `None` when every strategy came up empty.
    pub strategy: Option<Strategy>,
}

/// Extracts restaurants from listing pages.
///
/// Owns the asset cache, so repeated pages of the same listing download and
/// parse the bundles once. Clone the `Arc` from [`RestaurantExtractor::cache`]
/// to clear it from elsewhere.
#[derive(Debug, Clone)]
pub struct RestaurantExtractor {
    client: Client,
    cache: Arc<AssetCache>,
    settings: ExtractorSettings,
}

impl RestaurantExtractor {
    #[must_use]
    pub fn new(client: Client, settings: ExtractorSettings) -> Self {
        Self::with_cache(client, Arc::new(AssetCache::new()), settings)
    }

    /// Creates an extractor sharing an existing cache.
    #[must_use]
    pub fn with_cache(client: Client, cache: Arc<AssetCache>, settings: ExtractorSettings) -> Self {
        Self {
            client,
            cache,
            settings,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<AssetCache> {
        &self.cache
    }

    #[must_use]
    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    /// Runs the strategies in order and returns the first usable result.
    ///
    /// A successful bundle lookup is authoritative even when its window is
    /// empty, which is how a page past the end of the listing shows up. The
    /// fallbacks only count when they find something. Failures are logged,
    /// never returned.
    pub async fn extract(&self, request: &ListingRequest<'_>) -> Extraction {
        let origin = page_origin(request.page_url);
        let base = match Url::parse(&origin) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!(
                    page_url = request.page_url,
                    error = %e,
                    "page URL has no usable origin; nothing can be resolved"
                );
                return Extraction::default();
            }
        };

        for strategy in Strategy::ALL {
            match self.run_strategy(strategy, request, &base).await {
                Ok(restaurants)
                    if strategy == Strategy::BundleDataset || !restaurants.is_empty() =>
                {
                    tracing::info!(
                        strategy = %strategy,
                        page = request.page,
                        count = restaurants.len(),
                        "extracted restaurants"
                    );
                    return Extraction {
                        restaurants,
                        strategy: Some(strategy),
                    };
                }
                Ok(_) => {
                    tracing::debug!(strategy = %strategy, "strategy found no restaurants");
                }
                Err(e) => {
                    tracing::warn!(
                        strategy = %strategy,
                        page_url = request.page_url,
                        error = %e,
                        "extraction strategy failed, falling back"
                    );
                }
            }
        }

        tracing::info!(page_url = request.page_url, "no restaurants found on page");
        Extraction::default()
    }

    async fn run_strategy(
        &self,
        strategy: Strategy,
        request: &ListingRequest<'_>,
        base: &Url,
    ) -> Result<Vec<Restaurant>, ExtractError> {
        match strategy {
            Strategy::BundleDataset => self.extract_from_bundle(request, base).await,
            Strategy::StructuredData => Ok(extract_jsonld_restaurants(request.html, base)),
            Strategy::EmbeddedPayload => Ok(extract_payload_restaurants(request.html, base)),
        }
    }

    async fn extract_from_bundle(
        &self,
        request: &ListingRequest<'_>,
        base: &Url,
    ) -> Result<Vec<Restaurant>, ExtractError> {
        let bundle = &self.settings.bundle;
        let assets = discover_assets(
            request.html,
            base,
            &bundle.page_bundle_marker,
            &bundle.runtime_marker,
        )?;

        let dataset = match resolve_dataset(&self.client, &self.cache, bundle, &assets).await {
            Ok(dataset) => dataset,
            Err(e) => {
                self.cache.invalidate_page_bundle(&assets.page_bundle_url);
                self.cache.invalidate_runtime_bundle(&assets.runtime_url);
                return Err(e);
            }
        };

        let window = select_window(
            &dataset,
            request.locality,
            request.page,
            self.settings.page_size,
        );
        tracing::debug!(
            total = dataset.len(),
            selected = window.len(),
            locality = request.locality,
            page = request.page,
            "windowed bundle dataset"
        );
        Ok(normalize_records(&window, base))
    }
}
