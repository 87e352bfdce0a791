//! End-to-end run: crawl listing pages, deduplicate, geocode, export.
//!
//! Per-restaurant geocoding failures are logged and skipped so one bad
//! address does not abort the run. Listing fetch failures are fatal, except
//! a 404 after the first page, which is treated as the end of the listing.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use dinercadeau_core::{PipelineSettings, Restaurant};
use dinercadeau_geocode::{distance_from_utrecht_km, NominatimGeocoder};
use dinercadeau_scraper::{
    ExtractorSettings, ListingFetcher, ListingRequest, RestaurantExtractor, ScraperError, Strategy,
};

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct PipelineReport {
    pub pages_fetched: u32,
    pub restaurants: usize,
    pub geocoded: usize,
}

/// Runs the full pipeline and writes the CSV named in `settings`.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be built, a listing page cannot
/// be fetched, or the CSV cannot be written.
pub(crate) async fn run_pipeline(settings: &PipelineSettings) -> anyhow::Result<PipelineReport> {
    let fetcher = ListingFetcher::new(settings.fetch.clone())
        .context("failed to build listing fetcher")?;
    let extractor = RestaurantExtractor::new(fetcher.client().clone(), extractor_settings(settings));

    let (restaurants, pages_fetched) = collect_restaurants(&fetcher, &extractor, settings).await?;
    let mut restaurants = deduplicate_restaurants(restaurants);
    tracing::info!(
        count = restaurants.len(),
        "retained unique restaurants after deduplication"
    );

    let geocoded = if settings.include_geocoding {
        let geocoder = NominatimGeocoder::new(&settings.geocode)
            .context("failed to build geocoding client")?;
        geocode_missing(&mut restaurants, &geocoder).await
    } else {
        0
    };

    apply_distances(&mut restaurants);

    crate::export::write_csv(&restaurants, &settings.output_csv, settings.append)
        .with_context(|| format!("failed to write {}", settings.output_csv.display()))?;

    Ok(PipelineReport {
        pages_fetched,
        restaurants: restaurants.len(),
        geocoded,
    })
}

fn extractor_settings(settings: &PipelineSettings) -> ExtractorSettings {
    ExtractorSettings {
        bundle: settings.bundle.clone(),
        page_size: settings.fetch.page_size,
    }
}

/// Crawls pages `1..=max_pages`, stopping at the first page that yields no
/// restaurants.
async fn collect_restaurants(
    fetcher: &ListingFetcher,
    extractor: &RestaurantExtractor,
    settings: &PipelineSettings,
) -> anyhow::Result<(Vec<Restaurant>, u32)> {
    let pause = seconds(settings.fetch.pause_seconds);
    let locality = settings.fetch.city.as_deref();

    let mut restaurants = Vec::new();
    let mut pages_fetched = 0;

    for page_number in 1..=settings.fetch.max_pages {
        if page_number > 1 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        let page = match fetcher.fetch_page(page_number).await {
            Ok(page) => page,
            Err(ScraperError::NotFound { url }) if page_number > 1 => {
                tracing::info!(page = page_number, url = %url, "listing ended with 404");
                break;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to fetch listing page {page_number}"))
            }
        };
        pages_fetched += 1;

        let extraction = extractor
            .extract(&ListingRequest {
                html: &page.html,
                page_url: &page.url,
                locality,
                page: Some(page_number),
            })
            .await;

        if extraction.restaurants.is_empty() {
            tracing::info!(page = page_number, "no restaurants on page, stopping");
            break;
        }

        tracing::info!(
            page = page_number,
            count = extraction.restaurants.len(),
            strategy = extraction.strategy.map(Strategy::as_str),
            "parsed listing page"
        );
        restaurants.extend(extraction.restaurants);
    }

    Ok((restaurants, pages_fetched))
}

/// Removes duplicates, keeping the first occurrence.
///
/// The key is the trimmed, lowercased URL, or the lowercased name when the
/// URL is blank.
pub(crate) fn deduplicate_restaurants(restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
    let mut seen = HashSet::new();
    restaurants
        .into_iter()
        .filter(|r| {
            let url = r.url.trim();
            let key = if url.is_empty() {
                r.name.trim().to_lowercase()
            } else {
                url.to_lowercase()
            };
            seen.insert(key)
        })
        .collect()
}

/// Looks up coordinates for every restaurant that lacks them. Returns how
/// many were resolved.
async fn geocode_missing(restaurants: &mut [Restaurant], geocoder: &NominatimGeocoder) -> usize {
    let mut resolved = 0;
    let mut first_lookup = true;

    for restaurant in restaurants.iter_mut().filter(|r| !r.has_coordinates()) {
        let Some(query) = restaurant.geocode_query() else {
            tracing::debug!(name = %restaurant.name, "no address to geocode");
            continue;
        };

        if !first_lookup && !geocoder.pause().is_zero() {
            tokio::time::sleep(geocoder.pause()).await;
        }
        first_lookup = false;

        match geocoder.geocode(&query).await {
            Ok(Some(result)) => {
                restaurant.latitude = Some(result.latitude);
                restaurant.longitude = Some(result.longitude);
                tracing::debug!(name = %restaurant.name, resolved = %result.address, "geocoded");
                resolved += 1;
            }
            Ok(None) => {
                tracing::debug!(name = %restaurant.name, query = %query, "address not found");
            }
            Err(e) => {
                tracing::warn!(
                    name = %restaurant.name,
                    query = %query,
                    error = %e,
                    "geocoding failed, skipping"
                );
            }
        }
    }

    resolved
}

/// Fills `distance_km_from_utrecht` for every restaurant with coordinates.
pub(crate) fn apply_distances(restaurants: &mut [Restaurant]) {
    for restaurant in restaurants {
        if let (Some(lat), Some(lon)) = (restaurant.latitude, restaurant.longitude) {
            restaurant.distance_km_from_utrecht = Some(distance_from_utrecht_km(lat, lon));
        }
    }
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
