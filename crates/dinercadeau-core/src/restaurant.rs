//! Canonical restaurant entity shared by every extraction strategy.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Country assigned when a listing does not carry one.
pub const DEFAULT_COUNTRY: &str = "Netherlands";

/// Value of [`Restaurant::source`] for every record produced by this workspace.
pub const SOURCE_LABEL: &str = "diner-cadeau";

/// Normalized representation of a restaurant listing.
///
/// `name` and `url` are never empty. Every other text field is `None` rather
/// than an empty string when the source did not provide it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub name: String,
    /// Absolute listing URL; also the deduplication key.
    pub url: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub description: Option<String>,
    /// Unique case-insensitively, in first-seen order.
    pub tags: Vec<String>,
    pub price_range: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Filled by the pipeline after geocoding.
    pub distance_km_from_utrecht: Option<f64>,
    pub source: String,
    pub scraped_at: DateTime<Utc>,
}

impl Restaurant {
    /// Creates a restaurant with only the required fields set.
    ///
    /// Returns `None` when either `name` or `url` is blank after trimming.
    #[must_use]
    pub fn new(name: &str, url: &str) -> Option<Self> {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            url: url.to_string(),
            city: None,
            address: None,
            postal_code: None,
            country: DEFAULT_COUNTRY.to_string(),
            description: None,
            tags: Vec::new(),
            price_range: None,
            rating: None,
            review_count: None,
            latitude: None,
            longitude: None,
            distance_km_from_utrecht: None,
            source: SOURCE_LABEL.to_string(),
            scraped_at: Utc::now(),
        })
    }

    /// Returns `true` when both coordinates are known.
    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Builds the free-text geocoding query from the address parts.
    ///
    /// Empty parts are skipped; returns `None` when nothing is left.
    #[must_use]
    pub fn geocode_query(&self) -> Option<String> {
        let parts: Vec<&str> = [
            self.address.as_deref(),
            self.postal_code.as_deref(),
            self.city.as_deref(),
            Some(self.country.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Merges tag sources into one list of unique tags.
///
/// Tags are trimmed, blanks are dropped, and comparison is case-insensitive.
/// The first occurrence keeps its original casing.
pub fn merge_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            continue;
        }
        if seen.insert(tag.to_lowercase()) {
            merged.push(tag.to_string());
        }
    }

    merged
}

/// Maps the localized country name to the canonical English one.
///
/// `"Nederland"` (any casing) becomes `"Netherlands"`; a missing or blank
/// value defaults to [`DEFAULT_COUNTRY`].
#[must_use]
pub fn normalize_country(country: Option<&str>) -> String {
    match country.map(str::trim).filter(|c| !c.is_empty()) {
        None => DEFAULT_COUNTRY.to_string(),
        Some(c) if c.eq_ignore_ascii_case("nederland") => DEFAULT_COUNTRY.to_string(),
        Some(c) => c.to_string(),
    }
}
