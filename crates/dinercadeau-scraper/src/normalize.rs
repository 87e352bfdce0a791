//! Normalization from bundle dataset records to [`Restaurant`].
//!
//! Records are untyped JSON. They are first narrowed into [`RawRecord`],
//! which names every field the site has been seen to use, and only then
//! mapped onto the canonical entity.

use dinercadeau_core::{merge_tags, normalize_country, Restaurant};
use reqwest::Url;
use serde_json::Value;

use crate::client::resolve_url;
use crate::value::{collapse_whitespace, count, first_present, first_text, number, text};

/// Rich-text nesting deeper than this is ignored.
const MAX_TEXT_DEPTH: usize = 32;

const TITLE_KEYS: &[&str] = &["title", "name"];
const LINK_KEYS: &[&str] = &["linkHref", "link", "url", "href"];
/// City aliases, shared with the locality filter.
pub(crate) const CITY_KEYS: &[&str] = &["city", "plaats", "locality"];
const STREET_KEYS: &[&str] = &["street", "streetAddress", "address"];
const POSTAL_KEYS: &[&str] = &["postalCode", "postcode", "zipcode"];
const LAT_KEYS: &[&str] = &["lat", "latitude"];
const LNG_KEYS: &[&str] = &["lng", "lon", "longitude"];
const DESCRIPTION_KEYS: &[&str] = &["description", "content", "body"];
const REGION_KEYS: &[&str] = &["region", "province"];
const METADATA_KEYS: &[&str] = &["metaData", "metadata"];
const WEBSITE_KEYS: &[&str] = &["websiteLink", "website"];
const RATING_KEYS: &[&str] = &["rating", "score"];
const REVIEW_KEYS: &[&str] = &["reviewCount", "reviews"];

/// A dataset record with every known field narrowed to its Rust type.
///
/// For each field the first alias holding a usable value wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub title: Option<String>,
    pub link: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub label: Option<String>,
    pub region: Option<String>,
    /// Metadata values in the order the record lists them.
    pub metadata: Vec<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
}

impl RawRecord {
    #[must_use]
    pub fn from_value(record: &Value) -> Self {
        Self {
            title: first_text(record, TITLE_KEYS),
            link: first_text(record, LINK_KEYS),
            city: first_text(record, CITY_KEYS),
            street: first_text(record, STREET_KEYS),
            postal_code: first_text(record, POSTAL_KEYS),
            country: first_text(record, &["country"]),
            latitude: first_number(record, LAT_KEYS),
            longitude: first_number(record, LNG_KEYS),
            description: first_present(record, DESCRIPTION_KEYS).and_then(flatten_rich_text),
            label: first_text(record, &["label"]),
            region: first_text(record, REGION_KEYS),
            metadata: first_present(record, METADATA_KEYS)
                .map(metadata_values)
                .unwrap_or_default(),
            website: first_present(record, WEBSITE_KEYS).and_then(website_label),
            rating: first_number(record, RATING_KEYS),
            review_count: REVIEW_KEYS
                .iter()
                .filter_map(|key| record.get(key))
                .find_map(count),
        }
    }
}

/// Normalizes one dataset record, resolving its link against `base`.
///
/// Returns `None` when the record has no title or no usable link.
#[must_use]
pub fn normalize_record(record: &Value, base: &Url) -> Option<Restaurant> {
    let raw = RawRecord::from_value(record);

    let (Some(title), Some(link)) = (raw.title.as_deref(), raw.link.as_deref()) else {
        tracing::debug!(
            has_title = raw.title.is_some(),
            has_link = raw.link.is_some(),
            "skipping dataset record without title or link"
        );
        return None;
    };
    let Some(url) = resolve_url(base, link) else {
        tracing::debug!(title, link, "skipping dataset record with unresolvable link");
        return None;
    };

    let mut restaurant = Restaurant::new(title, &url)?;
    restaurant.tags = merge_tags(
        raw.label
            .iter()
            .chain(raw.region.iter())
            .chain(raw.metadata.iter())
            .chain(raw.website.iter()),
    );
    restaurant.city = raw.city;
    restaurant.address = raw.street;
    restaurant.postal_code = raw.postal_code;
    restaurant.country = normalize_country(raw.country.as_deref());
    restaurant.description = raw.description;
    restaurant.rating = raw.rating;
    restaurant.review_count = raw.review_count;
    restaurant.latitude = raw.latitude;
    restaurant.longitude = raw.longitude;
    Some(restaurant)
}

/// Normalizes a window of records, dropping the unusable ones.
#[must_use]
pub fn normalize_records(records: &[&Value], base: &Url) -> Vec<Restaurant> {
    let restaurants: Vec<Restaurant> = records
        .iter()
        .filter_map(|record| normalize_record(record, base))
        .collect();

    let skipped = records.len() - restaurants.len();
    if skipped > 0 {
        tracing::debug!(skipped, kept = restaurants.len(), "dropped dataset records");
    }
    restaurants
}

fn first_number(record: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find_map(number)
}

/// Flattens a description given as a plain string or as rich-text blocks.
///
/// Text nodes inside one block are concatenated as-is; blocks are joined
/// with a single space.
fn flatten_rich_text(value: &Value) -> Option<String> {
    let joined = match value {
        Value::String(s) => s.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .map(|block| {
                let mut text = String::new();
                collect_text(block, 0, &mut text);
                text
            })
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(_) => {
            let mut text = String::new();
            collect_text(value, 0, &mut text);
            text
        }
        _ => return None,
    };
    collapse_whitespace(&joined)
}

fn collect_text(node: &Value, depth: usize, out: &mut String) {
    if depth > MAX_TEXT_DEPTH {
        return;
    }
    match node {
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            for item in items {
                collect_text(item, depth + 1, out);
            }
        }
        Value::Object(map) => {
            if let Some(Value::String(s)) = map.get("text") {
                out.push_str(s);
            }
            if let Some(children) = map.get("children") {
                collect_text(children, depth + 1, out);
            }
        }
        _ => {}
    }
}

fn metadata_values(value: &Value) -> Vec<String> {
    let mut values = Vec::new();
    let mut push = |item: &Value| match item {
        Value::Array(items) => values.extend(items.iter().filter_map(text)),
        other => values.extend(text(other)),
    };
    match value {
        Value::Object(map) => map.values().for_each(&mut push),
        other => push(other),
    }
    values
}

fn website_label(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) => first_text(value, &["label", "text", "title"]),
        other => text(other),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
