//! CSV export of the final restaurant list.

use std::fs::OpenOptions;
use std::path::Path;

use chrono::SecondsFormat;
use dinercadeau_core::Restaurant;
use serde::Serialize;

pub(crate) const CSV_HEADER: [&str; 16] = [
    "name",
    "url",
    "city",
    "address",
    "postal_code",
    "country",
    "description",
    "tags",
    "price_range",
    "rating",
    "review_count",
    "latitude",
    "longitude",
    "distance_km_from_utrecht",
    "source",
    "scraped_at",
];

/// One output row. Field order matches [`CSV_HEADER`].
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    url: &'a str,
    city: Option<&'a str>,
    address: Option<&'a str>,
    postal_code: Option<&'a str>,
    country: &'a str,
    description: Option<&'a str>,
    tags: String,
    price_range: Option<&'a str>,
    rating: Option<String>,
    review_count: Option<u32>,
    latitude: Option<String>,
    longitude: Option<String>,
    distance_km_from_utrecht: Option<String>,
    source: &'a str,
    scraped_at: String,
}

impl<'a> From<&'a Restaurant> for CsvRow<'a> {
    fn from(r: &'a Restaurant) -> Self {
        Self {
            name: &r.name,
            url: &r.url,
            city: r.city.as_deref(),
            address: r.address.as_deref(),
            postal_code: r.postal_code.as_deref(),
            country: &r.country,
            description: r.description.as_deref(),
            tags: r.tags.join(";"),
            price_range: r.price_range.as_deref(),
            rating: r.rating.map(|v| format!("{v:.2}")),
            review_count: r.review_count,
            latitude: r.latitude.map(|v| format!("{v:.6}")),
            longitude: r.longitude.map(|v| format!("{v:.6}")),
            distance_km_from_utrecht: r.distance_km_from_utrecht.map(|v| format!("{v:.3}")),
            source: &r.source,
            scraped_at: r.scraped_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Writes `restaurants` to `path`, creating parent directories as needed.
///
/// With `append` set and an existing file, rows are added after the current
/// content and no header is written. Otherwise the file is truncated and
/// starts with [`CSV_HEADER`]. Returns the number of rows written.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or a row
/// cannot be written.
pub(crate) fn write_csv(
    restaurants: &[Restaurant],
    path: &Path,
    append: bool,
) -> anyhow::Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let appending = append && path.exists();
    let file = if appending {
        OpenOptions::new().append(true).open(path)?
    } else {
        std::fs::File::create(path)?
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if !appending {
        writer.write_record(CSV_HEADER)?;
    }
    for restaurant in restaurants {
        writer.serialize(CsvRow::from(restaurant))?;
    }
    writer.flush()?;

    tracing::info!(
        rows = restaurants.len(),
        path = %path.display(),
        appending,
        "wrote restaurants to csv"
    );
    Ok(restaurants.len())
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
