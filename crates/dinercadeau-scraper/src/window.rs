//! Locality filter and page window over the raw dataset.

use serde_json::Value;

use crate::normalize::CITY_KEYS;
use crate::value::first_text;

/// Number of records per listing page on the site.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Returns the records for one listing page.
///
/// When `locality` is set, only records whose city equals it
/// case-insensitively, ignoring surrounding whitespace, are kept. The city is
/// read through the same aliases the normalizer uses. Filtering happens
/// before paging. `page` is 1-based; `None` returns every matching
/// record, `Some(0)` is treated as page 1, and a page past the end is empty.
#[must_use]
pub fn select_window<'a>(
    records: &'a [Value],
    locality: Option<&str>,
    page: Option<u32>,
    page_size: usize,
) -> Vec<&'a Value> {
    let wanted = locality
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_lowercase);

    let filtered = records.iter().filter(|record| match &wanted {
        None => true,
        Some(wanted) => {
            first_text(record, CITY_KEYS).is_some_and(|city| city.to_lowercase() == *wanted)
        }
    });

    match page {
        None => filtered.collect(),
        Some(page) => {
            let index = usize::try_from(page.max(1) - 1).unwrap_or(usize::MAX);
            filtered
                .skip(index.saturating_mul(page_size))
                .take(page_size)
                .collect()
        }
    }
}
