//! Nominatim response shapes.

use serde::{Deserialize, Serialize};

/// One entry of a Nominatim `format=jsonv2` search response.
///
/// Nominatim serializes coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NominatimPlace {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub display_name: Option<String>,
}

/// A resolved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    /// Provider's display name, or the query when it has none.
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NominatimPlace {
    /// Converts to a [`GeocodeResult`]; `None` when a coordinate is missing or
    /// not a finite number.
    pub(crate) fn into_result(self, query: &str) -> Option<GeocodeResult> {
        let parse = |raw: Option<&str>| {
            raw.and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        let latitude = parse(self.lat.as_deref())?;
        let longitude = parse(self.lon.as_deref())?;
        Some(GeocodeResult {
            address: self
                .display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| query.to_string()),
            latitude,
            longitude,
        })
    }
}
