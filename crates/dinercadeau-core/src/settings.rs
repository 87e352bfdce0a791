//! Settings for the listing fetcher, the bundle lookup, the geocoder, and the
//! pipeline.
//!
//! Values are layered: built-in defaults, then an optional settings file
//! (YAML, which also accepts JSON), then `DINERCADEAU_*` environment
//! variables. Command-line flags are applied on top by the binary.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://www.diner-cadeau.nl";
pub const DEFAULT_LIST_PATH: &str = "/restaurant";

/// Utrecht city centre as `(latitude, longitude)`.
pub const UTRECHT_COORDINATES: (f64, f64) = (52.0907, 5.1214);

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "nl-NL,nl;q=0.9,en;q=0.8";

/// Settings that influence how listing pages and bundle assets are fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub base_url: String,
    pub list_path: String,
    /// Locality filter, sent as `plaats` and applied to the bundle dataset.
    pub city: Option<String>,
    pub max_pages: u32,
    /// Records per listing page when slicing the bundle dataset.
    pub page_size: usize,
    #[serde(alias = "request_timeout")]
    pub request_timeout_secs: u64,
    pub pause_seconds: f64,
    pub user_agent: String,
    pub accept_language: String,
    pub extra_headers: BTreeMap<String, String>,
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            list_path: DEFAULT_LIST_PATH.to_string(),
            city: None,
            max_pages: 5,
            page_size: 50,
            request_timeout_secs: 30,
            pause_seconds: 1.0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            extra_headers: BTreeMap::new(),
            max_retries: 2,
            backoff_base_secs: 2,
        }
    }
}

/// Settings for the geocoding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeSettings {
    pub provider_url: String,
    /// Contact address forwarded to Nominatim, as its usage policy asks.
    pub email: Option<String>,
    pub pause_seconds: f64,
    #[serde(alias = "timeout")]
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for GeocodeSettings {
    fn default() -> Self {
        Self {
            provider_url: "https://nominatim.openstreetmap.org/search".to_string(),
            email: None,
            pause_seconds: 1.0,
            timeout_secs: 30,
            user_agent: "dinercadeau-restaurants-index/0.1.0".to_string(),
        }
    }
}

/// Literal markers the bundle lookup searches for.
///
/// They describe the current site build and are the first thing to adjust
/// after a redesign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleSettings {
    /// Substring of the page-specific bundle's `src`.
    pub page_bundle_marker: String,
    /// Substring of the shared runtime bundle's `src`.
    pub runtime_marker: String,
    /// Dataset file name as it appears, quoted, in the page bundle.
    pub dataset_key: String,
    /// Text immediately before the chunk hash object in the runtime bundle.
    pub chunk_hash_marker: String,
}

impl Default for BundleSettings {
    fn default() -> Self {
        Self {
            page_bundle_marker: "pages/restaurant".to_string(),
            runtime_marker: "runtime".to_string(),
            dataset_key: "./restaurants.json".to_string(),
            chunk_hash_marker: "+\"\"+{".to_string(),
        }
    }
}

/// Composite settings for a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub fetch: FetchSettings,
    pub geocode: GeocodeSettings,
    pub bundle: BundleSettings,
    pub output_csv: PathBuf,
    pub append: bool,
    pub include_geocoding: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            geocode: GeocodeSettings::default(),
            bundle: BundleSettings::default(),
            output_csv: PathBuf::from("dinercadeau_restaurants.csv"),
            append: false,
            include_geocoding: true,
        }
    }
}

impl PipelineSettings {
    /// Checks the invariants the fetcher and pipeline rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if self.fetch.base_url.trim().is_empty() {
            return Err(invalid("fetch.base_url", "must not be empty"));
        }
        if self.fetch.max_pages == 0 {
            return Err(invalid("fetch.max_pages", "must be at least 1"));
        }
        if self.fetch.page_size == 0 {
            return Err(invalid("fetch.page_size", "must be at least 1"));
        }
        if !self.fetch.pause_seconds.is_finite() || self.fetch.pause_seconds < 0.0 {
            return Err(invalid("fetch.pause_seconds", "must be a non-negative number"));
        }
        if !self.geocode.pause_seconds.is_finite() || self.geocode.pause_seconds < 0.0 {
            return Err(invalid(
                "geocode.pause_seconds",
                "must be a non-negative number",
            ));
        }
        for (field, value) in [
            ("bundle.page_bundle_marker", &self.bundle.page_bundle_marker),
            ("bundle.runtime_marker", &self.bundle.runtime_marker),
            ("bundle.dataset_key", &self.bundle.dataset_key),
            ("bundle.chunk_hash_marker", &self.bundle.chunk_hash_marker),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }
        Ok(())
    }
}

/// Loads pipeline settings from defaults, an optional file, `.env`, and the
/// process environment.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed, an
/// environment value is malformed, or the result fails validation.
pub fn load_settings(path: Option<&Path>) -> Result<PipelineSettings, ConfigError> {
    dotenvy::dotenv().ok();
    let base = match path {
        Some(path) => load_settings_file(path)?,
        None => PipelineSettings::default(),
    };
    let settings = apply_env_overrides(base, |key| std::env::var(key))?;
    settings.validate()?;
    Ok(settings)
}

/// Reads a settings file. Missing keys keep their defaults.
///
/// # Errors
///
/// Returns [`ConfigError::SettingsFileIo`] or
/// [`ConfigError::SettingsFileParse`].
pub fn load_settings_file(path: &Path) -> Result<PipelineSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SettingsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    // An empty document deserializes to unit; treat it as "all defaults".
    if content.trim().is_empty() {
        return Ok(PipelineSettings::default());
    }

    serde_yaml::from_str(&content).map_err(|e| ConfigError::SettingsFileParse {
        path: path.display().to_string(),
        source: e,
    })
}

/// Applies `DINERCADEAU_*` overrides using the provided lookup function.
///
/// Decoupled from the real environment so tests can pass a map lookup.
pub(crate) fn apply_env_overrides<F>(
    mut settings: PipelineSettings,
    lookup: F,
) -> Result<PipelineSettings, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    fn parse<T>(var: &str, raw: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    }

    let get = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());

    if let Some(v) = get("DINERCADEAU_BASE_URL") {
        settings.fetch.base_url = v;
    }
    if let Some(v) = get("DINERCADEAU_LIST_PATH") {
        settings.fetch.list_path = v;
    }
    if let Some(v) = get("DINERCADEAU_CITY") {
        settings.fetch.city = Some(v);
    }
    if let Some(v) = get("DINERCADEAU_MAX_PAGES") {
        settings.fetch.max_pages = parse("DINERCADEAU_MAX_PAGES", &v)?;
    }
    if let Some(v) = get("DINERCADEAU_PAGE_SIZE") {
        settings.fetch.page_size = parse("DINERCADEAU_PAGE_SIZE", &v)?;
    }
    if let Some(v) = get("DINERCADEAU_REQUEST_TIMEOUT_SECS") {
        settings.fetch.request_timeout_secs = parse("DINERCADEAU_REQUEST_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = get("DINERCADEAU_PAUSE_SECONDS") {
        settings.fetch.pause_seconds = parse("DINERCADEAU_PAUSE_SECONDS", &v)?;
    }
    if let Some(v) = get("DINERCADEAU_USER_AGENT") {
        settings.fetch.user_agent = v;
    }
    if let Some(v) = get("DINERCADEAU_MAX_RETRIES") {
        settings.fetch.max_retries = parse("DINERCADEAU_MAX_RETRIES", &v)?;
    }
    if let Some(v) = get("DINERCADEAU_GEOCODE_URL") {
        settings.geocode.provider_url = v;
    }
    if let Some(v) = get("DINERCADEAU_GEOCODE_EMAIL") {
        settings.geocode.email = Some(v);
    }

    if let Some(v) = get("DINERCADEAU_PAGE_BUNDLE_MARKER") {
        settings.bundle.page_bundle_marker = v;
    }
    if let Some(v) = get("DINERCADEAU_RUNTIME_MARKER") {
        settings.bundle.runtime_marker = v;
    }
    if let Some(v) = get("DINERCADEAU_DATASET_KEY") {
        settings.bundle.dataset_key = v;
    }
    if let Some(v) = get("DINERCADEAU_CHUNK_HASH_MARKER") {
        settings.bundle.chunk_hash_marker = v;
    }

    Ok(settings)
}

/// Returns the absolute URL of a listing page.
///
/// Page 1 carries no `page` parameter; the city, when set, is sent as
/// `plaats`.
#[must_use]
pub fn build_listing_url(settings: &FetchSettings, page: u32) -> String {
    let base = format!(
        "{}/{}",
        settings.base_url.trim_end_matches('/'),
        settings.list_path.trim_start_matches('/')
    );

    let mut query = Vec::new();
    if page > 1 {
        query.push(format!("page={page}"));
    }
    if let Some(city) = settings.city.as_deref().filter(|c| !c.trim().is_empty()) {
        query.push(format!("plaats={}", encode_query_value(city.trim())));
    }

    if query.is_empty() {
        base
    } else {
        format!("{base}?{}", query.join("&"))
    }
}

/// Form-encodes a query value (`application/x-www-form-urlencoded`).
fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                encoded.push(char::from(byte));
            }
            b' ' => encoded.push('+'),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
