use std::collections::HashMap;
use std::env::VarError;
use std::io::Write;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn defaults_match_site_layout() {
    let settings = PipelineSettings::default();
    assert_eq!(settings.fetch.base_url, "https://www.diner-cadeau.nl");
    assert_eq!(settings.fetch.list_path, "/restaurant");
    assert_eq!(settings.fetch.max_pages, 5);
    assert_eq!(settings.fetch.page_size, 50);
    assert_eq!(settings.fetch.request_timeout_secs, 30);
    assert!(settings.include_geocoding);
    assert!(settings.validate().is_ok());
}

#[test]
fn listing_url_for_first_page_has_no_query() {
    let settings = FetchSettings::default();
    assert_eq!(
        build_listing_url(&settings, 1),
        "https://www.diner-cadeau.nl/restaurant"
    );
}

#[test]
fn listing_url_adds_page_and_city() {
    let settings = FetchSettings {
        city: Some("Den Haag".to_string()),
        ..FetchSettings::default()
    };
    assert_eq!(
        build_listing_url(&settings, 3),
        "https://www.diner-cadeau.nl/restaurant?page=3&plaats=Den+Haag"
    );
}

#[test]
fn listing_url_encodes_non_ascii_city() {
    let settings = FetchSettings {
        base_url: "https://www.diner-cadeau.nl/".to_string(),
        city: Some("Zoeterwoude-Rijndijk".to_string()),
        ..FetchSettings::default()
    };
    assert_eq!(
        build_listing_url(&settings, 1),
        "https://www.diner-cadeau.nl/restaurant?plaats=Zoeterwoude-Rijndijk"
    );

    let settings = FetchSettings {
        city: Some("'s-Hertogenbosch".to_string()),
        ..FetchSettings::default()
    };
    assert_eq!(
        build_listing_url(&settings, 1),
        "https://www.diner-cadeau.nl/restaurant?plaats=%27s-Hertogenbosch"
    );
}

#[test]
fn env_overrides_apply_on_top_of_defaults() {
    let mut map = HashMap::new();
    map.insert("DINERCADEAU_CITY", "Utrecht");
    map.insert("DINERCADEAU_MAX_PAGES", "12");
    map.insert("DINERCADEAU_PAUSE_SECONDS", "0.5");
    map.insert("DINERCADEAU_GEOCODE_EMAIL", "ops@example.com");

    let settings =
        apply_env_overrides(PipelineSettings::default(), lookup_from_map(&map)).unwrap();
    assert_eq!(settings.fetch.city.as_deref(), Some("Utrecht"));
    assert_eq!(settings.fetch.max_pages, 12);
    assert!((settings.fetch.pause_seconds - 0.5).abs() < f64::EPSILON);
    assert_eq!(settings.geocode.email.as_deref(), Some("ops@example.com"));
}

#[test]
fn env_override_with_blank_value_is_ignored() {
    let mut map = HashMap::new();
    map.insert("DINERCADEAU_CITY", "  ");
    let settings =
        apply_env_overrides(PipelineSettings::default(), lookup_from_map(&map)).unwrap();
    assert!(settings.fetch.city.is_none());
}

#[test]
fn env_override_rejects_non_numeric_page_count() {
    let mut map = HashMap::new();
    map.insert("DINERCADEAU_MAX_PAGES", "lots");
    let result = apply_env_overrides(PipelineSettings::default(), lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DINERCADEAU_MAX_PAGES"),
        "expected InvalidEnvVar(DINERCADEAU_MAX_PAGES), got: {result:?}"
    );
}

#[test]
fn validate_rejects_zero_page_size() {
    let mut settings = PipelineSettings::default();
    settings.fetch.page_size = 0;
    assert!(
        matches!(settings.validate(), Err(ConfigError::Validation { ref field, .. }) if field == "fetch.page_size")
    );
}

#[test]
fn settings_file_accepts_json_with_legacy_keys() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"fetch": {{"city": "Amsterdam", "max_pages": 2, "request_timeout": 10}}, "geocode": {{"timeout": 5}}}}"#
    )
    .unwrap();

    let settings = load_settings_file(file.path()).unwrap();
    assert_eq!(settings.fetch.city.as_deref(), Some("Amsterdam"));
    assert_eq!(settings.fetch.max_pages, 2);
    assert_eq!(settings.fetch.request_timeout_secs, 10);
    assert_eq!(settings.geocode.timeout_secs, 5);
    assert_eq!(settings.fetch.base_url, DEFAULT_BASE_URL);
}

#[test]
fn settings_file_accepts_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "include_geocoding: false\nfetch:\n  pause_seconds: 0").unwrap();

    let settings = load_settings_file(file.path()).unwrap();
    assert!(!settings.include_geocoding);
    assert!(settings.fetch.pause_seconds.abs() < f64::EPSILON);
}

#[test]
fn empty_settings_file_yields_defaults() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let settings = load_settings_file(file.path()).unwrap();
    assert_eq!(settings, PipelineSettings::default());
}

#[test]
fn missing_settings_file_is_io_error() {
    let result = load_settings_file(Path::new("/definitely/not/here.json"));
    assert!(matches!(result, Err(ConfigError::SettingsFileIo { .. })));
}

#[test]
fn malformed_settings_file_is_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"fetch": {{"max_pages": "many"}}}}"#).unwrap();
    let result = load_settings_file(file.path());
    assert!(matches!(result, Err(ConfigError::SettingsFileParse { .. })));
}

#[test]
fn settings_file_overrides_bundle_markers() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "bundle:\n  page_bundle_marker: pages/eten\n  dataset_key: ./eetlocaties.json"
    )
    .unwrap();

    let settings = load_settings_file(file.path()).unwrap();
    assert_eq!(settings.bundle.page_bundle_marker, "pages/eten");
    assert_eq!(settings.bundle.dataset_key, "./eetlocaties.json");
    assert_eq!(settings.bundle.runtime_marker, "runtime");
    assert_eq!(settings.bundle.chunk_hash_marker, "+\"\"+{");
}

#[test]
fn env_overrides_bundle_markers() {
    let mut map = HashMap::new();
    map.insert("DINERCADEAU_RUNTIME_MARKER", "webpack-runtime");
    map.insert("DINERCADEAU_CHUNK_HASH_MARKER", "+\".\"+{");

    let settings =
        apply_env_overrides(PipelineSettings::default(), lookup_from_map(&map)).unwrap();
    assert_eq!(settings.bundle.runtime_marker, "webpack-runtime");
    assert_eq!(settings.bundle.chunk_hash_marker, "+\".\"+{");
    assert_eq!(settings.bundle.page_bundle_marker, "pages/restaurant");
}

#[test]
fn validate_rejects_blank_bundle_marker() {
    let mut settings = PipelineSettings::default();
    settings.bundle.dataset_key = " ".to_string();
    assert!(
        matches!(settings.validate(), Err(ConfigError::Validation { ref field, .. }) if field == "bundle.dataset_key")
    );
}
