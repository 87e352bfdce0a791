pub mod restaurant;
pub mod settings;

mod error;

pub use error::ConfigError;
pub use restaurant::{merge_tags, normalize_country, Restaurant, DEFAULT_COUNTRY, SOURCE_LABEL};
pub use settings::{
    build_listing_url, load_settings, load_settings_file, BundleSettings, FetchSettings,
    GeocodeSettings, PipelineSettings, DEFAULT_BASE_URL, DEFAULT_LIST_PATH, UTRECHT_COORDINATES,
};
