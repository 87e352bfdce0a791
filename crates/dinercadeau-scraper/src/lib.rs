pub mod bundle;
pub mod client;
pub mod error;
pub mod extractor;
pub mod listing;
pub mod normalize;
pub mod window;

mod fallback;
mod html;
mod rate_limit;
mod value;

pub use bundle::{AssetCache, AssetReference, BundleAssets, BundleSettings, CacheStats};
pub use client::build_client;
pub use error::{ExtractError, ScraperError};
pub use extractor::{Extraction, ExtractorSettings, ListingRequest, RestaurantExtractor, Strategy};
pub use listing::{ListingFetcher, ListingPage};
pub use normalize::{normalize_record, RawRecord};
pub use window::{select_window, DEFAULT_PAGE_SIZE};
