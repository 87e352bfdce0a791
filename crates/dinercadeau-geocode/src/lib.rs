pub mod client;
pub mod distance;
pub mod error;
pub mod types;

pub use client::NominatimGeocoder;
pub use distance::{distance_from_utrecht_km, haversine_km};
pub use error::GeocodeError;
pub use types::GeocodeResult;
