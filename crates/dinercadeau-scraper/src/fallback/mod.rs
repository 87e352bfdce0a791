//! Weaker extraction strategies used when the bundle dataset is unavailable.
//!
//! Both read only the listing page HTML and never fail: anything that cannot
//! be decoded is skipped.

mod jsonld;
mod payload;

pub(crate) use jsonld::extract_jsonld_restaurants;
pub(crate) use payload::extract_payload_restaurants;
