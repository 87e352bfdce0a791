//! Recovery of the restaurant dataset from the site's compiled JavaScript.
//!
//! The dataset ships as a JSON module inside a lazily loaded webpack chunk.
//! Finding it takes three downloads: the page bundle names the module and
//! chunk ids, the runtime bundle maps the chunk id to its content hash, and
//! the chunk itself holds the data as a `JSON.parse('...')` string literal.

mod cache;
mod chunk;
mod chunk_hash;
mod discovery;
mod lexer;
mod module_map;
pub(crate) mod scanner;

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;

use crate::client::fetch_asset;
use crate::error::ExtractError;

pub use cache::{AssetCache, CacheStats};
pub use dinercadeau_core::BundleSettings;
pub use discovery::BundleAssets;
pub(crate) use discovery::discover_assets;

/// Where a dataset file lives in the compiled bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetReference {
    pub module_id: u64,
    pub chunk_id: u64,
}

/// Data file name (e.g. `./restaurants.json`) to its module and chunk.
pub type ModuleMap = HashMap<String, AssetReference>;

/// Chunk id to content hash.
pub type ChunkHashMap = HashMap<u64, String>;

/// Undecoded dataset records.
pub type Dataset = Vec<serde_json::Value>;

/// Returns the dataset referenced by `assets`, from the cache when possible.
///
/// Intermediate maps are cached per asset URL as soon as they parse. Callers
/// invalidate both bundle URLs when this fails, since a cached map may be
/// the stale part.
///
/// # Errors
///
/// Returns any [`ExtractError`] from downloading or parsing the three assets.
pub(crate) async fn resolve_dataset(
    client: &Client,
    cache: &AssetCache,
    settings: &BundleSettings,
    assets: &BundleAssets,
) -> Result<Arc<Dataset>, ExtractError> {
    let page_bundle_url = assets.page_bundle_url.as_str();
    if let Some(dataset) = cache.dataset(page_bundle_url) {
        tracing::debug!(url = page_bundle_url, "dataset served from cache");
        return Ok(dataset);
    }

    let module_map = match cache.module_map(page_bundle_url) {
        Some(map) => map,
        None => {
            let source = fetch_asset(client, page_bundle_url).await?;
            let map = module_map::parse_module_map(&source, &settings.dataset_key, page_bundle_url)?;
            cache.insert_module_map(page_bundle_url, map)
        }
    };
    let reference =
        module_map::lookup_reference(&module_map, &settings.dataset_key, page_bundle_url)?;

    let runtime_url = assets.runtime_url.as_str();
    let chunk_hashes = match cache.chunk_hashes(runtime_url) {
        Some(map) => map,
        None => {
            let source = fetch_asset(client, runtime_url).await?;
            let map =
                chunk_hash::parse_chunk_hashes(&source, &settings.chunk_hash_marker, runtime_url)?;
            cache.insert_chunk_hashes(runtime_url, map)
        }
    };
    let hash = chunk_hash::lookup_hash(&chunk_hashes, reference.chunk_id, runtime_url)?;

    let chunk_url = chunk_hash::chunk_url(runtime_url, hash)?;
    let source = fetch_asset(client, &chunk_url).await?;
    let dataset = chunk::parse_dataset_chunk(&source, reference.module_id, &chunk_url)?;

    tracing::info!(
        chunk_url = %chunk_url,
        module_id = reference.module_id,
        records = dataset.len(),
        "resolved bundle dataset"
    );
    Ok(cache.insert_dataset(page_bundle_url, dataset))
}
