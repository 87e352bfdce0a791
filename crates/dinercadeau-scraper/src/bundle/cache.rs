//! Memoized bundle resolution results.
//!
//! Every entry is keyed by the absolute asset URL it was resolved from, not by
//! listing page, so paging through one listing reuses the same work. Entries
//! never expire on their own: hosts that outlive a site deployment must call
//! [`AssetCache::clear`] or one of the `invalidate_*` methods.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ChunkHashMap, Dataset, ModuleMap};

/// Cache shared by all extractions of one [`crate::RestaurantExtractor`].
///
/// Each map has its own lock. Locks are never held across a download, so two
/// overlapping extractions may both resolve the same URL; the later insert
/// simply replaces the earlier one.
#[derive(Debug, Default)]
pub struct AssetCache {
    module_maps: Mutex<HashMap<String, Arc<ModuleMap>>>,
    chunk_hashes: Mutex<HashMap<String, Arc<ChunkHashMap>>>,
    datasets: Mutex<HashMap<String, Arc<Dataset>>>,
}

/// Entry counts, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub module_maps: usize,
    pub chunk_hashes: usize,
    pub datasets: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Entries are inserted whole, so a poisoned map is still consistent.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AssetCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Module reference map parsed from the page bundle at `page_bundle_url`.
    #[must_use]
    pub fn module_map(&self, page_bundle_url: &str) -> Option<Arc<ModuleMap>> {
        lock(&self.module_maps).get(page_bundle_url).cloned()
    }

    pub fn insert_module_map(&self, page_bundle_url: &str, map: ModuleMap) -> Arc<ModuleMap> {
        let map = Arc::new(map);
        lock(&self.module_maps).insert(page_bundle_url.to_string(), Arc::clone(&map));
        map
    }

    /// Chunk hash map parsed from the runtime bundle at `runtime_url`.
    #[must_use]
    pub fn chunk_hashes(&self, runtime_url: &str) -> Option<Arc<ChunkHashMap>> {
        lock(&self.chunk_hashes).get(runtime_url).cloned()
    }

    pub fn insert_chunk_hashes(&self, runtime_url: &str, map: ChunkHashMap) -> Arc<ChunkHashMap> {
        let map = Arc::new(map);
        lock(&self.chunk_hashes).insert(runtime_url.to_string(), Arc::clone(&map));
        map
    }

    /// Decoded dataset, keyed by the page bundle that referenced it.
    #[must_use]
    pub fn dataset(&self, page_bundle_url: &str) -> Option<Arc<Dataset>> {
        lock(&self.datasets).get(page_bundle_url).cloned()
    }

    pub fn insert_dataset(&self, page_bundle_url: &str, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        lock(&self.datasets).insert(page_bundle_url.to_string(), Arc::clone(&dataset));
        dataset
    }

    /// Drops everything derived from the page bundle at `page_bundle_url`.
    pub fn invalidate_page_bundle(&self, page_bundle_url: &str) {
        lock(&self.module_maps).remove(page_bundle_url);
        lock(&self.datasets).remove(page_bundle_url);
    }

    /// Drops the chunk hash map parsed from `runtime_url`.
    pub fn invalidate_runtime_bundle(&self, runtime_url: &str) {
        lock(&self.chunk_hashes).remove(runtime_url);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        lock(&self.module_maps).clear();
        lock(&self.chunk_hashes).clear();
        lock(&self.datasets).clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            module_maps: lock(&self.module_maps).len(),
            chunk_hashes: lock(&self.chunk_hashes).len(),
            datasets: lock(&self.datasets).len(),
        }
    }
}
