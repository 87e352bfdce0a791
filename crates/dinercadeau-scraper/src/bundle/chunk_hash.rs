//! Chunk hash map inside the runtime bundle.
//!
//! The webpack runtime builds chunk file names with an expression like
//! `n.p+""+{6:"2f9c1a0",7:"a41be6d"}[e]+".js"`. The object is executable
//! syntax with bare integer keys, so it is parsed with a narrow grammar rather
//! than as JSON.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use super::scanner::balanced_object;
use super::ChunkHashMap;
use crate::error::ExtractError;

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(\d+)\s*:\s*(?:"([^"\\]*)"|'([^'\\]*)')\s*$"#).expect("valid regex")
});

/// Parses the chunk hash object that follows `marker`.
///
/// # Errors
///
/// - [`ExtractError::ChunkHashMapNotFound`] if the marker, or a `{` after it,
///   is absent.
/// - [`ExtractError::UnbalancedDelimiters`] if the object never closes.
/// - [`ExtractError::MalformedChunkMap`] if an entry is not
///   `<integer>:<quoted hash>`.
pub(crate) fn parse_chunk_hashes(
    source: &str,
    marker: &str,
    url: &str,
) -> Result<ChunkHashMap, ExtractError> {
    let marker_pos = source
        .find(marker)
        .ok_or_else(|| ExtractError::ChunkHashMapNotFound {
            url: url.to_owned(),
            reason: format!("marker {marker:?} absent"),
        })?;
    let open = source[marker_pos..]
        .find('{')
        .map(|rel| marker_pos + rel)
        .ok_or_else(|| ExtractError::ChunkHashMapNotFound {
            url: url.to_owned(),
            reason: "no object literal after marker".to_string(),
        })?;

    let literal = balanced_object(source, open)?;
    let body = &literal[1..literal.len() - 1];

    let mut map = ChunkHashMap::new();
    for entry in body.split(',') {
        // Trailing commas are legal in object literals.
        if entry.trim().is_empty() {
            continue;
        }
        let (chunk_id, hash) = parse_entry(entry).ok_or_else(|| ExtractError::MalformedChunkMap {
            url: url.to_owned(),
            entry: entry.trim().to_string(),
        })?;
        map.insert(chunk_id, hash);
    }

    tracing::debug!(url, entries = map.len(), "parsed chunk hash map");
    Ok(map)
}

fn parse_entry(entry: &str) -> Option<(u64, String)> {
    let caps = ENTRY_RE.captures(entry)?;
    let chunk_id = caps.get(1)?.as_str().parse().ok()?;
    let hash = caps.get(2).or_else(|| caps.get(3))?.as_str();
    if hash.is_empty() {
        return None;
    }
    Some((chunk_id, hash.to_string()))
}

/// Looks up the hash for `chunk_id`.
///
/// # Errors
///
/// Returns [`ExtractError::ChunkHashMapNotFound`] if the chunk is not listed.
pub(crate) fn lookup_hash<'a>(
    map: &'a ChunkHashMap,
    chunk_id: u64,
    url: &str,
) -> Result<&'a str, ExtractError> {
    map.get(&chunk_id)
        .map(String::as_str)
        .ok_or_else(|| ExtractError::ChunkHashMapNotFound {
            url: url.to_owned(),
            reason: format!("no hash for chunk {chunk_id}"),
        })
}

/// Builds the chunk download URL: `<hash>.js` next to the runtime bundle.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidUrl`] if the runtime URL cannot be parsed.
pub(crate) fn chunk_url(runtime_url: &str, hash: &str) -> Result<String, ExtractError> {
    let invalid = |reason: String| ExtractError::InvalidUrl {
        url: runtime_url.to_owned(),
        reason,
    };
    let base = Url::parse(runtime_url).map_err(|e| invalid(e.to_string()))?;
    let url = base
        .join(&format!("{hash}.js"))
        .map_err(|e| invalid(e.to_string()))?;
    Ok(url.into())
}
