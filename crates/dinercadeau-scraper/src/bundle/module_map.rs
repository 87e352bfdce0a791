//! Dataset mapping inside the page bundle.
//!
//! The page bundle carries a lazy-import context such as
//! `{"./cities.json":[511,6],"./restaurants.json":[512,7]}` mapping data file
//! names to `[module id, chunk id, ...]`.

use super::scanner::balanced_object;
use super::{AssetReference, ModuleMap};
use crate::error::ExtractError;

/// Parses the mapping object that contains `dataset_key`.
///
/// Every entry whose value starts with two integers becomes an
/// [`AssetReference`]; other entries are ignored.
///
/// # Errors
///
/// - [`ExtractError::DatasetMappingNotFound`] if the quoted key, or an
///   enclosing `{`, is absent.
/// - [`ExtractError::UnbalancedDelimiters`] if the object never closes.
/// - [`ExtractError::MalformedMapping`] if the object is not valid JSON.
pub(crate) fn parse_module_map(
    source: &str,
    dataset_key: &str,
    url: &str,
) -> Result<ModuleMap, ExtractError> {
    let not_found = || ExtractError::DatasetMappingNotFound {
        dataset_key: dataset_key.to_owned(),
        url: url.to_owned(),
    };

    let marker = format!("\"{dataset_key}\"");
    let key_pos = source.find(&marker).ok_or_else(not_found)?;
    let open = source[..key_pos].rfind('{').ok_or_else(not_found)?;
    let literal = balanced_object(source, open)?;

    let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_str(literal)
        .map_err(|e| ExtractError::MalformedMapping {
            url: url.to_owned(),
            source: e,
        })?;

    let map: ModuleMap = entries
        .iter()
        .filter_map(|(name, value)| {
            let parts = value.as_array()?;
            let module_id = parts.first()?.as_u64()?;
            let chunk_id = parts.get(1)?.as_u64()?;
            Some((
                name.clone(),
                AssetReference {
                    module_id,
                    chunk_id,
                },
            ))
        })
        .collect();

    tracing::debug!(url, entries = map.len(), "parsed dataset mapping");
    Ok(map)
}

/// Looks up `dataset_key` in a parsed mapping.
///
/// # Errors
///
/// Returns [`ExtractError::DatasetMappingNotFound`] if the key has no
/// well-formed entry.
pub(crate) fn lookup_reference(
    map: &ModuleMap,
    dataset_key: &str,
    url: &str,
) -> Result<AssetReference, ExtractError> {
    map.get(dataset_key)
        .copied()
        .ok_or_else(|| ExtractError::DatasetMappingNotFound {
            dataset_key: dataset_key.to_owned(),
            url: url.to_owned(),
        })
}
