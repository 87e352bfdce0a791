//! Dataset recovery from a downloaded chunk.
//!
//! Webpack stores JSON modules as `512:function(e){e.exports=JSON.parse('[...]')}`
//! inside the chunk's module table.

use serde_json::Value;

use super::lexer::{read_string_literal, unescape_js_string};
use super::Dataset;
use crate::error::ExtractError;

/// How far past the module marker `JSON.parse(` may appear.
const JSON_PARSE_WINDOW: usize = 256;

const JSON_PARSE: &str = "JSON.parse(";

/// Extracts the JSON array embedded in module `module_id`.
///
/// # Errors
///
/// - [`ExtractError::ModuleNotFound`] if no `<id>:` entry is present.
/// - [`ExtractError::JsonLiteralNotFound`] if no `JSON.parse(` call with a
///   string argument follows the marker closely enough.
/// - [`ExtractError::MalformedLiteral`] for lexing or escape failures.
/// - [`ExtractError::Json`] if the unescaped text is not JSON.
/// - [`ExtractError::DatasetNotAList`] if the JSON is not an array.
pub(crate) fn parse_dataset_chunk(
    source: &str,
    module_id: u64,
    url: &str,
) -> Result<Dataset, ExtractError> {
    let body_start =
        find_module(source, module_id).ok_or_else(|| ExtractError::ModuleNotFound {
            module_id,
            url: url.to_owned(),
        })?;

    let literal_not_found = || ExtractError::JsonLiteralNotFound {
        module_id,
        url: url.to_owned(),
    };

    let call = source[body_start..]
        .find(JSON_PARSE)
        .filter(|rel| *rel <= JSON_PARSE_WINDOW)
        .map(|rel| body_start + rel + JSON_PARSE.len())
        .ok_or_else(literal_not_found)?;

    let quote_pos = source[call..]
        .find(|c: char| !c.is_whitespace())
        .map(|rel| call + rel)
        .ok_or_else(literal_not_found)?;
    let quote = source.as_bytes()[quote_pos];
    if quote != b'\'' && quote != b'"' {
        return Err(literal_not_found());
    }

    let literal = read_string_literal(source, quote_pos, quote)?;
    let json = unescape_js_string(literal.raw, quote_pos)?;
    match serde_json::from_str::<Value>(&json)? {
        Value::Array(records) => {
            tracing::debug!(url, module_id, records = records.len(), "decoded dataset");
            Ok(records)
        }
        other => Err(ExtractError::DatasetNotAList {
            found: json_kind(&other),
        }),
    }
}

/// Returns the offset just past `<id>:` for the module table entry `id`.
///
/// The marker must follow `{` or `,` so that `1512:` is not taken for `512:`.
fn find_module(source: &str, module_id: u64) -> Option<usize> {
    let marker = format!("{module_id}:");
    let bytes = source.as_bytes();
    source
        .match_indices(&marker)
        .find(|(pos, _)| *pos > 0 && matches!(bytes[pos - 1], b'{' | b','))
        .map(|(pos, _)| pos + marker.len())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
