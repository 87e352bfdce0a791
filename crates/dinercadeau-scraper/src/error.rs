use thiserror::Error;

/// Errors from the listing-page fetcher.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("listing page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// Errors from the bundle-dataset extraction path.
///
/// None of these reach the pipeline: the extractor logs them and moves on to
/// the fallback strategies.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page does not reference both the page bundle and the runtime bundle")]
    AssetsNotFound,

    #[error("dataset mapping for {dataset_key} not found in {url}")]
    DatasetMappingNotFound { dataset_key: String, url: String },

    #[error("dataset mapping in {url} is not valid JSON: {source}")]
    MalformedMapping {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("chunk hash map not found in {url}: {reason}")]
    ChunkHashMapNotFound { url: String, reason: String },

    #[error("malformed chunk hash entry {entry:?} in {url}")]
    MalformedChunkMap { url: String, entry: String },

    #[error("module {module_id} not found in {url}")]
    ModuleNotFound { module_id: u64, url: String },

    #[error("no JSON string literal near module {module_id} in {url}")]
    JsonLiteralNotFound { module_id: u64, url: String },

    #[error("malformed string literal at offset {offset}: {reason}")]
    MalformedLiteral { offset: usize, reason: String },

    #[error("unbalanced delimiters from offset {offset}")]
    UnbalancedDelimiters { offset: usize },

    #[error("decoded dataset is a JSON {found}, expected an array")]
    DatasetNotAList { found: &'static str },

    #[error("dataset JSON could not be decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}
