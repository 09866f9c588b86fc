//! Error kinds for the explorer core.

use thiserror::Error;

/// Any failure of a single remote fetch. All variants are terminal for the
/// interaction that triggered them; the user retries manually.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned {0}: {1}")]
    Status(u16, String),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid URL: {0}")]
    Url(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

/// Reference-data cache failures.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache store: {0}")]
    Store(#[from] sled::Error),

    #[error("cache value is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("cache encode: {0}")]
    Encode(#[from] serde_json::Error),
}
