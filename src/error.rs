//! Error types for the catalog, the local store and the audio backend.

use thiserror::Error;

/// Errors raised while listing or resolving tracks.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No credentials, or the provider rejected them.
    #[error("not authenticated with the catalog provider")]
    NotAuthenticated,

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("catalog API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The provider answered with something we could not understand.
    #[error("unexpected catalog response: {0}")]
    Decode(String),

    /// Required catalog settings are missing.
    #[error("catalog is not configured: {0}")]
    Config(String),

    /// Local folder could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the local key/value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid playlist name")]
    InvalidName,

    #[error("playlist not found: {0}")]
    PlaylistNotFound(String),
}

/// Errors raised by the audio backend while loading or driving a source.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {0}")]
    Decode(String),

    #[error("no audio output device: {0}")]
    Output(String),

    #[error("seek failed: {0}")]
    Seek(String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
