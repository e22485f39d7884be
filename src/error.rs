//! Custom error types for the portstream crate.

use std::path::PathBuf;

use thiserror::Error;

/// Custom error type covering every portstream operation.
#[derive(Error, Debug)]
pub enum Error {
    /// The source file could not be opened or read.
    #[error("failed to read file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ports file is not framed as a top-level JSON object.
    #[error("malformed ports file: {0}")]
    Format(String),

    /// A single port value failed to decode; carries the container key.
    #[error("error on decoding port with id '{key}': {source}")]
    Record {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A batch delivery was rejected by the sink.
    #[error("bulk upsert failed: {0}")]
    Sink(String),

    /// A lookup against a remote store failed.
    #[error("failed to get port: {0}")]
    Lookup(String),

    /// HTTP transport error while talking to a remote store.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Lookup miss.
    #[error("port not found")]
    PortNotFound,

    /// Config error.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP server error.
    #[error("server error: {0}")]
    Server(String),
}

/// A specialized `Result` type for portstream operations.
pub type Result<T> = std::result::Result<T, Error>;
