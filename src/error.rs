//! Error types
//!
//! Startup errors are fatal and stop the program before the loop starts.
//! Tracker errors are per-tick transients that never leave the tracker.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for setup operations
pub type StartupResult<T> = Result<T, StartupError>;

/// Conditions that abort startup
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("model asset not found: {}", .0.display())]
    MissingModelAsset(PathBuf),

    #[error("no inference backend available for the {0} tracking strategy")]
    MissingBackend(&'static str),

    #[error("failed to load asset {}: {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration loading and validation failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures inside a tracking backend for a single frame
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("malformed detector output: expected a multiple of {row_len} values, got {len}")]
    MalformedOutput { len: usize, row_len: usize },

    #[error("backend already closed")]
    Closed,
}
