//! # Error Types
//!
//! One error enum per layer. Configuration and validation errors are fatal
//! for the whole run; draw and job errors only abort the job they occur in.

use thiserror::Error;

/// Configuration could not be read or parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file at the expected location
    #[error("config file not found: {0}")]
    NotFound(String),

    /// The file exists but could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid job description
    #[error("malformed config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A job failed the pre-render parameter check.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("baseimg path err: {0} is missing or not a regular file")]
    MissingBaseImage(String),

    #[error("item {item}: value is empty")]
    EmptyValue { item: usize },

    #[error("item {item}: text item has no font path")]
    MissingFont { item: usize },

    #[error("item {item}: expected 3 rgb components, got {len}")]
    InvalidColor { item: usize, len: usize },

    #[error("item {item}: unknown item type {kind}")]
    UnknownItemKind { item: usize, kind: i64 },
}

/// Drawing a single item failed.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("font error: {0}")]
    FontLoad(String),

    #[error("could not generate QR code: {0}")]
    QrGeneration(String),

    #[error("image error: {0}")]
    ImageLoad(String),

    #[error("unknown item type {0}")]
    UnknownItemKind(i64),

    /// Drawing would allocate an unreasonably large layer
    #[error("layer of {width}x{height} pixels is too large")]
    LayerTooLarge { width: u64, height: u64 },
}

/// A job failed after validation. Caught by the batch runner.
#[derive(Debug, Error)]
pub enum JobError {
    /// The base image could not be decoded
    #[error("failed to load base image {path}: {reason}")]
    BaseImage { path: String, reason: String },

    /// An item failed to render; later items of the job were skipped
    #[error("item {item}: {source}")]
    Render {
        item: usize,
        #[source]
        source: DrawError,
    },

    /// The finished image could not be written
    #[error("failed to save {path}: {reason}")]
    Persist { path: String, reason: String },
}

/// Top-level error returned by the CLI run.
#[derive(Debug, Error)]
pub enum StampError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("files {job} err: {source}")]
    Validation {
        job: usize,
        #[source]
        source: ValidationError,
    },
}
