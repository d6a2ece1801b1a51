use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported request: {0}")]
    UnsupportedRequest(String),

    #[error("{0}")]
    Other(String),
}

/// Why a page summary could not be acquired for a tab.
///
/// Serialized as the snake_case tag the presentation layer expects.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionError {
    #[error("page cannot be inspected")]
    UnsupportedUrl,
    #[error("page inspector did not respond")]
    NoResponse,
    #[error("page extraction failed")]
    ExtractFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("no debugging target for tab {0}")]
    NoTarget(i64),

    #[error("debugging session failed for tab {tab_id}: {detail}")]
    Session { tab_id: i64, detail: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    #[error("process sampler unavailable: {0}")]
    Unavailable(String),
}
