// src/error.rs
use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the inference backend.
///
/// These never reach the caller as a status code; the relay folds them into
/// the reply text.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("stream interrupted: {0}")]
    Stream(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
