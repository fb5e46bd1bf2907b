//! Error types for the rate service.

use crate::domain::Pair;

/// Failures while resolving a rate from the provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    /// Unknown code, or the provider body had no numeric rate for it.
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    #[error("Network failure: {0}")]
    Network(String),
}

/// Failures while storing a rendered graph and obtaining its URL.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Upload rejected: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("Upload response did not contain a URL")]
    MissingUrl,
}

/// Application-level errors, reported to the caller as "no result".
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("No result for {pair}: {source}")]
    NoResult {
        pair: Pair,
        #[source]
        source: RateError,
    },

    #[error("Render error: {0}")]
    Render(String),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl AppError {
    pub fn no_result(pair: &Pair, source: RateError) -> Self {
        AppError::NoResult {
            pair: pair.clone(),
            source,
        }
    }
}
