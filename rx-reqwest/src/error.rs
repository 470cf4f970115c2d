//! Error types for rx-reqwest

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for rx-reqwest operations
pub type Result<T> = std::result::Result<T, RxHttpError>;

/// A failed request.
///
/// Every variant is surfaced to subscribers as-is: the observable layer never
/// retries, wraps or reclassifies them.
#[derive(Error, Debug)]
pub enum RxHttpError {
    /// Transport-level failure reported by reqwest (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response status rejected by `validate_status`
    #[error("Request failed with status code {}", .status.as_u16())]
    Status { status: StatusCode, body: String },

    /// Response body could not be decoded into the requested type
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request body could not be encoded
    #[error("Invalid body: {0}")]
    InvalidBody(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Header name or value rejected by the HTTP layer
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The request was aborted through its signal
    #[error("canceled")]
    Canceled,
}

impl RxHttpError {
    /// Whether this error is the result of an abort
    pub fn is_cancel(&self) -> bool {
        matches!(self, RxHttpError::Canceled)
    }

    /// Status code of the response, when one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RxHttpError::Status { status, .. } => Some(*status),
            RxHttpError::Http(e) => e.status(),
            _ => None,
        }
    }
}
