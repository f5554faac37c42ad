//! Error types for ReaderKit

use thiserror::Error;

/// Errors that can occur during a conversion
#[derive(Debug, Error)]
pub enum ReaderError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A configured CSS selector does not parse
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Upstream did not answer within the stage timeout
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Upstream answered with a non-2xx status
    #[error("Upstream returned HTTP {0}")]
    HttpStatus(u16),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Upstream payload could not be decoded
    #[error("Invalid upstream payload: {0}")]
    InvalidPayload(String),

    /// Stage produced no usable text
    #[error("No content could be extracted")]
    EmptyContent,
}

impl ReaderError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ReaderError::Timeout
        } else if err.is_connect() {
            ReaderError::ConnectError(err)
        } else if let Some(status) = err.status() {
            ReaderError::HttpStatus(status.as_u16())
        } else if err.is_decode() {
            ReaderError::InvalidPayload(err.to_string())
        } else {
            ReaderError::RequestError(err.to_string())
        }
    }

    /// True for caller errors that are never retried
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ReaderError::MissingUrl | ReaderError::InvalidUrlScheme | ReaderError::InvalidUrl(_)
        )
    }

    /// True for network and status failures talking to an upstream
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ReaderError::Timeout
                | ReaderError::ConnectError(_)
                | ReaderError::HttpStatus(_)
                | ReaderError::RequestError(_)
                | ReaderError::InvalidPayload(_)
        )
    }
}
