//! Unified error types for the crawl browser.

use thiserror::Error;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Request layer error.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the request layer that are not modeled service errors.
///
/// A non-success HTTP status is *not* one of these: it resolves to
/// [`ApiResponse::Failure`](crate::client::ApiResponse::Failure).
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network-level failure (DNS, connection refused/reset, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response whose body did not match the expected shape.
    #[error("malformed {endpoint} response: {source}")]
    Decode {
        /// Endpoint that produced the body.
        endpoint: &'static str,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The request URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A path parameter that cannot be represented as a URL segment.
    #[error("invalid path segment: {0:?}")]
    InvalidPathSegment(String),

    /// The call was cancelled before it produced a result.
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Whether this error is the result of an explicit cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}
