//! Error types for the admin API client.

use thiserror::Error;

/// Result type alias using [`ClientError`].
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur when talking to the admin API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client construction or base URL problem.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// Authentication failure (401 or token endpoint problem).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Resource not found (404) where one was required.
    #[error("not found: {0}")]
    NotFound(String),

    /// Conflict (409), typically a natural-key collision.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded (429).
    #[error("rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Response body did not parse as the expected representation.
    #[error("response parse error: {0}")]
    Parse(String),

    /// Any other non-success status from the admin API.
    #[error("admin API error: HTTP {status}: {detail}")]
    Api { status: u16, detail: String },

    /// Underlying HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL construction error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}
