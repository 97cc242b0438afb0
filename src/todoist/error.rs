//! Error taxonomy for the remote task service boundary.

use thiserror::Error;

/// Errors surfaced by [`super::TaskService`] implementations and
/// propagated unchanged through the store to the caller.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or rejected bearer credential. Never retried
    /// automatically; the user has to re-authenticate.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The remote does not recognize this id. A later refetch drops
    /// any stale cache entry.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote is throttling us.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other non-success response from the remote.
    #[error("service error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure; safe to retry manually.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote answered with a body we could not decode.
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rejected before any remote call was made.
    #[error("validation error: {0}")]
    Validation(String),
}

impl ServiceError {
    /// Map a non-success HTTP status and response body onto the
    /// taxonomy.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Unauthorized(body),
            404 => Self::NotFound(body),
            429 => Self::RateLimited(body),
            status => Self::Api {
                status,
                message: body,
            },
        }
    }
}
