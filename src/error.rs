//! Error types for the arcade client.

use thiserror::Error;

/// Errors surfaced by the accessors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status. Carries the HTTP status
    /// text so callers can show what the server said.
    #[error("Failed to fetch: {status}")]
    FetchFailed { status: String },

    /// Network failure or a body that did not decode as the expected JSON.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
