//! Error types.

/// Error enumerates the possible Mousetrap error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a [`/api/v1/micetro` request][crate::api] is missing a
    /// `zone` or `name` (or, for additions, `data`). Raised before any backend call is made.
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    /// Returned when a protected endpoint is called without a bearer token that resolves to an
    /// enabled [`Principal`][crate::token_store::Principal].
    #[error("authentication required")]
    AuthenticationRequired,

    /// Returned when a Micetro JSON-RPC response carries an `error` payload. The payload is kept
    /// exactly as the backend sent it.
    #[error("Micetro API error: {0}")]
    BackendProtocol(serde_json::Value),

    /// Returned when the Micetro JSON-RPC endpoint can't be reached, answers with a non-success
    /// HTTP status, or sends a body that isn't a JSON-RPC response.
    #[error("Micetro transport error")]
    Transport(#[from] reqwest::Error),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON fails, e.g. when
    /// [loading a `Config`][crate::config::Config::try_from_file], or when a Micetro `result`
    /// doesn't have the expected shape.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when a loaded [`Config`][crate::config::Config] is missing a required setting.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
