use thiserror::Error;

/// failures raised by the quote store, the category index and the reconciler.
///
/// none of these are fatal: callers keep the previous state and tell the user.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// a required field was missing or blank.
    #[error("validation error: {0}")]
    Validation(String),

    /// the remote source could not be reached, timed out or answered with an error status.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// persisted, imported or fetched data was not valid json.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, QuoteError>;
