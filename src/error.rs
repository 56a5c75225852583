//! Error taxonomy shared by every layer of the bot.
//!
//! Remote failures are split into the three categories the retry policy
//! cares about: rate limiting (wait and retry without consuming an attempt),
//! other remote failures (retry with linear backoff) and everything else
//! (propagate immediately).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No token has ever been persisted.
    #[error("not authenticated, run `releasebot auth` first")]
    Unauthenticated,

    #[error("failed to refresh access token: {0}")]
    TokenRefresh(String),

    /// The one-time authorization code flow did not complete.
    #[error("authorization failed: {0}")]
    Authorization(String),

    #[error("rate limited by Spotify, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("Spotify responded with {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("\"{label}\" failed after {attempts} attempt(s): {source}")]
    Exhausted {
        label: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    Precondition(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn precondition(message: impl Into<String>) -> Self {
        Error::Precondition(message.into())
    }

    /// Whether the retry policy may try the operation again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::RateLimited { .. } | Error::Api { .. } | Error::Http(_)
        )
    }

    /// Errors that end the whole operation, even inside per-artist
    /// isolation: without credentials no later artist can succeed either.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Unauthenticated | Error::TokenRefresh(_) | Error::Config(_)
        )
    }

    /// HTTP status of the underlying remote failure, looking through
    /// exhausted retries.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::RateLimited { .. } => Some(429),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            Error::Exhausted { source, .. } => source.status(),
            _ => None,
        }
    }
}
