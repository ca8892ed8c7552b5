//! Client error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! The session layer only ever intervenes on 401; every other failure is
//! surfaced here untouched so callers own the user-visible messaging.
//! `SessionExpired` is terminal: by the time a caller sees it, the
//! credential store and auth projection have already been cleared.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Errors produced by the Inkwell API client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status} for {path}: {message}")]
    Api {
        status: u16,
        path: String,
        message: String,
    },
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("credential store I/O failed: {0}")]
    Store(#[from] std::io::Error),
    #[error("session expired; a new login is required")]
    SessionExpired,
}

impl Error {
    pub(crate) fn api(status: u16, path: &str, message: String) -> Self {
        Self::Api {
            status,
            path: path.to_owned(),
            message,
        }
    }

    /// True when the server rejected the request as unauthorized (401).
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}
