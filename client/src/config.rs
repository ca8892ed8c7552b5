//! Client configuration: remote base address, transport timeout, and the
//! credential-store location. Values come from the environment with local
//! fallbacks so a dev setup works with zero configuration.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the remote API base address.
pub const BASE_URL_ENV: &str = "INKWELL_BASE_URL";

/// Environment variable overriding the persisted-session file path.
pub const SESSION_FILE_ENV: &str = "INKWELL_SESSION_FILE";

/// Configuration for an [`crate::ApiClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Remote API base address, without a trailing slash.
    pub base_url: String,
    /// Transport-level timeout applied to every request, the refresh call
    /// included, so a hung renewal cannot hold the single-flight gate forever.
    pub timeout: Duration,
    /// Location of the persisted session record.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Fallback API address for local development.
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:5000";

    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Builds a configuration for an explicit base address.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            timeout: Self::DEFAULT_TIMEOUT,
            session_file: default_session_file(),
        }
    }

    /// Builds a configuration from `INKWELL_BASE_URL` / `INKWELL_SESSION_FILE`,
    /// falling back to the local defaults when unset.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var(BASE_URL_ENV).unwrap_or_default();
        let mut config = Self::new(&base_url);
        if let Ok(path) = env::var(SESSION_FILE_ENV) {
            config.session_file = PathBuf::from(path);
        }
        config
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Trim whitespace and trailing slashes; an empty value means "use default".
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        ClientConfig::DEFAULT_BASE_URL.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Session file under the user's config directory, or a working-directory
/// fallback when `HOME` is unset.
fn default_session_file() -> PathBuf {
    match env::var("HOME") {
        Ok(home) => Path::new(&home)
            .join(".config")
            .join("inkwell")
            .join("session.json"),
        Err(_) => PathBuf::from("inkwell-session.json"),
    }
}
