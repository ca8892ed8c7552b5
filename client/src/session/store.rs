//! Durable credential persistence.
//!
//! TRADE-OFFS
//! ==========
//! Corrupt or missing data on disk is "no session", never an error: the
//! worst outcome of a mangled file is a fresh login prompt. Saves go
//! through a temp file and rename so a crash mid-write cannot leave a
//! half-record for the next load to choke on.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::session::types::Session;

/// File-backed store holding at most one [`Session`] record.
///
/// The store exclusively owns the persisted copy; the reactive
/// [`crate::AuthState`] projection layers on top of it and is the view the
/// rest of the application consumes.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the persisted session, or `None` when the file is missing or
    /// fails to parse.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "stored session unreadable; treating as logged out");
                None
            }
        }
    }

    /// Overwrites the persisted session atomically.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] when the record cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(session)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Removes the persisted session. Removing an already-empty store is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] when the record exists but cannot be removed.
    pub fn clear(&self) -> Result<(), Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(Error::Store(error)),
        }
    }
}
