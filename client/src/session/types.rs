//! Session data model.
//!
//! DESIGN
//! ======
//! A session is all-or-nothing: `Session` requires user, access token, and
//! refresh token, and "logged out" is `Option::None`; partial state can
//! neither be persisted nor observed. Replacing the access token in place
//! goes through [`Session::with_access_token`], which leaves the user and
//! refresh token untouched by construction.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Identity record owned by the remote API; carried as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque user identifier as issued by the API.
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unique handle.
    pub username: String,
    /// Account email address.
    pub email: String,
    /// Profile image reference (absolute URL or upload filename).
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// The unit of authentication state: who is logged in and with what
/// credentials. Matches the login endpoint's response payload and the
/// persisted record byte-for-byte.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    /// Short-lived bearer credential attached to every authenticated request.
    pub access_token: String,
    /// Longer-lived credential used only to mint new access tokens.
    pub refresh_token: String,
}

impl Session {
    /// Returns this session with the access token replaced; user and refresh
    /// token are preserved.
    #[must_use]
    pub fn with_access_token(mut self, access_token: String) -> Self {
        self.access_token = access_token;
        self
    }
}
