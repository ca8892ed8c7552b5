//! Public user-profile endpoints.

use crate::error::Error;
use crate::net::dispatcher::ApiClient;
use crate::session::types::User;

fn user_path(id: &str) -> String {
    format!("/api/users/{id}")
}

/// Fetches a user's public profile.
///
/// # Errors
///
/// Returns [`Error::Api`] with status 404 when the user does not exist.
pub async fn get(api: &ApiClient, id: &str) -> Result<User, Error> {
    api.get_json(&user_path(id)).await
}
