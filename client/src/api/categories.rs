//! Category endpoints.

use crate::api::types::Category;
use crate::error::Error;
use crate::net::dispatcher::ApiClient;

const CATEGORIES_PATH: &str = "/api/categories";

/// Lists all categories.
///
/// # Errors
///
/// Returns [`Error::Api`] / [`Error::Http`] on request failure.
pub async fn list(api: &ApiClient) -> Result<Vec<Category>, Error> {
    api.get_json(CATEGORIES_PATH).await
}
