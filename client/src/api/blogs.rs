//! Blog post endpoints.

#[cfg(test)]
#[path = "blogs_test.rs"]
mod blogs_test;

use crate::api::types::{Blog, FileUpload};
use crate::error::Error;
use crate::net::dispatcher::ApiClient;

const BLOGS_PATH: &str = "/api/blogs";

fn blog_path(id: &str) -> String {
    format!("/api/blogs/{id}")
}

fn user_blogs_path(user_id: &str) -> String {
    format!("/api/blogs/user/{user_id}")
}

/// A post being written or edited. Categories travel as repeated multipart
/// fields; the cover image is optional.
#[derive(Clone, Debug, Default)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    pub categories: Vec<String>,
    pub image: Option<FileUpload>,
}

/// Lists all published posts.
///
/// # Errors
///
/// Returns [`Error::Api`] / [`Error::Http`] on request failure.
pub async fn list(api: &ApiClient) -> Result<Vec<Blog>, Error> {
    api.get_json(BLOGS_PATH).await
}

/// Fetches one post by id.
///
/// # Errors
///
/// Returns [`Error::Api`] with status 404 when the post does not exist.
pub async fn get(api: &ApiClient, id: &str) -> Result<Blog, Error> {
    api.get_json(&blog_path(id)).await
}

/// Lists the posts written by one user.
///
/// # Errors
///
/// Returns [`Error::Api`] / [`Error::Http`] on request failure.
pub async fn by_user(api: &ApiClient, user_id: &str) -> Result<Vec<Blog>, Error> {
    api.get_json(&user_blogs_path(user_id)).await
}

/// Publishes a new post.
///
/// # Errors
///
/// Returns [`Error::Api`] when not authenticated or on validation failure.
pub async fn create(api: &ApiClient, draft: &BlogDraft) -> Result<Blog, Error> {
    api.post_multipart(BLOGS_PATH, || draft_form(draft)).await
}

/// Replaces an existing post's content.
///
/// # Errors
///
/// Returns [`Error::Api`] when the caller does not own the post.
pub async fn update(api: &ApiClient, id: &str, draft: &BlogDraft) -> Result<Blog, Error> {
    api.put_multipart(&blog_path(id), || draft_form(draft)).await
}

/// Deletes a post.
///
/// # Errors
///
/// Returns [`Error::Api`] when the caller does not own the post.
pub async fn delete(api: &ApiClient, id: &str) -> Result<(), Error> {
    api.delete_unit(&blog_path(id)).await
}

fn draft_form(draft: &BlogDraft) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new()
        .text("title", draft.title.clone())
        .text("content", draft.content.clone());
    for category in &draft.categories {
        form = form.text("categories", category.clone());
    }
    if let Some(image) = &draft.image {
        form = form.part("image", image.part());
    }
    form
}
