//! Comment endpoints, nested under their blog post.

#[cfg(test)]
#[path = "comments_test.rs"]
mod comments_test;

use crate::api::types::Comment;
use crate::error::Error;
use crate::net::dispatcher::ApiClient;

fn comments_path(blog_id: &str) -> String {
    format!("/api/blogs/{blog_id}/comments")
}

fn comment_path(blog_id: &str, comment_id: &str) -> String {
    format!("/api/blogs/{blog_id}/comments/{comment_id}")
}

/// Lists a post's comments.
///
/// # Errors
///
/// Returns [`Error::Api`] / [`Error::Http`] on request failure.
pub async fn list(api: &ApiClient, blog_id: &str) -> Result<Vec<Comment>, Error> {
    api.get_json(&comments_path(blog_id)).await
}

/// Posts a new comment.
///
/// # Errors
///
/// Returns [`Error::Api`] when not authenticated.
pub async fn post(api: &ApiClient, blog_id: &str, comment: &str) -> Result<(), Error> {
    api.post_unit(&comments_path(blog_id), &serde_json::json!({ "comment": comment }))
        .await
}

/// Edits an existing comment.
///
/// # Errors
///
/// Returns [`Error::Api`] when the caller does not own the comment.
pub async fn edit(
    api: &ApiClient,
    blog_id: &str,
    comment_id: &str,
    comment: &str,
) -> Result<(), Error> {
    api.put_unit(
        &comment_path(blog_id, comment_id),
        &serde_json::json!({ "comment": comment }),
    )
    .await
}

/// Deletes a comment.
///
/// # Errors
///
/// Returns [`Error::Api`] when the caller does not own the comment.
pub async fn delete(api: &ApiClient, blog_id: &str, comment_id: &str) -> Result<(), Error> {
    api.delete_unit(&comment_path(blog_id, comment_id)).await
}
