//! Wire DTOs for the content endpoints.
//!
//! DESIGN
//! ======
//! Response shapes are decoded into explicit types so a contract drift
//! fails fast as a decode error instead of silently flowing as loose JSON.
//! Identifiers are opaque strings owned by the API (Mongo-style `_id`
//! accepted everywhere), and author records are carried as passthrough
//! values; their shape belongs to the server.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// A published blog post.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Cover image reference (absolute URL or upload filename).
    #[serde(default)]
    pub image: Option<String>,
    /// Author record as served by the API; passthrough.
    #[serde(default)]
    pub author: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A comment on a blog post.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(alias = "_id")]
    pub id: String,
    pub comment: String,
    /// Author record as served by the API; passthrough.
    #[serde(default)]
    pub author: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A blog category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
}

/// An in-memory file destined for a multipart upload (profile picture or
/// blog cover image).
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Wraps raw bytes, inferring the MIME type from the file extension.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = guess_mime(&file_name).to_owned();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Reads a file from disk.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be read.
    pub fn from_path(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }

    /// Multipart part for this file. Falls back to an untyped part when the
    /// MIME string is not parseable (guessed types always are).
    #[must_use]
    pub(crate) fn part(&self) -> reqwest::multipart::Part {
        let part = reqwest::multipart::Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone());
        match part.mime_str(&self.mime) {
            Ok(part) => part,
            Err(_) => reqwest::multipart::Part::bytes(self.bytes.clone())
                .file_name(self.file_name.clone()),
        }
    }
}

/// MIME type for the image formats the platform accepts; everything else is
/// an opaque octet stream.
fn guess_mime(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
