//! Image hosting.
//!
//! Photo binaries never touch the database: they are pushed to an external
//! image host which hands back a public URL and an identifier used to delete
//! the image later. `ObjectStorage` is the seam the photo service talks to;
//! `CloudinaryStorage` is the production implementation.

pub mod cloudinary;

pub use cloudinary::{CloudinarySettings, CloudinaryStorage};

use async_trait::async_trait;

/// An image received from a client, ready to be uploaded.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Where an uploaded image ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    /// Public (CDN) URL of the image.
    pub url: String,
    /// Identifier to pass to [`ObjectStorage::destroy`].
    pub public_id: String,
}

/// Errors raised by the image host client.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("request to image host failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid image host URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("image host rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected image host response: {0}")]
    Unexpected(String),
}

/// External binary store for photo images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload an image and return its hosted location.
    async fn upload(&self, request: UploadRequest) -> Result<StoredObject, StorageError>;

    /// Delete a previously uploaded image. Deleting an image that is already
    /// gone is not an error.
    async fn destroy(&self, public_id: &str) -> Result<(), StorageError>;
}
