//! Data access.
//!
//! Handlers and services only see these traits; `PgStore` implements both on
//! top of the shared sqlx pool. Every call goes to the database, nothing is
//! cached in process.

pub mod postgres;

pub use postgres::PgStore;

use async_trait::async_trait;

use crate::models::{
    admin::Admin,
    photo::{NewPhoto, Photo, PhotoChanges},
};

/// Storage for admin credentials.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Whether any admin row exists at all.
    async fn any_exists(&self) -> Result<bool, sqlx::Error>;

    /// Insert an admin. Fails with a unique violation if the username is taken.
    async fn insert(&self, username: &str, password_hash: &str) -> Result<Admin, sqlx::Error>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, sqlx::Error>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Admin>, sqlx::Error>;
}

/// Storage for photo rows.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Photo>, sqlx::Error>;

    /// All photos, most recently created first.
    async fn find_all_newest_first(&self) -> Result<Vec<Photo>, sqlx::Error>;

    async fn insert(&self, photo: NewPhoto) -> Result<Photo, sqlx::Error>;

    /// Overwrite the mutable columns of a photo and bump `updated_at`.
    /// Returns `None` if no such photo exists.
    async fn update(&self, id: i32, changes: PhotoChanges) -> Result<Option<Photo>, sqlx::Error>;

    /// Returns whether a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, sqlx::Error>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), sqlx::Error>;
}
