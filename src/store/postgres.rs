//! PostgreSQL implementation of the store traits.

use async_trait::async_trait;

use super::{AdminStore, PhotoStore};
use crate::{
    db::DbPool,
    models::{
        admin::Admin,
        photo::{NewPhoto, Photo, PhotoChanges},
    },
};

const PHOTO_COLUMNS: &str =
    "id, title, description, date, day, image_url, public_id, created_at, updated_at";

/// Store backed by the shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for PgStore {
    async fn any_exists(&self) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM admins)")
            .fetch_one(&self.pool)
            .await
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<Admin, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            "SELECT id, username, password, created_at FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            "SELECT id, username, password, created_at FROM admins WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[async_trait]
impl PhotoStore for PgStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Photo>, sqlx::Error> {
        sqlx::query_as::<_, Photo>(&format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_all_newest_first(&self) -> Result<Vec<Photo>, sqlx::Error> {
        // id breaks ties between rows created in the same instant
        sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn insert(&self, photo: NewPhoto) -> Result<Photo, sqlx::Error> {
        sqlx::query_as::<_, Photo>(&format!(
            r#"
            INSERT INTO photos (title, description, date, day, image_url, public_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PHOTO_COLUMNS}
            "#
        ))
        .bind(photo.title)
        .bind(photo.description)
        .bind(photo.date)
        .bind(photo.day)
        .bind(photo.image_url)
        .bind(photo.public_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update(&self, id: i32, changes: PhotoChanges) -> Result<Option<Photo>, sqlx::Error> {
        // image_url and public_id are immutable after insert
        sqlx::query_as::<_, Photo>(&format!(
            r#"
            UPDATE photos
            SET title = $1,
                description = $2,
                date = $3,
                day = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING {PHOTO_COLUMNS}
            "#
        ))
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.date)
        .bind(changes.day)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete(&self, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
