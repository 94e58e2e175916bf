//! Application configuration management.
//!
//! Configuration comes from environment variables (optionally seeded from a
//! `.env` file) and is deserialized with `envy` into a type-safe struct.

use std::fmt;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `JWT_SECRET` (required): HMAC key used to sign session tokens
/// - `ADMIN_SECRET_KEY` (required): shared secret gating `/api/init-admin`
/// - `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET`
///   (required): image host account
/// - `PORT` (optional): HTTP server port, defaults to 5000
/// - `CLOUDINARY_FOLDER` (optional): folder uploads land in
/// - `CLOUDINARY_API_BASE` (optional): upload API root, mostly for staging
/// - `MAX_UPLOAD_BYTES` (optional): request body limit for photo uploads
/// - `PASSWORD_HASH_MEMORY_KIB` (optional): argon2 memory cost
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `DATABASE_ACQUIRE_TIMEOUT_SECS` (optional): wait for a pooled
///   connection, defaults to 5
#[derive(Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub admin_secret_key: String,

    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_folder")]
    pub cloudinary_folder: String,

    #[serde(default = "default_api_base")]
    pub cloudinary_api_base: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_password_hash_memory_kib")]
    pub password_hash_memory_kib: u32,

    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_database_acquire_timeout_secs")]
    pub database_acquire_timeout_secs: u64,
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("environment variable {0} must not be empty")]
    Empty(&'static str),
}

fn default_port() -> u16 {
    5000
}

fn default_folder() -> String {
    "noticing_eye_photos".to_string()
}

fn default_api_base() -> String {
    "https://api.cloudinary.com/v1_1/".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// argon2's own default memory cost (19 MiB).
fn default_password_hash_memory_kib() -> u32 {
    19 * 1024
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_database_acquire_timeout_secs() -> u64 {
    5
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is loaded first if present. Missing or empty required
    /// variables are an error, which aborts startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("DATABASE_URL", &self.database_url),
            ("JWT_SECRET", &self.jwt_secret),
            ("ADMIN_SECRET_KEY", &self.admin_secret_key),
            ("CLOUDINARY_CLOUD_NAME", &self.cloudinary_cloud_name),
            ("CLOUDINARY_API_KEY", &self.cloudinary_api_key),
            ("CLOUDINARY_API_SECRET", &self.cloudinary_api_secret),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ConfigError::Empty(name)),
            None => Ok(()),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("admin_secret_key", &"<redacted>")
            .field("cloudinary_cloud_name", &self.cloudinary_cloud_name)
            .field("cloudinary_api_key", &self.cloudinary_api_key)
            .field("cloudinary_api_secret", &"<redacted>")
            .field("port", &self.port)
            .field("cloudinary_folder", &self.cloudinary_folder)
            .field("cloudinary_api_base", &self.cloudinary_api_base)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("password_hash_memory_kib", &self.password_hash_memory_kib)
            .field("database_max_connections", &self.database_max_connections)
            .field(
                "database_acquire_timeout_secs",
                &self.database_acquire_timeout_secs,
            )
            .finish()
    }
}
