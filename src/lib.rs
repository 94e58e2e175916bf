//! Photo blog backend.
//!
//! A REST API serving a photo blog: anyone can browse photos, a single admin
//! can upload, edit and delete them.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, behind the `store` traits
//! - **Images**: hosted on Cloudinary, behind the `storage` trait
//! - **Authentication**: argon2 password hashes, HS256 JWT bearer tokens
//! - **Format**: JSON requests/responses, multipart for uploads

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;
pub mod state;
pub mod storage;
pub mod store;

pub use error::AppError;
pub use router::router;
pub use state::{AppState, AuthSettings};
