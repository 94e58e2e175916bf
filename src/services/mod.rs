//! Business logic services.
//!
//! Services contain the core logic separated from HTTP handlers. They work
//! against the store and storage traits, never against axum types.

pub mod auth_service;
pub mod crypto;
pub mod photo_service;
pub mod token;
