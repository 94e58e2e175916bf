//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Extracts request data (JSON body, multipart form, URL params)
//! 2. Calls into a service
//! 3. Shapes the JSON response and status code

/// Admin initialisation and login
pub mod auth;
/// Liveness check
pub mod health;
/// Photo CRUD endpoints
pub mod photos;
