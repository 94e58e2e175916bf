//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! together with the request/response bodies built around them.

/// Admin credential model
pub mod admin;
/// Blog photo model
pub mod photo;
