//! HTTP middleware components.
//!
//! Middleware run before route handlers and can short-circuit a request,
//! e.g. reject it as unauthorized.

/// Bearer token authentication middleware
pub mod auth;
