//! Admin authentication service.
//!
//! This service handles:
//! - One-time admin initialisation gated by a shared secret
//! - Login with a uniform failure message
//! - Resolving a bearer token back to an admin
//!
//! Password hashing is CPU bound and runs on the blocking pool.

use chrono::Utc;

use crate::{
    error::AppError,
    models::admin::{Admin, AdminSummary, LoginResponse},
    services::{crypto, token},
    state::AuthSettings,
    store::AdminStore,
};

/// Create the single admin account.
///
/// # Process
///
/// 1. Check the shared secret (401 on mismatch)
/// 2. Refuse if any admin already exists (409)
/// 3. Validate username and password are non-empty (400)
/// 4. Hash the password and insert the row
///
/// A unique violation from a concurrent initialisation is reported as 409 too.
///
/// # Arguments
///
/// * `admins` - admin store
/// * `settings` - shared secret and password hasher
/// * `username`, `password` - the new account's credentials
/// * `secret_key` - caller-supplied shared secret
///
/// # Errors
///
/// - `Unauthorized`: wrong or missing shared secret
/// - `Conflict`: an admin already exists
/// - `BadRequest`: blank username or empty password
/// - `Internal`: hashing failed
pub async fn init_admin(
    admins: &dyn AdminStore,
    settings: &AuthSettings,
    username: String,
    password: String,
    secret_key: &str,
) -> Result<i32, AppError> {
    if !crypto::secrets_match(secret_key, &settings.admin_secret_key) {
        return Err(AppError::Unauthorized("Unauthorized: Invalid secret key"));
    }

    if admins.any_exists().await? {
        return Err(AppError::Conflict("Admin already initialized".to_string()));
    }

    let username = username.trim().to_string();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let hasher = settings.hasher.clone();
    let password_hash =
        tokio::task::spawn_blocking(move || crypto::hash_password(&hasher, &password))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))?;

    let admin = match admins.insert(&username, &password_hash).await {
        Ok(admin) => admin,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(AppError::Conflict("Admin already initialized".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(admin_id = admin.id, "admin account initialised");
    Ok(admin.id)
}

/// Verify credentials and issue a session token.
///
/// An unknown username and a wrong password produce the same
/// `InvalidCredentials` error, and both run one argon2 verification: unknown
/// usernames are checked against `AuthSettings::decoy_hash`.
///
/// # Errors
///
/// - `InvalidCredentials`: unknown username or wrong password
/// - `Database`: the lookup failed
/// - `Internal`: the hashing task or token signing failed
pub async fn login(
    admins: &dyn AdminStore,
    settings: &AuthSettings,
    username: &str,
    password: String,
) -> Result<LoginResponse, AppError> {
    let admin = admins.find_by_username(username.trim()).await?;

    let hasher = settings.hasher.clone();
    let stored_hash = match &admin {
        Some(admin) => admin.password_hash.clone(),
        None => settings.decoy_hash.clone(),
    };
    let valid = tokio::task::spawn_blocking(move || {
        crypto::verify_password(&hasher, &password, &stored_hash)
    })
    .await
    .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))?;

    let admin = match admin {
        Some(admin) if valid => admin,
        _ => return Err(AppError::InvalidCredentials),
    };

    let token = token::issue_token(admin.id, &settings.jwt_secret, Utc::now())
        .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))?;

    tracing::info!(admin_id = admin.id, "admin logged in");

    Ok(LoginResponse {
        message: "Login successful",
        token,
        admin: AdminSummary::from(admin),
    })
}

/// Resolve a bearer token to the admin it was issued for.
///
/// Bad signatures, expired tokens and tokens for admins that no longer exist
/// are all `Unauthorized`.
pub async fn authenticate(
    admins: &dyn AdminStore,
    settings: &AuthSettings,
    bearer: &str,
) -> Result<Admin, AppError> {
    let claims = token::verify_token(bearer, &settings.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        AppError::Unauthorized("Unauthorized: Invalid token")
    })?;

    admins
        .find_by_id(claims.id)
        .await?
        .ok_or(AppError::Unauthorized("Unauthorized: Invalid token"))
}
