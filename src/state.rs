//! Shared application state.
//!
//! Built once in `main` and handed to the router; every handler and the auth
//! middleware receive it through `State<AppState>`. Cloning is cheap.

use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, Version};

use crate::{
    services::crypto,
    storage::ObjectStorage,
    store::{AdminStore, PhotoStore},
};

#[derive(Clone)]
pub struct AppState {
    pub admins: Arc<dyn AdminStore>,
    pub photos: Arc<dyn PhotoStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub auth: Arc<AuthSettings>,
    /// Request body limit for photo uploads, in bytes.
    pub upload_limit: usize,
}

/// Secrets and hashing parameters used by the auth service.
pub struct AuthSettings {
    pub jwt_secret: String,
    pub admin_secret_key: String,
    pub hasher: Argon2<'static>,
    /// Hash of a throwaway password under `hasher`'s parameters. Login checks
    /// unknown usernames against it so they cost as much as a wrong password.
    pub decoy_hash: String,
}

/// Errors raised while building `AuthSettings`.
#[derive(Debug, thiserror::Error)]
pub enum AuthSettingsError {
    #[error("invalid argon2 parameters: {0}")]
    Params(argon2::Error),

    #[error("failed to hash decoy password: {0}")]
    Hash(argon2::password_hash::Error),
}

impl AuthSettings {
    /// Argon2id with the given memory cost and argon2's default iteration
    /// count and parallelism.
    ///
    /// # Errors
    ///
    /// Returns `AuthSettingsError::Params` if `memory_kib` is below argon2's
    /// minimum for the default parallelism.
    pub fn new(
        jwt_secret: impl Into<String>,
        admin_secret_key: impl Into<String>,
        memory_kib: u32,
    ) -> Result<Self, AuthSettingsError> {
        let params = Params::new(
            memory_kib,
            Params::DEFAULT_T_COST,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(AuthSettingsError::Params)?;
        let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let decoy_password: [u8; 16] = rand::random();
        let decoy_hash = crypto::hash_password(&hasher, &hex::encode(decoy_password))
            .map_err(AuthSettingsError::Hash)?;

        Ok(Self {
            jwt_secret: jwt_secret.into(),
            admin_secret_key: admin_secret_key.into(),
            hasher,
            decoy_hash,
        })
    }
}
