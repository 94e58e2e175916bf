//! Database connection pool and migration management.
//!
//! The pool backs both `AdminStore` and `PhotoStore` through `PgStore`.
//! Migrations in `migrations/` create the `admins` and `photos` tables and
//! are applied on every startup before the server binds.

use std::time::Duration;

use sqlx::{Pool, Postgres, postgres::PgPoolOptions};

use crate::config::Config;

/// Type alias for the PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// Sizing and timeouts for the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// How long a request waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl From<&Config> for PoolSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_connections: config.database_max_connections,
            acquire_timeout: Duration::from_secs(config.database_acquire_timeout_secs),
        }
    }
}

impl PoolSettings {
    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Create the PostgreSQL connection pool and open a first connection.
///
/// # Arguments
///
/// * `database_url` - PostgreSQL connection string
/// * `settings` - pool size and acquire timeout
///
/// # Errors
///
/// Returns an error if:
/// - The connection string is invalid
/// - The server cannot be reached within the acquire timeout
/// - Authentication fails
///
/// A request that later waits longer than `acquire_timeout` for a connection
/// fails with `sqlx::Error::PoolTimedOut`, which surfaces as a 500.
pub async fn create_pool(database_url: &str, settings: PoolSettings) -> Result<DbPool, sqlx::Error> {
    let pool = settings.options().connect(database_url).await?;

    tracing::debug!(
        max_connections = settings.max_connections,
        acquire_timeout_secs = settings.acquire_timeout.as_secs(),
        "database pool ready"
    );

    Ok(pool)
}

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns an error if a migration fails or an already-applied migration
/// was edited after the fact (checksum mismatch).
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
