//! Photo blog server - main application entry point.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Wire stores, image host client and auth settings into `AppState`
//! 5. Serve until SIGINT/SIGTERM, then drain in-flight requests
//!
//! Any startup failure exits non-zero. Release builds abort on panic so a
//! process supervisor restarts the service.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use photo_blog_server::{
    AppState, AuthSettings, config, db,
    storage::{CloudinarySettings, CloudinaryStorage},
    store::PgStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env().context("invalid configuration")?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url, db::PoolSettings::from(&config))
        .await
        .context("failed to connect to the database")?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    tracing::info!("Database migrations complete");

    let storage = CloudinaryStorage::new(CloudinarySettings {
        api_base: config.cloudinary_api_base.clone(),
        cloud_name: config.cloudinary_cloud_name.clone(),
        api_key: config.cloudinary_api_key.clone(),
        api_secret: config.cloudinary_api_secret.clone(),
        folder: config.cloudinary_folder.clone(),
    })
    .context("failed to configure image storage")?;
    tracing::info!(folder = %config.cloudinary_folder, "Image storage configured");

    let auth = AuthSettings::new(
        config.jwt_secret.clone(),
        config.admin_secret_key.clone(),
        config.password_hash_memory_kib,
    )
    .context("invalid password hashing parameters")?;

    let store = Arc::new(PgStore::new(pool));
    let state = AppState {
        admins: store.clone(),
        photos: store,
        storage: Arc::new(storage),
        auth: Arc::new(auth),
        upload_limit: config.max_upload_bytes,
    };

    let app = photo_blog_server::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
