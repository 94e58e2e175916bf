//! HTTP routing.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, middleware, state::AppState};

/// Build the application router.
///
/// Reads (`GET /api/photos`, `GET /api/photos/{id}`), login, admin
/// initialisation and the health check are public; photo mutations go
/// through the bearer token middleware.
pub fn router(state: AppState) -> Router {
    // Photo mutations, admin only
    let authenticated_routes = Router::new()
        .route(
            "/api/photos",
            post(handlers::photos::create_photo).layer(DefaultBodyLimit::max(state.upload_limit)),
        )
        .route(
            "/api/photos/{id}",
            put(handlers::photos::update_photo).delete(handlers::photos::delete_photo),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/init-admin", post(handlers::auth::init_admin))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/photos", get(handlers::photos::list_photos))
        .route("/api/photos/{id}", get(handlers::photos::get_photo))
        .merge(authenticated_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
