//! Admin authentication HTTP handlers.
//!
//! - POST /api/init-admin - Create the single admin account
//! - POST /api/login - Exchange credentials for a bearer token

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::admin::{InitAdminRequest, InitAdminResponse, LoginRequest, LoginResponse},
    services::auth_service,
    state::AppState,
};

/// Initialise the admin account.
///
/// # Request Body
///
/// ```json
/// { "username": "editor", "password": "...", "secretKey": "..." }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: `{ "message": "...", "adminId": 1 }`
/// - **Error (401)**: wrong secret key
/// - **Error (409)**: an admin already exists
pub async fn init_admin(
    State(state): State<AppState>,
    payload: Result<Json<InitAdminRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;

    let admin_id = auth_service::init_admin(
        state.admins.as_ref(),
        &state.auth,
        request.username,
        request.password,
        &request.secret_key,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(InitAdminResponse {
            message: "Admin created successfully",
            admin_id,
        }),
    ))
}

/// Log in.
///
/// # Response
///
/// - **Success (200 OK)**:
///   `{ "message": "...", "token": "...", "admin": { "id": 1, "username": "editor" } }`
/// - **Error (401)**: `Invalid credentials`, whichever part was wrong
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload?;

    let response = auth_service::login(
        state.admins.as_ref(),
        &state.auth,
        &request.username,
        request.password,
    )
    .await?;

    Ok(Json(response))
}
