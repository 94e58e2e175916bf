//! Photo HTTP handlers.
//!
//! This module implements the photo endpoints:
//! - POST /api/photos - Upload a new photo (admin)
//! - GET /api/photos - List all photos
//! - GET /api/photos/{id} - Get one photo
//! - PUT /api/photos/{id} - Edit title, description, day, date (admin)
//! - DELETE /api/photos/{id} - Delete a photo and its image (admin)

use axum::{
    Extension, Json,
    extract::{
        Multipart, Path, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::photo::{Photo, PhotoEnvelope, UpdatePhotoRequest},
    services::photo_service::{self, PhotoUpload},
    state::AppState,
    storage::UploadRequest,
};

/// Upload a photo.
///
/// # Request
///
/// `multipart/form-data` with fields `photo` (the image file), `title`,
/// `description`, `day` (optional) and `date`.
///
/// # Response
///
/// - **Success (201 Created)**: `{ "message": "...", "photo": {...} }`
/// - **Error (400)**: no file, unsupported format or missing field
/// - **Error (401)**: missing or invalid token
pub async fn create_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart?;
    let mut upload = PhotoUpload::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                upload.file = Some(UploadRequest {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "title" => upload.title = Some(field.text().await?),
            "description" => upload.description = Some(field.text().await?),
            "day" => upload.day = Some(field.text().await?),
            "date" => upload.date = Some(field.text().await?),
            _ => {}
        }
    }

    tracing::debug!(
        admin_id = auth.admin_id,
        admin = %auth.username,
        "photo upload received"
    );

    let photo =
        photo_service::create_photo(state.photos.as_ref(), state.storage.as_ref(), upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(PhotoEnvelope {
            message: "Photo uploaded successfully",
            photo,
        }),
    ))
}

/// List all photos, newest first. Public.
pub async fn list_photos(State(state): State<AppState>) -> Result<Json<Vec<Photo>>, AppError> {
    let photos = photo_service::list_photos(state.photos.as_ref()).await?;
    Ok(Json(photos))
}

/// Get a single photo. Public.
///
/// - **Error (400)**: id is not a number
/// - **Error (404)**: no such photo
pub async fn get_photo(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Photo>, AppError> {
    let Path(id) = id?;
    let photo = photo_service::get_photo(state.photos.as_ref(), id).await?;
    Ok(Json(photo))
}

/// Edit a photo's text fields.
///
/// # Request Body
///
/// ```json
/// { "title": "...", "description": "...", "day": "Friday", "date": "15/March/2024" }
/// ```
///
/// All fields are optional. `imageUrl` and `publicId` are ignored if sent.
///
/// # Response
///
/// - **Success (200 OK)**: `{ "message": "...", "photo": {...} }`
/// - **Error (401)**: missing or invalid token
/// - **Error (404)**: no such photo
pub async fn update_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdatePhotoRequest>, JsonRejection>,
) -> Result<Json<PhotoEnvelope>, AppError> {
    let Path(id) = id?;
    let Json(request) = payload?;

    tracing::debug!(
        admin_id = auth.admin_id,
        admin = %auth.username,
        photo_id = id,
        "photo update requested"
    );

    let photo = photo_service::update_photo(state.photos.as_ref(), id, request).await?;

    Ok(Json(PhotoEnvelope {
        message: "Photo updated successfully",
        photo,
    }))
}

/// Delete a photo.
///
/// # Response
///
/// - **Success (200 OK)**: `{ "message": "Photo deleted successfully" }`
/// - **Error (401)**: missing or invalid token
/// - **Error (404)**: no such photo
pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Path(id) = id?;

    tracing::debug!(
        admin_id = auth.admin_id,
        admin = %auth.username,
        photo_id = id,
        "photo delete requested"
    );

    photo_service::delete_photo(state.photos.as_ref(), state.storage.as_ref(), id).await?;

    Ok(Json(json!({ "message": "Photo deleted successfully" })))
}
