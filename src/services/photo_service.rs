//! Photo service - business logic behind the photo endpoints.
//!
//! Create and delete coordinate the database with the image host. There is
//! no transaction spanning the two: a crash between the calls can leave an
//! orphaned image or row.

use crate::{
    error::AppError,
    models::photo::{
        NewPhoto, Photo, PhotoChanges, UpdatePhotoRequest, derive_weekday, non_blank,
    },
    storage::{ObjectStorage, UploadRequest, cloudinary::ALLOWED_FORMATS},
    store::PhotoStore,
};

/// Fields collected from the multipart upload form.
#[derive(Debug, Default)]
pub struct PhotoUpload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub day: Option<String>,
    pub date: Option<String>,
    pub file: Option<UploadRequest>,
}

/// Upload an image and record it as a new photo.
///
/// # Process
///
/// 1. Require a non-empty file in an allowed format
/// 2. Require title, description and date
/// 3. Fill in the weekday from the date when `day` is blank
/// 4. Upload the image, then insert the row
///
/// If the insert fails the freshly uploaded image is removed again.
///
/// # Errors
///
/// - `BadRequest`: no file, unsupported format or missing field
/// - `Storage`: the image host failed
/// - `Database`: the insert failed
pub async fn create_photo(
    photos: &dyn PhotoStore,
    storage: &dyn ObjectStorage,
    upload: PhotoUpload,
) -> Result<Photo, AppError> {
    let mut file = upload
        .file
        .filter(|f| !f.bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let mime = image_mime(&file.file_name, file.content_type.as_deref()).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unsupported image format, expected one of: {}",
            ALLOWED_FORMATS.join(", ")
        ))
    })?;
    file.content_type = Some(mime.to_string());

    let title = required(upload.title, "title")?;
    let description = required(upload.description, "description")?;
    let date = required(upload.date, "date")?;
    let day = non_blank(upload.day).or_else(|| derive_weekday(&date));

    let stored = storage.upload(file).await?;

    let new_photo = NewPhoto {
        title,
        description,
        date,
        day,
        image_url: stored.url,
        public_id: Some(stored.public_id.clone()),
    };

    let photo = match photos.insert(new_photo).await {
        Ok(photo) => photo,
        Err(e) => {
            if let Err(cleanup) = storage.destroy(&stored.public_id).await {
                tracing::warn!(
                    public_id = %stored.public_id,
                    error = %cleanup,
                    "failed to remove image after insert error"
                );
            }
            return Err(e.into());
        }
    };

    tracing::info!(photo_id = photo.id, "photo created");
    Ok(photo)
}

/// All photos, newest first.
///
/// Ties on `created_at` are broken by the higher id first. There is no
/// pagination.
///
/// # Errors
///
/// - `Database`: the query failed
pub async fn list_photos(photos: &dyn PhotoStore) -> Result<Vec<Photo>, AppError> {
    Ok(photos.find_all_newest_first().await?)
}

/// Fetch a single photo.
///
/// # Arguments
///
/// * `photos` - photo store
/// * `id` - photo id from the request path
///
/// # Errors
///
/// - `PhotoNotFound`: no photo with this id
/// - `Database`: the query failed
pub async fn get_photo(photos: &dyn PhotoStore, id: i32) -> Result<Photo, AppError> {
    photos.find_by_id(id).await?.ok_or(AppError::PhotoNotFound)
}

/// Update the editable fields of a photo.
///
/// Absent fields keep their stored value. A `title`, `description` or `date`
/// that is sent must be non-blank, the same as on upload. The weekday label
/// follows these rules:
/// - a non-blank `day` is taken as given
/// - `"day": null` or a blank `day` clears the label
/// - with no `day` key, a new `date` re-derives the label and otherwise the
///   stored label stays
///
/// The image URL and public id are never changed.
///
/// # Errors
///
/// - `BadRequest`: a text field was sent blank
/// - `PhotoNotFound`: no photo with this id
pub async fn update_photo(
    photos: &dyn PhotoStore,
    id: i32,
    request: UpdatePhotoRequest,
) -> Result<Photo, AppError> {
    let title = present_non_blank(request.title, "title")?;
    let description = present_non_blank(request.description, "description")?;
    let new_date = present_non_blank(request.date, "date")?;

    let existing = photos.find_by_id(id).await?.ok_or(AppError::PhotoNotFound)?;

    let date_changed = new_date.is_some();
    let date = new_date.unwrap_or(existing.date);
    let day = match request.day {
        Some(day) => non_blank(day),
        None if date_changed => derive_weekday(&date),
        None => existing.day,
    };

    let changes = PhotoChanges {
        title: title.unwrap_or(existing.title),
        description: description.unwrap_or(existing.description),
        date,
        day,
    };

    let photo = photos
        .update(id, changes)
        .await?
        .ok_or(AppError::PhotoNotFound)?;

    tracing::info!(photo_id = photo.id, "photo updated");
    Ok(photo)
}

/// Delete a photo and, when it has one, its hosted image.
///
/// The image host call is best effort: a failure is logged and the row is
/// deleted anyway.
///
/// # Errors
///
/// - `PhotoNotFound`: no photo with this id
pub async fn delete_photo(
    photos: &dyn PhotoStore,
    storage: &dyn ObjectStorage,
    id: i32,
) -> Result<(), AppError> {
    let photo = photos.find_by_id(id).await?.ok_or(AppError::PhotoNotFound)?;

    if let Some(public_id) = photo.public_id.as_deref()
        && let Err(e) = storage.destroy(public_id).await
    {
        tracing::warn!(
            photo_id = id,
            public_id,
            error = %e,
            "failed to delete image from host, removing row anyway"
        );
    }

    if !photos.delete(id).await? {
        return Err(AppError::PhotoNotFound);
    }

    tracing::info!(photo_id = id, "photo deleted");
    Ok(())
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing required field: {field}")))
}

/// Like `required`, but an absent field is fine.
fn present_non_blank(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    value.map(|v| required(Some(v), field)).transpose()
}

/// Canonical MIME type for an allowed image, judged by file extension or,
/// when the name has none, by the declared content type.
fn image_mime(file_name: &str, content_type: Option<&str>) -> Option<&'static str> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("png") => Some("image/png"),
        Some("gif") => Some("image/gif"),
        Some(_) => None,
        None => match content_type? {
            "image/jpeg" | "image/jpg" => Some("image/jpeg"),
            "image/png" => Some("image/png"),
            "image/gif" => Some("image/gif"),
            _ => None,
        },
    }
}
