#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use photo_blog_server::{
    AppState, AuthSettings,
    models::{
        admin::Admin,
        photo::{NewPhoto, Photo, PhotoChanges},
    },
    storage::{ObjectStorage, StorageError, StoredObject, UploadRequest},
    store::{AdminStore, PhotoStore},
};
use serde_json::Value;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const ADMIN_SECRET: &str = "let-me-in";
pub const UPLOAD_LIMIT: usize = 1024 * 1024;

#[derive(Default)]
pub struct MemoryAdminStore {
    admins: Mutex<Vec<Admin>>,
}

impl MemoryAdminStore {
    pub fn stored_hash(&self, username: &str) -> Option<String> {
        self.admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.username == username)
            .map(|a| a.password_hash.clone())
    }
}

#[async_trait]
impl AdminStore for MemoryAdminStore {
    async fn any_exists(&self) -> Result<bool, sqlx::Error> {
        Ok(!self.admins.lock().unwrap().is_empty())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<Admin, sqlx::Error> {
        let mut admins = self.admins.lock().unwrap();
        let admin = Admin {
            id: admins.len() as i32 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        admins.push(admin.clone());
        Ok(admin)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, sqlx::Error> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Admin>, sqlx::Error> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }
}

/// Photo rows in memory. Every insert gets a `created_at` one second after
/// the previous one so ordering by creation time is unambiguous.
#[derive(Default)]
pub struct MemoryPhotoStore {
    photos: Mutex<Vec<Photo>>,
    next_id: AtomicUsize,
    fail_insert: bool,
}

impl MemoryPhotoStore {
    /// A store whose every insert fails as if the pool were exhausted.
    pub fn failing_inserts() -> Self {
        Self {
            fail_insert: true,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.photos.lock().unwrap().len()
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Photo>, sqlx::Error> {
        Ok(self
            .photos
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_all_newest_first(&self) -> Result<Vec<Photo>, sqlx::Error> {
        let mut photos = self.photos.lock().unwrap().clone();
        photos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(photos)
    }

    async fn insert(&self, photo: NewPhoto) -> Result<Photo, sqlx::Error> {
        if self.fail_insert {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created_at = Utc::now() - Duration::hours(1) + Duration::seconds(n as i64);
        let photo = Photo {
            id: n as i32 + 1,
            title: photo.title,
            description: photo.description,
            date: photo.date,
            day: photo.day,
            image_url: photo.image_url,
            public_id: photo.public_id,
            created_at,
            updated_at: created_at,
        };
        self.photos.lock().unwrap().push(photo.clone());
        Ok(photo)
    }

    async fn update(&self, id: i32, changes: PhotoChanges) -> Result<Option<Photo>, sqlx::Error> {
        let mut photos = self.photos.lock().unwrap();
        let Some(photo) = photos.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        photo.title = changes.title;
        photo.description = changes.description;
        photo.date = changes.date;
        photo.day = changes.day;
        photo.updated_at = Utc::now();
        Ok(Some(photo.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, sqlx::Error> {
        let mut photos = self.photos.lock().unwrap();
        let before = photos.len();
        photos.retain(|p| p.id != id);
        Ok(photos.len() < before)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}

/// Records uploads and deletions instead of talking to an image host.
#[derive(Default)]
pub struct RecordingStorage {
    pub uploads: Mutex<Vec<UploadRequest>>,
    pub destroyed: Mutex<Vec<String>>,
    pub fail_upload: bool,
    pub fail_destroy: bool,
}

impl RecordingStorage {
    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn upload(&self, request: UploadRequest) -> Result<StoredObject, StorageError> {
        if self.fail_upload {
            return Err(StorageError::Rejected {
                status: 401,
                message: "Invalid Signature".to_string(),
            });
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(request);
        let n = uploads.len();
        Ok(StoredObject {
            url: format!("https://res.example.com/noticing_eye_photos/img{n}.jpg"),
            public_id: format!("noticing_eye_photos/img{n}"),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), StorageError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        if self.fail_destroy {
            return Err(StorageError::Rejected {
                status: 500,
                message: "host unavailable".to_string(),
            });
        }
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub admins: Arc<MemoryAdminStore>,
    pub photos: Arc<MemoryPhotoStore>,
    pub storage: Arc<RecordingStorage>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_storage(RecordingStorage::default())
    }

    pub fn with_storage(storage: RecordingStorage) -> Self {
        Self::with_parts(MemoryPhotoStore::default(), storage)
    }

    pub fn with_parts(photos: MemoryPhotoStore, storage: RecordingStorage) -> Self {
        let admins = Arc::new(MemoryAdminStore::default());
        let photos = Arc::new(photos);
        let storage = Arc::new(storage);

        // Minimal argon2 cost keeps the suite fast
        let auth = AuthSettings::new(JWT_SECRET, ADMIN_SECRET, 1024).unwrap();

        let state = AppState {
            admins: admins.clone(),
            photos: photos.clone(),
            storage: storage.clone(),
            auth: Arc::new(auth),
            upload_limit: UPLOAD_LIMIT,
        };

        Self {
            router: photo_blog_server::router(state),
            admins,
            photos,
            storage,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("response body was not JSON")
        };
        (status, json)
    }

    /// Initialise the admin and log in, returning a bearer token.
    pub async fn admin_token(&self) -> String {
        let (status, _) = self
            .send(json_request(
                "POST",
                "/api/init-admin",
                None,
                serde_json::json!({
                    "username": "a",
                    "password": "p",
                    "secretKey": ADMIN_SECRET,
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .send(json_request(
                "POST",
                "/api/login",
                None,
                serde_json::json!({ "username": "a", "password": "p" }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("token missing").to_string()
    }

    /// Upload a photo with the given title and return the created photo JSON.
    pub async fn create_photo(&self, token: &str, title: &str, date: &str) -> Value {
        let (status, body) = self
            .send(multipart_request(
                "/api/photos",
                Some(token),
                &[("title", title), ("description", "desc"), ("date", date)],
                Some(("photo", "shot.jpg", "image/jpeg", &b"\xff\xd8\xff\xe0fakejpeg"[..])),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "upload failed: {body}");
        body["photo"].clone()
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("failed to build request")
}

const BOUNDARY: &str = "----photo-blog-test-boundary";

/// Build a `multipart/form-data` request from text fields and an optional
/// file `(field, file_name, content_type, bytes)`.
pub fn multipart_request(
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).expect("failed to build request")
}
