//! Cloudinary upload API client.
//!
//! Uploads and deletions are signed requests against
//! `{api_base}/{cloud_name}/image/{upload,destroy}`.
//!
//! # Signing
//!
//! 1. Collect the request parameters (excluding `file`, `api_key` and the
//!    signature itself), drop empty values and sort by name
//! 2. Join them as `name=value` pairs separated by `&`
//! 3. Append the API secret and hash with SHA-256
//! 4. Send the hex digest as `signature` with `signature_algorithm=sha256`

use std::{fmt, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

use super::{ObjectStorage, StorageError, StoredObject, UploadRequest};

/// Formats the image host will accept.
pub const ALLOWED_FORMATS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const DESTROY_TIMEOUT: Duration = Duration::from_secs(10);

/// Account settings for the Cloudinary client.
#[derive(Clone)]
pub struct CloudinarySettings {
    pub api_base: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder every upload is placed in.
    pub folder: String,
}

#[derive(Clone)]
pub struct CloudinaryStorage {
    client: reqwest::Client,
    upload_url: Url,
    destroy_url: Url,
    api_key: String,
    api_secret: String,
    folder: String,
}

impl fmt::Debug for CloudinarySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinarySettings")
            .field("api_base", &self.api_base)
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("folder", &self.folder)
            .finish()
    }
}

impl fmt::Debug for CloudinaryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryStorage")
            .field("upload_url", &self.upload_url.as_str())
            .field("destroy_url", &self.destroy_url.as_str())
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("folder", &self.folder)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryStorage {
    /// Build a client. Fails if `api_base` is not a valid URL.
    pub fn new(settings: CloudinarySettings) -> Result<Self, StorageError> {
        let mut api_base = settings.api_base;
        if !api_base.ends_with('/') {
            api_base.push('/');
        }
        let base = Url::parse(&api_base)?;
        let upload_url = base.join(&format!("{}/image/upload", settings.cloud_name))?;
        let destroy_url = base.join(&format!("{}/image/destroy", settings.cloud_name))?;

        Ok(Self {
            client: reqwest::Client::new(),
            upload_url,
            destroy_url,
            api_key: settings.api_key,
            api_secret: settings.api_secret,
            folder: settings.folder,
        })
    }

    /// Parameters common to every signed call, plus the signature.
    fn signed_params(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        let signature = sign(&params, &self.api_secret);
        params.push(("api_key", self.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }
}

#[async_trait]
impl ObjectStorage for CloudinaryStorage {
    async fn upload(&self, request: UploadRequest) -> Result<StoredObject, StorageError> {
        let params = self.signed_params(vec![
            ("allowed_formats", ALLOWED_FORMATS.join(",")),
            ("folder", self.folder.clone()),
            ("public_id", generate_public_id()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ]);

        let mut part = Part::bytes(request.bytes).file_name(request.file_name);
        if let Some(content_type) = request.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let form = params
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
            .part("file", part);

        let response = self
            .client
            .post(self.upload_url.clone())
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form)
            .send()
            .await?;

        let uploaded: UploadResponse = read_json(response).await?;
        tracing::debug!(public_id = %uploaded.public_id, "image uploaded");

        Ok(StoredObject {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), StorageError> {
        let params = self.signed_params(vec![
            ("invalidate", "true".to_string()),
            ("public_id", public_id.to_string()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ]);

        let response = self
            .client
            .post(self.destroy_url.clone())
            .timeout(DESTROY_TIMEOUT)
            .form(&params)
            .send()
            .await?;

        let destroyed: DestroyResponse = read_json(response).await?;
        match destroyed.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                tracing::debug!(public_id, "image already absent from host");
                Ok(())
            }
            other => Err(StorageError::Unexpected(format!(
                "destroy returned result '{other}'"
            ))),
        }
    }
}

/// Decode a successful response body, or turn an error status into
/// `StorageError::Rejected` carrying the host's message.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    Err(StorageError::Rejected {
        status: status.as_u16(),
        message,
    })
}

/// Compute the request signature for a set of parameters.
fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut pairs: Vec<_> = params.iter().filter(|(_, value)| !value.is_empty()).collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Random object name; the host prefixes it with the folder.
fn generate_public_id() -> String {
    let bytes: [u8; 12] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_base: &str) -> CloudinarySettings {
        CloudinarySettings {
            api_base: api_base.to_string(),
            cloud_name: "demo".to_string(),
            api_key: "1234".to_string(),
            api_secret: "abcd".to_string(),
            folder: "noticing_eye_photos".to_string(),
        }
    }

    #[test]
    fn signature_sorts_parameters_and_appends_secret() {
        let params = vec![
            ("timestamp", "1315060510".to_string()),
            ("public_id", "sample_image".to_string()),
            ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop".to_string()),
        ];
        assert_eq!(
            sign(&params, "abcd"),
            "cc927e1290f9e3ae4c1a741eda21a4630b4ce80f9ce0bc0296337d25cf40f91e"
        );
    }

    #[test]
    fn debug_output_hides_api_secret() {
        let settings = settings("https://api.cloudinary.com/v1_1");
        assert!(!format!("{settings:?}").contains("abcd"));

        let storage = CloudinaryStorage::new(settings).unwrap();
        let printed = format!("{storage:?}");
        assert!(!printed.contains("abcd"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn empty_parameters_are_not_signed() {
        let with_empty = vec![
            ("public_id", "sample_image".to_string()),
            ("folder", String::new()),
        ];
        let without = vec![("public_id", "sample_image".to_string())];
        assert_eq!(sign(&with_empty, "abcd"), sign(&without, "abcd"));
    }

    #[test]
    fn endpoints_are_derived_from_base_and_cloud_name() {
        let storage = CloudinaryStorage::new(settings("https://api.cloudinary.com/v1_1")).unwrap();
        assert_eq!(
            storage.upload_url.as_str(),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
        assert_eq!(
            storage.destroy_url.as_str(),
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            CloudinaryStorage::new(settings("not a url")),
            Err(StorageError::Url(_))
        ));
    }

    #[test]
    fn signed_params_carry_key_and_algorithm() {
        let storage = CloudinaryStorage::new(settings("https://api.cloudinary.com/v1_1/")).unwrap();
        let params = storage.signed_params(vec![("public_id", "x".to_string())]);
        let names: Vec<_> = params.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["public_id", "api_key", "signature", "signature_algorithm"]
        );
    }

    #[test]
    fn public_ids_are_random_hex() {
        let a = generate_public_id();
        let b = generate_public_id();
        assert_eq!(a.len(), 24);
        assert_ne!(a, b);
    }
}
