use async_trait::async_trait;
use aws_sdk_s3 as s3;
use chrono::Utc;
use s3::error::DisplayErrorContext;
use s3::primitives::ByteStream;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("url is not served from this bucket: {0}")]
    ForeignUrl(String),
    #[error("url does not name an object")]
    EmptyKey,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// StoredObject
///
/// Raw bytes of an object plus the content type it was stored with.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// StorageService
///
/// Contract for the object store holding user photos, category covers, album
/// images and website media. Handlers only ever see this trait, so tests swap in
/// `MockStorageService` without touching the network.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the configured bucket if missing. Only called against local MinIO.
    async fn ensure_bucket_exists(&self);

    /// upload
    ///
    /// Stores `bytes` under a fresh key inside `prefix` and returns the public URL of
    /// the new object.
    async fn upload(
        &self,
        prefix: &str,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError>;

    /// Deletes the object behind a public URL previously returned by `upload`.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;

    async fn fetch(&self, key: &str) -> Result<StoredObject, StorageError>;
}

/// S3StorageClient
///
/// The AWS SDK implementation. Through S3 compatibility it talks to:
/// - **Local:** Dockerized MinIO instance.
/// - **Production:** Cloudflare R2.
///
/// Both require path-style addressing.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_url: String,
}

impl S3StorageClient {
    /// new
    ///
    /// Constructs the S3 client using credentials and configuration from AppConfig.
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_url: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // CreateBucket fails harmlessly when the bucket is already there.
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(bucket = %self.bucket_name, "create_bucket: {}", DisplayErrorContext(&e));
        }
    }

    async fn upload(
        &self,
        prefix: &str,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let key = build_object_key(prefix, filename);

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(normalize_content_type(content_type))
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;

        tracing::info!(key = %key, "object uploaded");
        Ok(format!("{}/{}", self.public_url, key))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let key = key_from_url(&self.public_url, url)?;

        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;

        tracing::info!(key = %key, "object deleted");
        Ok(())
    }

    async fn fetch(&self, key: &str) -> Result<StoredObject, StorageError> {
        let key = sanitize_key(key);
        if key.is_empty() {
            return Err(StorageError::EmptyKey);
        }

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(se) if se.is_no_such_key() => StorageError::NotFound(key.clone()),
                _ => StorageError::Backend(DisplayErrorContext(&e).to_string()),
            })?;

        let content_type = normalize_content_type(output.content_type().unwrap_or_default());
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(StoredObject {
            bytes,
            content_type,
        })
    }
}

/// build_object_key
///
/// `<prefix>/<YYYYMMDD-HHMMSS>_<nanos>_<filename>`, with spaces in the filename
/// replaced by hyphens and any directory components dropped.
pub fn build_object_key(prefix: &str, filename: &str) -> String {
    let now = Utc::now();
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .replace(' ', "-");
    let prefix = sanitize_key(prefix);

    format!(
        "{}/{}_{}_{}",
        prefix,
        now.format("%Y%m%d-%H%M%S"),
        now.timestamp_subsec_nanos(),
        name
    )
}

/// key_from_url
///
/// Recovers the object key from a public URL. URLs outside `public_url` are refused
/// so a crafted request cannot delete arbitrary objects.
pub fn key_from_url(public_url: &str, url: &str) -> Result<String, StorageError> {
    let base = format!("{}/", public_url.trim_end_matches('/'));
    let key = url
        .trim_matches('"')
        .strip_prefix(&base)
        .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))?;

    let key = sanitize_key(key);
    if key.is_empty() {
        return Err(StorageError::EmptyKey);
    }
    Ok(key)
}

fn normalize_content_type(content_type: &str) -> String {
    if content_type.trim().is_empty() {
        "application/octet-stream".to_string()
    } else {
        content_type.to_string()
    }
}

/// sanitize_key
///
/// Removes directory navigation components (`..`, `.`) and empty segments from a key.
fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockStorageService
///
/// In-memory `StorageService` for tests. Uploaded objects can be fetched back and
/// every upload and delete is recorded for assertions.
#[derive(Default)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    objects: Mutex<HashMap<String, StoredObject>>,
    deleted: Mutex<Vec<String>>,
}

pub const MOCK_PUBLIC_URL: &str = "http://localhost:9000/mock-bucket";

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Seeds an object directly, bypassing key generation.
    pub fn insert_object(&self, key: &str, bytes: &[u8], content_type: &str) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(
                key.to_string(),
                StoredObject {
                    bytes: bytes.to_vec(),
                    content_type: content_type.to_string(),
                },
            );
        }
    }

    pub fn stored_keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn deleted_urls(&self) -> Vec<String> {
        self.deleted
            .lock()
            .map(|deleted| deleted.clone())
            .unwrap_or_default()
    }

    fn simulated_failure(&self) -> Result<(), StorageError> {
        if self.should_fail {
            return Err(StorageError::Backend(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn upload(
        &self,
        prefix: &str,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        self.simulated_failure()?;

        let key = build_object_key(prefix, filename);
        self.insert_object(&key, &bytes, &normalize_content_type(content_type));
        Ok(format!("{}/{}", MOCK_PUBLIC_URL, key))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        self.simulated_failure()?;

        let key = key_from_url(MOCK_PUBLIC_URL, url)?;
        if let Ok(mut objects) = self.objects.lock() {
            objects.remove(&key);
        }
        if let Ok(mut deleted) = self.deleted.lock() {
            deleted.push(url.to_string());
        }
        Ok(())
    }

    async fn fetch(&self, key: &str) -> Result<StoredObject, StorageError> {
        self.simulated_failure()?;

        let key = sanitize_key(key);
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(&key).cloned())
            .ok_or(StorageError::NotFound(key))
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;
