use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    repository::PageQuery,
    storage::StorageState,
    util::parse_bool_field,
};

pub mod albums;
pub mod auth;
pub mod categories;
pub mod faqs;
pub mod users;
pub mod websites;

/// Upper bound for a single multipart request (album uploads carry many images).
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

// --- Body Extractors ---

/// AppJson
///
/// `Json` whose rejections (bad syntax, missing keys, wrong content type) come
/// back as a 400 `{"message"}` like every other client error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

// --- Query Parameters ---

/// ListQuery
///
/// Query string of the admin list endpoints. Values arrive as raw strings so bad
/// numbers produce our own 400 message instead of the extractor's.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// 1-based page number (default 1).
    pub page: Option<String>,
    /// Page size (default 10).
    pub limit: Option<String>,
    /// Case-insensitive substring filter.
    pub search: Option<String>,
}

impl ListQuery {
    pub fn into_page(self) -> AppResult<PageQuery> {
        let page = parse_positive(self.page.as_deref(), 1)
            .ok_or_else(|| AppError::BadRequest("Invalid page parameter".to_string()))?;
        let limit = parse_positive(self.limit.as_deref(), 10)
            .ok_or_else(|| AppError::BadRequest("Invalid limit parameter".to_string()))?;
        // The window end must stay representable for OFFSET and `next`.
        if page.checked_mul(limit).is_none() {
            return Err(AppError::BadRequest("Invalid page parameter".to_string()));
        }
        Ok(PageQuery::new(page, limit, self.search))
    }
}

fn parse_positive(raw: Option<&str>, default: i64) -> Option<i64> {
    match raw.map(str::trim) {
        None | Some("") => Some(default),
        Some(value) => value.parse::<i64>().ok().filter(|n| *n >= 1),
    }
}

/// Path identifiers are public UUIDs. Anything else is a client error.
pub fn parse_uuid(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest("invalid uuid".to_string()))
}

// --- Multipart Forms ---

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// FormData
///
/// A fully buffered multipart form: text fields by name, files grouped by field
/// name. `images[]` is treated as `images`.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        Self::from_multipart(multipart).await
    }
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid multipart form: {e}")))?
        {
            let name = field
                .name()
                .unwrap_or_default()
                .trim_end_matches("[]")
                .to_string();

            let filename = field.file_name().map(str::to_string);
            match filename {
                Some(filename) if !filename.is_empty() => {
                    let content_type = field.content_type().unwrap_or_default().to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("failed to read file: {e}")))?;
                    if bytes.is_empty() {
                        continue;
                    }
                    form.files.entry(name).or_default().push(UploadedFile {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                _ => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("invalid form field: {e}")))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed text value, empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Trimmed text value of the first present, non-empty field among `names`.
    pub fn text_any(&self, names: &[&str]) -> String {
        names
            .iter()
            .map(|name| self.text(name))
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    }

    pub fn optional(&self, name: &str) -> Option<String> {
        Some(self.text(name)).filter(|v| !v.is_empty())
    }

    pub fn flag(&self, name: &str) -> bool {
        parse_bool_field(&self.text(name))
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.take_files(name).into_iter().next()
    }
}

// --- Media ---

/// Uploads one form file under `prefix` and returns its public URL.
pub async fn upload_file(
    storage: &StorageState,
    prefix: &str,
    file: UploadedFile,
) -> AppResult<String> {
    let url = storage
        .upload(prefix, &file.filename, &file.content_type, file.bytes)
        .await?;
    Ok(url)
}

pub async fn upload_optional(
    storage: &StorageState,
    prefix: &str,
    file: Option<UploadedFile>,
) -> AppResult<Option<String>> {
    match file {
        Some(file) => upload_file(storage, prefix, file).await.map(Some),
        None => Ok(None),
    }
}

/// release_media
///
/// Best-effort removal of storage objects whose rows are already gone. Failures
/// are logged and never fail the request.
pub async fn release_media<I>(storage: &StorageState, urls: I)
where
    I: IntoIterator<Item = String>,
{
    for url in urls {
        if url.is_empty() {
            continue;
        }
        if let Err(e) = storage.delete(&url).await {
            tracing::warn!(url = %url, "failed to release media: {e}");
        }
    }
}
