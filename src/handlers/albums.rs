use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use super::{AppJson, FormData, ListQuery, UploadedFile, parse_uuid, release_media, upload_file};
use crate::{
    AppState,
    error::{AppError, AppResult, ErrorResponse},
    models::{
        Album, AlbumInput, AlbumResponse, AlbumResponseList, DataResponse, DeleteImageRequest,
        MessageResponse, Paginated,
    },
    storage::StorageState,
    util::{clean_image_url, remove_duplicate_strings, split_csv},
};

const UPLOAD_PREFIX: &str = "albums";

/// Size of the public "latest work" feed.
pub const LATEST_ALBUMS: i64 = 6;

fn not_found() -> AppError {
    AppError::NotFound("album not found".to_string())
}

/// Reads the scalar album fields. Images and thumbnail are filled in by the caller.
fn album_input(form: &FormData) -> AppResult<AlbumInput> {
    let input = AlbumInput {
        slug: form.text("slug"),
        title: form.text("title"),
        description: form.text("description"),
        youtube_url: form.text("youtube_url"),
        is_published: form.flag("is_published"),
        ..Default::default()
    };

    let category_id = form.text("category_id");
    let user_id = form.text("user_id");

    if input.slug.is_empty()
        || input.title.is_empty()
        || input.description.is_empty()
        || category_id.is_empty()
        || user_id.is_empty()
    {
        return Err(AppError::BadRequest(
            "slug, title, category_id, description, and user_id are required".to_string(),
        ));
    }

    Ok(AlbumInput {
        category_id: parse_reference(&category_id, "category_id")?,
        user_id: parse_reference(&user_id, "user_id")?,
        ..input
    })
}

fn parse_reference(raw: &str, field: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("invalid {field}")))
}

/// Uploads every file or none: a failure releases what was already stored.
async fn upload_all(storage: &StorageState, files: Vec<UploadedFile>) -> AppResult<Vec<String>> {
    let mut urls = Vec::with_capacity(files.len());
    for file in files {
        match upload_file(storage, UPLOAD_PREFIX, file).await {
            Ok(url) => urls.push(url),
            Err(e) => {
                release_media(storage, urls).await;
                return Err(e);
            }
        }
    }
    Ok(urls)
}

fn next_page(page: i64, limit: i64, total: i64) -> i64 {
    if page.saturating_mul(limit) < total { page + 1 } else { 0 }
}

// --- Public ---

/// get_latest_albums
///
/// [Public Route] The most recent published albums for the home page.
#[utoipa::path(
    get,
    path = "/api/albums",
    responses((status = 200, description = "Latest albums", body = DataResponse<Vec<AlbumResponse>>))
)]
pub async fn get_latest_albums(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AlbumResponse>>>> {
    let albums = state.repo.latest_albums(LATEST_ALBUMS).await?;
    Ok(Json(DataResponse::new(
        albums.iter().map(AlbumResponse::from).collect(),
    )))
}

/// get_albums_by_category
///
/// [Public Route] One page of published albums in a published category. `next`
/// is 0 on the last page.
#[utoipa::path(
    get,
    path = "/api/albums/category/{slug}",
    params(ListQuery),
    responses(
        (status = 200, description = "Albums", body = AlbumResponseList),
        (status = 400, description = "Invalid paging", body = ErrorResponse)
    )
)]
pub async fn get_albums_by_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AlbumResponseList>> {
    let page = query.into_page()?;
    let (albums, total) = state
        .repo
        .albums_by_category_slug(slug.trim(), page.page, page.limit)
        .await?;

    Ok(Json(AlbumResponseList {
        data: albums.iter().map(AlbumResponse::from).collect(),
        next: next_page(page.page, page.limit, total),
    }))
}

// --- Admin ---

#[utoipa::path(
    get,
    path = "/api/albums/lists",
    params(ListQuery),
    responses(
        (status = 200, description = "Albums", body = Paginated<AlbumResponse>),
        (status = 400, description = "Invalid paging", body = ErrorResponse)
    )
)]
pub async fn get_albums(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<AlbumResponse>>> {
    let page = query.into_page()?;
    let (albums, total) = state.repo.list_albums(&page).await?;

    Ok(Json(Paginated {
        data: albums.iter().map(AlbumResponse::from).collect(),
        total,
        page: page.page,
        limit: page.limit,
    }))
}

#[utoipa::path(
    get,
    path = "/api/albums/{uuid}",
    responses(
        (status = 200, description = "Album", body = DataResponse<AlbumResponse>),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_album(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<AlbumResponse>>> {
    let uuid = parse_uuid(&uuid)?;
    let album = state.repo.get_album_by_uuid(uuid).await?.ok_or_else(not_found)?;
    Ok(Json(DataResponse::new(AlbumResponse::from(&album))))
}

/// create_album
///
/// [Admin Route] Multipart form with the album fields, any number of `images[]`
/// and an optional `thumbnail`. All files go under the `albums/` prefix.
#[utoipa::path(
    post,
    path = "/api/albums/submit",
    request_body(content_type = "multipart/form-data", description = "Album fields plus `images[]` and `thumbnail`"),
    responses(
        (status = 200, description = "Created", body = DataResponse<AlbumResponse>),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 404, description = "Unknown category or user", body = ErrorResponse),
        (status = 409, description = "Slug already exists", body = ErrorResponse)
    )
)]
pub async fn create_album(
    State(state): State<AppState>,
    mut form: FormData,
) -> AppResult<Json<DataResponse<AlbumResponse>>> {
    let mut input = album_input(&form)?;

    input.images = upload_all(&state.storage, form.take_files("images")).await?;
    if let Some(file) = form.take_file("thumbnail") {
        match upload_file(&state.storage, UPLOAD_PREFIX, file).await {
            Ok(url) => input.thumbnail = Some(url),
            Err(e) => {
                release_media(&state.storage, input.images).await;
                return Err(e);
            }
        }
    }

    let uploaded: Vec<String> = input
        .images
        .iter()
        .cloned()
        .chain(input.thumbnail.clone())
        .collect();

    match state.repo.create_album(input).await {
        Ok(album) => {
            tracing::info!(album_id = %album.uuid, images = album.images.len(), "album created");
            Ok(Json(DataResponse::new(AlbumResponse::from(&album))))
        }
        Err(e) => {
            release_media(&state.storage, uploaded).await;
            Err(e.into())
        }
    }
}

/// Images of `before` that no longer appear in `after`, plus the old thumbnail
/// when it was replaced.
fn dropped_media(before: &Album, after: &Album) -> Vec<String> {
    let mut dropped: Vec<String> = before
        .images
        .iter()
        .filter(|url| !after.images.contains(url))
        .cloned()
        .collect();

    if let Some(old) = &before.thumbnail {
        if after.thumbnail.as_ref() != Some(old) && !after.images.contains(old) {
            dropped.push(old.clone());
        }
    }
    dropped
}

/// update_album
///
/// [Admin Route] `media_url` (comma-separated) lists the existing images to keep;
/// without it every current image is kept. New `images[]` are appended. A
/// `thumbnail_url` wins over an uploaded `thumbnail`, and with neither the
/// current thumbnail stays.
#[utoipa::path(
    put,
    path = "/api/albums/{uuid}",
    request_body(content_type = "multipart/form-data", description = "Album fields, `media_url`, `thumbnail_url`, `images[]`, `thumbnail`"),
    responses(
        (status = 200, description = "Updated", body = DataResponse<AlbumResponse>),
        (status = 404, description = "Not Found", body = ErrorResponse),
        (status = 409, description = "Slug already exists", body = ErrorResponse)
    )
)]
pub async fn update_album(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    mut form: FormData,
) -> AppResult<Json<DataResponse<AlbumResponse>>> {
    let uuid = parse_uuid(&uuid)?;
    let existing = state.repo.get_album_by_uuid(uuid).await?.ok_or_else(not_found)?;

    let mut input = album_input(&form)?;

    let kept = if form.has("media_url") {
        split_csv(&form.text("media_url"))
    } else {
        existing.images.clone()
    };

    let mut uploaded = upload_all(&state.storage, form.take_files("images")).await?;
    input.images = remove_duplicate_strings(kept.into_iter().chain(uploaded.iter().cloned()).collect());

    let thumbnail_url = form.optional("thumbnail_url");
    let thumbnail_file = match thumbnail_url {
        Some(_) => None,
        None => form.take_file("thumbnail"),
    };
    if let Some(file) = thumbnail_file {
        match upload_file(&state.storage, UPLOAD_PREFIX, file).await {
            Ok(url) => {
                uploaded.push(url.clone());
                input.thumbnail = Some(url);
            }
            Err(e) => {
                release_media(&state.storage, uploaded).await;
                return Err(e);
            }
        }
    }
    if thumbnail_url.is_some() {
        input.thumbnail = thumbnail_url;
    }

    let album = match state.repo.update_album(uuid, input).await {
        Ok(Some(album)) => album,
        Ok(None) => {
            release_media(&state.storage, uploaded).await;
            return Err(not_found());
        }
        Err(e) => {
            release_media(&state.storage, uploaded).await;
            return Err(e.into());
        }
    };

    let dropped = dropped_media(&existing, &album);
    if !dropped.is_empty() {
        tracing::debug!(album_id = %uuid, count = dropped.len(), "releasing replaced album media");
        release_media(&state.storage, dropped).await;
    }

    Ok(Json(DataResponse::new(AlbumResponse::from(&album))))
}

#[utoipa::path(
    delete,
    path = "/api/albums/{uuid}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_album(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let uuid = parse_uuid(&uuid)?;
    let media = state.repo.delete_album(uuid).await?.ok_or_else(not_found)?;

    tracing::info!(album_id = %uuid, media = media.len(), "album deleted");
    release_media(&state.storage, media).await;

    Ok(Json(MessageResponse::new("deleted successfully")))
}

/// delete_album_image
///
/// [Admin Route] Removes one image from an album. The URL may arrive quoted; it
/// is matched against the stored list by exact value, then by file name.
#[utoipa::path(
    patch,
    path = "/api/albums/images/{uuid}",
    request_body = DeleteImageRequest,
    responses(
        (status = 200, description = "Image removed", body = MessageResponse),
        (status = 400, description = "Missing image_url", body = ErrorResponse),
        (status = 404, description = "Album or image not found", body = ErrorResponse)
    )
)]
pub async fn delete_album_image(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    AppJson(payload): AppJson<DeleteImageRequest>,
) -> AppResult<Json<MessageResponse>> {
    let uuid = parse_uuid(&uuid)?;
    let requested = payload.image_url.trim().trim_matches('"');
    if requested.is_empty() {
        return Err(AppError::BadRequest("image_url is required in body".to_string()));
    }

    let album = state.repo.get_album_by_uuid(uuid).await?.ok_or_else(not_found)?;
    let name = clean_image_url(requested);
    let stored = album
        .images
        .iter()
        .find(|url| url.as_str() == requested)
        .or_else(|| album.images.iter().find(|url| clean_image_url(url) == name))
        .cloned()
        .ok_or_else(|| AppError::NotFound("image not found in album".to_string()))?;

    state
        .repo
        .remove_album_image(uuid, &stored)
        .await?
        .ok_or_else(not_found)?;
    release_media(&state.storage, Some(stored)).await;

    Ok(Json(MessageResponse::new("image deleted successfully")))
}
