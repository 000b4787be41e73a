use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use super::{FormData, ListQuery, parse_uuid, release_media, upload_optional};
use crate::{
    AppState,
    auth::hash_password,
    error::{AppError, AppResult, ErrorResponse},
    models::{
        CategoryResponse, DataResponse, MessageResponse, Paginated, User, UserInput,
        UserPortfolioResponse, UserResponse,
    },
    util::object_name_from_url,
};

const UPLOAD_PREFIX: &str = "users";

fn not_found() -> AppError {
    AppError::NotFound("user not found".to_string())
}

/// Reads the user form. `existing` decides the login default on edits.
fn user_input(form: &FormData, existing: Option<&User>) -> AppResult<UserInput> {
    let mut input = UserInput {
        name: form.text("name"),
        email: form.text("email"),
        role: form.text("role"),
        description: form.text("description"),
        photo_url: None,
        password: form.optional("password"),
        url_instagram: form.text("url_instagram"),
        url_tiktok: form.text_any(&["url_tiktok", "url_tikTok"]),
        url_facebook: form.text("url_facebook"),
        url_youtube: form.text("url_youtube"),
        phone_number: form.text("phone_number"),
        can_login: false,
        is_published: form.flag("is_published"),
    };

    if input.name.is_empty() || input.email.is_empty() || input.role.is_empty() {
        return Err(AppError::BadRequest(
            "name, email, and role are required".to_string(),
        ));
    }

    input.can_login = if form.has("can_login") {
        form.flag("can_login")
    } else {
        input.password.is_some() || existing.is_some_and(|u| u.password.is_some())
    };

    input.password = match input.password.take() {
        Some(plain) if input.can_login => Some(hash_password(&plain)?),
        _ => None,
    };

    Ok(input)
}

/// get_users
///
/// [Admin Route] Paginated user list, searchable by name or email.
#[utoipa::path(
    get,
    path = "/api/users/lists",
    params(ListQuery),
    responses(
        (status = 200, description = "Users", body = Paginated<UserResponse>),
        (status = 400, description = "Invalid paging", body = ErrorResponse)
    )
)]
pub async fn get_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let page = query.into_page()?;
    let (users, total) = state.repo.list_users(&page).await?;

    Ok(Json(Paginated {
        data: users.iter().map(UserResponse::from).collect(),
        total,
        page: page.page,
        limit: page.limit,
    }))
}

#[utoipa::path(
    get,
    path = "/api/users/{uuid}",
    responses(
        (status = 200, description = "User", body = DataResponse<UserResponse>),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let uuid = parse_uuid(&uuid)?;
    let user = state.repo.get_user_by_uuid(uuid).await?.ok_or_else(not_found)?;
    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

/// create_user
///
/// [Admin Route] Creates a photographer or staff account from a multipart form with
/// an optional `photo` file. A password is stored only for accounts that can log in.
#[utoipa::path(
    post,
    path = "/api/users/submit",
    request_body(content_type = "multipart/form-data", description = "User fields plus optional `photo`"),
    responses(
        (status = 200, description = "Created", body = DataResponse<UserResponse>),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    mut form: FormData,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let mut input = user_input(&form, None)?;

    input.photo_url = upload_optional(&state.storage, UPLOAD_PREFIX, form.take_file("photo")).await?;
    let uploaded = input.photo_url.clone();

    match state.repo.create_user(input).await {
        Ok(user) => {
            tracing::info!(user_id = %user.uuid, "user created");
            Ok(Json(DataResponse::new(UserResponse::from(&user))))
        }
        Err(e) => {
            release_media(&state.storage, uploaded).await;
            Err(e.into())
        }
    }
}

/// update_user
///
/// [Admin Route] Replaces every field of a user. A new `photo` replaces the old
/// object, which is then released from storage.
#[utoipa::path(
    put,
    path = "/api/users/{uuid}",
    request_body(content_type = "multipart/form-data", description = "User fields plus optional `photo`"),
    responses(
        (status = 200, description = "Updated", body = DataResponse<UserResponse>),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    mut form: FormData,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let uuid = parse_uuid(&uuid)?;
    let existing = state.repo.get_user_by_uuid(uuid).await?.ok_or_else(not_found)?;

    let mut input = user_input(&form, Some(&existing))?;

    input.photo_url = upload_optional(&state.storage, UPLOAD_PREFIX, form.take_file("photo")).await?;
    let uploaded = input.photo_url.clone();

    let user = match state.repo.update_user(uuid, input).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            release_media(&state.storage, uploaded).await;
            return Err(not_found());
        }
        Err(e) => {
            release_media(&state.storage, uploaded).await;
            return Err(e.into());
        }
    };

    if uploaded.is_some() {
        release_media(&state.storage, existing.photo.filter(|old| Some(old) != uploaded.as_ref())).await;
    }

    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

/// delete_user
///
/// [Admin Route] Deletes a user together with their albums, then releases every
/// photo those rows referenced.
#[utoipa::path(
    delete,
    path = "/api/users/{uuid}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let uuid = parse_uuid(&uuid)?;
    let media = state.repo.delete_user(uuid).await?.ok_or_else(not_found)?;

    tracing::info!(user_id = %uuid, media = media.len(), "user deleted");
    release_media(&state.storage, media).await;

    Ok(Json(MessageResponse::new("deleted successfully")))
}

#[utoipa::path(
    patch,
    path = "/api/users/{uuid}",
    responses(
        (status = 200, description = "Photo removed", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_user_photo(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let uuid = parse_uuid(&uuid)?;
    let previous = state.repo.clear_user_photo(uuid).await?;
    release_media(&state.storage, previous).await;

    Ok(Json(MessageResponse::new("image deleted successfully")))
}

/// get_user_portfolio
///
/// [Public Route] A published photographer and the published categories they have
/// published albums in.
#[utoipa::path(
    get,
    path = "/api/users/portfolio/{slug}",
    responses(
        (status = 200, description = "Portfolio", body = DataResponse<UserPortfolioResponse>),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_user_portfolio(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<UserPortfolioResponse>>> {
    let user = state
        .repo
        .get_user_by_slug(&slug)
        .await?
        .filter(|u| u.is_published)
        .ok_or_else(not_found)?;

    let categories = state.repo.published_categories_for_user(user.uuid).await?;

    Ok(Json(DataResponse::new(UserPortfolioResponse {
        user: UserResponse::from(&user),
        categories: categories.iter().map(CategoryResponse::from).collect(),
    })))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ImageQuery {
    /// Object name under the `users/` prefix. A full photo URL is reduced to its
    /// basename.
    pub filename: Option<String>,
}

/// proxy_user_image
///
/// [Public Route] Streams a user photo out of the bucket so the front-end can
/// render it from the API origin. Responses are cacheable for five minutes.
#[utoipa::path(
    get,
    path = "/api/users/image",
    params(ImageQuery),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 400, description = "Missing filename", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn proxy_user_image(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> AppResult<impl IntoResponse> {
    let filename = query
        .filename
        .map(|f| object_name_from_url(f.trim()))
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::BadRequest("filename is required".to_string()))?;

    let object = state
        .storage
        .fetch(&format!("{UPLOAD_PREFIX}/{filename}"))
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            (header::CACHE_CONTROL, "public, max-age=300".to_string()),
        ],
        object.bytes,
    ))
}
