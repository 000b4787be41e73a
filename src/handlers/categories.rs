use axum::{
    Json,
    extract::{Path, Query, State},
};

use super::{AppJson, FormData, ListQuery, parse_uuid, release_media, upload_optional};
use crate::{
    AppState,
    error::{AppError, AppResult, ErrorResponse},
    models::{
        CategoryBySlugResponse, CategoryInput, CategoryOption, CategoryResponse, DataResponse,
        MessageResponse, Paginated, UserResponse,
    },
};

const UPLOAD_PREFIX: &str = "categories";

fn not_found() -> AppError {
    AppError::NotFound("category not found".to_string())
}

fn require_name(input: &CategoryInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    Ok(())
}

// --- Public ---

/// get_published_categories
///
/// [Public Route] Every published category, newest first.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Published categories", body = DataResponse<Vec<CategoryResponse>>))
)]
pub async fn get_published_categories(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CategoryResponse>>>> {
    let categories = state.repo.published_categories().await?;
    Ok(Json(DataResponse::new(
        categories.iter().map(CategoryResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/categories/options",
    responses((status = 200, description = "Select options", body = DataResponse<Vec<CategoryOption>>))
)]
pub async fn get_category_options(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CategoryOption>>>> {
    Ok(Json(DataResponse::new(state.repo.category_options().await?)))
}

/// get_category_by_slug
///
/// [Public Route] A published category with the published photographers who have
/// at least one published album in it.
#[utoipa::path(
    get,
    path = "/api/categories/slug/{slug}",
    responses(
        (status = 200, description = "Category", body = DataResponse<CategoryBySlugResponse>),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_category_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<CategoryBySlugResponse>>> {
    let (category, users) = state
        .repo
        .get_category_by_slug(slug.trim())
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(DataResponse::new(CategoryBySlugResponse {
        uuid: category.uuid,
        name: category.name,
        description: category.description,
        slug: category.slug,
        photo_url: category.photo_url,
        users: users.iter().map(UserResponse::from).collect(),
    })))
}

// --- Admin ---

#[utoipa::path(
    get,
    path = "/api/categories/lists",
    params(ListQuery),
    responses(
        (status = 200, description = "Categories", body = Paginated<CategoryResponse>),
        (status = 400, description = "Invalid paging", body = ErrorResponse)
    )
)]
pub async fn get_categories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<CategoryResponse>>> {
    let page = query.into_page()?;
    let (categories, total) = state.repo.list_categories(&page).await?;

    Ok(Json(Paginated {
        data: categories.iter().map(CategoryResponse::from).collect(),
        total,
        page: page.page,
        limit: page.limit,
    }))
}

#[utoipa::path(
    get,
    path = "/api/categories/{uuid}",
    responses(
        (status = 200, description = "Category", body = DataResponse<CategoryResponse>),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<CategoryResponse>>> {
    let uuid = parse_uuid(&uuid)?;
    let category = state
        .repo
        .get_category_by_uuid(uuid)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(DataResponse::new(CategoryResponse::from(&category))))
}

/// create_category
///
/// [Admin Route] Multipart form with `name`, `description`, `is_published` and an
/// optional `image`. The slug is derived from the name and must be unique.
#[utoipa::path(
    post,
    path = "/api/categories/submit",
    request_body(content_type = "multipart/form-data", description = "Category fields plus optional `image`"),
    responses(
        (status = 200, description = "Created", body = DataResponse<CategoryResponse>),
        (status = 400, description = "Missing name", body = ErrorResponse),
        (status = 409, description = "Slug already exists", body = ErrorResponse)
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    mut form: FormData,
) -> AppResult<Json<DataResponse<CategoryResponse>>> {
    let mut input = CategoryInput {
        name: form.text("name"),
        description: form.text("description"),
        is_published: form.flag("is_published"),
        photo_url: None,
    };
    require_name(&input)?;

    input.photo_url = upload_optional(&state.storage, UPLOAD_PREFIX, form.take_file("image")).await?;
    let uploaded = input.photo_url.clone();

    match state.repo.create_category(input).await {
        Ok(category) => {
            tracing::info!(category_id = %category.uuid, slug = %category.slug, "category created");
            Ok(Json(DataResponse::new(CategoryResponse::from(&category))))
        }
        Err(e) => {
            release_media(&state.storage, uploaded).await;
            Err(e.into())
        }
    }
}

/// update_category
///
/// [Admin Route] JSON edit of name, description and published flag. The slug
/// follows the new name; the photo is untouched.
#[utoipa::path(
    put,
    path = "/api/categories/{uuid}",
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Updated", body = DataResponse<CategoryResponse>),
        (status = 404, description = "Not Found", body = ErrorResponse),
        (status = 409, description = "Slug already exists", body = ErrorResponse)
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    AppJson(input): AppJson<CategoryInput>,
) -> AppResult<Json<DataResponse<CategoryResponse>>> {
    let uuid = parse_uuid(&uuid)?;
    require_name(&input)?;

    let category = state
        .repo
        .update_category(uuid, input)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(DataResponse::new(CategoryResponse::from(&category))))
}

/// delete_category
///
/// [Admin Route] Removes the category and every album filed under it.
#[utoipa::path(
    delete,
    path = "/api/categories/{uuid}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let uuid = parse_uuid(&uuid)?;
    let media = state
        .repo
        .delete_category(uuid)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(category_id = %uuid, media = media.len(), "category deleted");
    release_media(&state.storage, media).await;

    Ok(Json(MessageResponse::new("deleted successfully")))
}

#[utoipa::path(
    patch,
    path = "/api/categories/{uuid}",
    responses(
        (status = 200, description = "Photo removed", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_category_photo(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let uuid = parse_uuid(&uuid)?;
    let previous = state.repo.clear_category_photo(uuid).await?;
    release_media(&state.storage, previous).await;

    Ok(Json(MessageResponse::new("image deleted successfully")))
}
