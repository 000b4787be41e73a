use axum::{
    Json,
    extract::{Path, Query, State},
};

use super::{AppJson, ListQuery, parse_uuid};
use crate::{
    AppState,
    error::{AppError, AppResult, ErrorResponse},
    models::{DataResponse, FaqInput, FaqResponse, MessageResponse, Paginated},
};

fn not_found() -> AppError {
    AppError::NotFound("faq not found".to_string())
}

fn validate(input: &FaqInput) -> AppResult<()> {
    match input.missing_field() {
        Some(field) => Err(AppError::BadRequest(format!("{field} is required"))),
        None => Ok(()),
    }
}

/// get_published_faqs
///
/// [Public Route] Published FAQs in both languages.
#[utoipa::path(
    get,
    path = "/api/faqs",
    responses((status = 200, description = "Published FAQs", body = DataResponse<Vec<FaqResponse>>))
)]
pub async fn get_published_faqs(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<FaqResponse>>>> {
    let faqs = state.repo.published_faqs().await?;
    Ok(Json(DataResponse::new(faqs.iter().map(FaqResponse::from).collect())))
}

/// get_faqs
///
/// [Admin Route] Searches all four question and answer fields.
#[utoipa::path(
    get,
    path = "/api/faqs/lists",
    params(ListQuery),
    responses(
        (status = 200, description = "FAQs", body = Paginated<FaqResponse>),
        (status = 400, description = "Invalid paging", body = ErrorResponse)
    )
)]
pub async fn get_faqs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<FaqResponse>>> {
    let page = query.into_page()?;
    let (faqs, total) = state.repo.list_faqs(&page).await?;

    Ok(Json(Paginated {
        data: faqs.iter().map(FaqResponse::from).collect(),
        total,
        page: page.page,
        limit: page.limit,
    }))
}

#[utoipa::path(
    get,
    path = "/api/faqs/{uuid}",
    responses(
        (status = 200, description = "FAQ", body = DataResponse<FaqResponse>),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn get_faq(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<FaqResponse>>> {
    let uuid = parse_uuid(&uuid)?;
    let faq = state.repo.get_faq_by_uuid(uuid).await?.ok_or_else(not_found)?;
    Ok(Json(DataResponse::new(FaqResponse::from(&faq))))
}

#[utoipa::path(
    post,
    path = "/api/faqs/submit",
    request_body = FaqInput,
    responses(
        (status = 200, description = "Created", body = DataResponse<FaqResponse>),
        (status = 400, description = "Missing field", body = ErrorResponse)
    )
)]
pub async fn create_faq(
    State(state): State<AppState>,
    AppJson(input): AppJson<FaqInput>,
) -> AppResult<Json<DataResponse<FaqResponse>>> {
    validate(&input)?;
    let faq = state.repo.create_faq(input).await?;
    tracing::info!(faq_id = %faq.uuid, "faq created");
    Ok(Json(DataResponse::new(FaqResponse::from(&faq))))
}

#[utoipa::path(
    put,
    path = "/api/faqs/{uuid}",
    request_body = FaqInput,
    responses(
        (status = 200, description = "Updated", body = DataResponse<FaqResponse>),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_faq(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    AppJson(input): AppJson<FaqInput>,
) -> AppResult<Json<DataResponse<FaqResponse>>> {
    let uuid = parse_uuid(&uuid)?;
    validate(&input)?;
    let faq = state.repo.update_faq(uuid, input).await?.ok_or_else(not_found)?;
    Ok(Json(DataResponse::new(FaqResponse::from(&faq))))
}

#[utoipa::path(
    delete,
    path = "/api/faqs/{uuid}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_faq(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let uuid = parse_uuid(&uuid)?;
    if !state.repo.delete_faq(uuid).await? {
        return Err(not_found());
    }
    Ok(Json(MessageResponse::new("deleted successfully")))
}
