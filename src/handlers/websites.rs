use axum::{
    Json,
    extract::{FromRequest, Path, Request, State},
    http::header,
};

use super::{AppJson, FormData, parse_uuid, release_media, upload_optional};
use crate::{
    AppState,
    error::{AppError, AppResult, ErrorResponse},
    models::{DataResponse, MessageResponse, Website, WebsiteInput, WebsiteMedia, WebsiteResponse},
};

const UPLOAD_PREFIX: &str = "websites";

fn not_found() -> AppError {
    AppError::NotFound("website not found".to_string())
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// WebsitePayload
///
/// A settings update read from either body encoding, plus the URLs of any files it
/// uploaded so a failed write can release them.
struct WebsitePayload {
    input: WebsiteInput,
    uploaded: Vec<String>,
}

impl WebsitePayload {
    async fn read(state: &AppState, request: Request) -> AppResult<Self> {
        if !is_multipart(&request) {
            let AppJson(input) = AppJson::<WebsiteInput>::from_request(request, state).await?;
            return Ok(Self {
                input,
                uploaded: Vec::new(),
            });
        }

        let mut form = FormData::from_request(request, state).await?;

        let mut input = WebsiteInput {
            address: form.text("address"),
            phone_number: form.text("phone_number"),
            email: form.text("email"),
            url_instagram: form.text("url_instagram"),
            url_facebook: form.text("url_facebook"),
            url_tiktok: form.text_any(&["url_tiktok", "url_tikTok"]),
            about_us_brief_home_en: form.text("about_us_brief_home_en"),
            about_us_brief_home_id: form.text("about_us_brief_home_id"),
            about_us_en: form.text("about_us_en"),
            about_us_id: form.text("about_us_id"),
            meta_title: form.text("meta_title"),
            meta_desc: form.text_any(&["meta_description", "meta_desc"]),
            meta_keyword: form.text_any(&["meta_keywords", "meta_keyword"]),
            ..Default::default()
        };

        let mut uploaded = Vec::new();
        let files = [
            (WebsiteMedia::OgImage, form.take_file("ogImage").or_else(|| form.take_file("og_image"))),
            (WebsiteMedia::VideoWeb, form.take_file("video_web")),
            (WebsiteMedia::VideoMobile, form.take_file("video_mobile")),
        ];
        for (field, file) in files {
            let url = match upload_optional(&state.storage, UPLOAD_PREFIX, file).await {
                Ok(Some(url)) => url,
                Ok(None) => continue,
                Err(e) => {
                    release_media(&state.storage, uploaded).await;
                    return Err(e);
                }
            };
            uploaded.push(url.clone());
            match field {
                WebsiteMedia::OgImage => input.og_image = url,
                WebsiteMedia::VideoWeb => input.video_web = url,
                WebsiteMedia::VideoMobile => input.video_mobile = url,
            }
        }

        Ok(Self { input, uploaded })
    }
}

/// Media the update overwrote: old URLs whose field now holds something else.
fn replaced_media(before: &Website, after: &Website) -> Vec<String> {
    [
        (&before.og_image, &after.og_image),
        (&before.video_web, &after.video_web),
        (&before.video_mobile, &after.video_mobile),
    ]
    .into_iter()
    .filter_map(|(old, new)| match old {
        Some(old) if new.as_ref() != Some(old) => Some(old.clone()),
        _ => None,
    })
    .collect()
}

/// get_website
///
/// [Public Route] The single settings record, or `{"data": null}` before one is
/// created.
#[utoipa::path(
    get,
    path = "/api/websites",
    responses((status = 200, description = "Website settings, `data` is null when none exists", body = DataResponse<WebsiteResponse>))
)]
pub async fn get_website(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<WebsiteResponse>>>> {
    let website = state.repo.get_website().await?;
    Ok(Json(DataResponse::new(website.as_ref().map(WebsiteResponse::from))))
}

/// create_website
///
/// [Admin Route] JSON `WebsiteInput`, or a multipart form with `meta_title`,
/// `meta_keywords`, `meta_description` and the `ogImage`, `video_web` and
/// `video_mobile` files. Empty fields are left unset.
#[utoipa::path(
    post,
    path = "/api/websites/submit",
    request_body(content = WebsiteInput, description = "JSON or multipart/form-data"),
    responses(
        (status = 200, description = "Created", body = DataResponse<WebsiteResponse>),
        (status = 400, description = "Malformed body", body = ErrorResponse)
    )
)]
pub async fn create_website(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<DataResponse<WebsiteResponse>>> {
    let payload = WebsitePayload::read(&state, request).await?;

    match state.repo.create_website(&payload.input).await {
        Ok(website) => {
            tracing::info!(website_id = %website.uuid, "website settings created");
            Ok(Json(DataResponse::new(WebsiteResponse::from(&website))))
        }
        Err(e) => {
            release_media(&state.storage, payload.uploaded).await;
            Err(e.into())
        }
    }
}

/// update_website
///
/// [Admin Route] Same body as creation; only non-empty fields overwrite. Media
/// replaced by a new upload is released from storage.
#[utoipa::path(
    put,
    path = "/api/websites/{uuid}",
    request_body(content = WebsiteInput, description = "JSON or multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = DataResponse<WebsiteResponse>),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_website(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    request: Request,
) -> AppResult<Json<DataResponse<WebsiteResponse>>> {
    let uuid = parse_uuid(&uuid)?;
    let existing = state
        .repo
        .get_website_by_uuid(uuid)
        .await?
        .ok_or_else(not_found)?;

    let payload = WebsitePayload::read(&state, request).await?;

    let website = match state.repo.update_website(uuid, &payload.input).await {
        Ok(Some(website)) => website,
        Ok(None) => {
            release_media(&state.storage, payload.uploaded).await;
            return Err(not_found());
        }
        Err(e) => {
            release_media(&state.storage, payload.uploaded).await;
            return Err(e.into());
        }
    };

    release_media(&state.storage, replaced_media(&existing, &website)).await;

    Ok(Json(DataResponse::new(WebsiteResponse::from(&website))))
}

/// delete_website_media
///
/// [Admin Route] Clears one media field (`video_web`, `video_mobile` or
/// `og_image`) and releases the object it pointed at.
#[utoipa::path(
    delete,
    path = "/api/websites/{uuid}/{field}",
    responses(
        (status = 200, description = "Media removed", body = MessageResponse),
        (status = 400, description = "Unknown field", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_website_media(
    State(state): State<AppState>,
    Path((uuid, field)): Path<(String, String)>,
) -> AppResult<Json<MessageResponse>> {
    let uuid = parse_uuid(&uuid)?;
    let field = WebsiteMedia::parse(&field)
        .ok_or_else(|| AppError::BadRequest(format!("invalid media field: {field}")))?;

    let previous = state.repo.clear_website_media(uuid, field).await?;
    release_media(&state.storage, previous).await;

    Ok(Json(MessageResponse::new(
        "Website information deleted successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaced_media_ignores_unchanged_and_empty_fields() {
        let before = Website {
            og_image: Some("og-old".into()),
            video_web: Some("web".into()),
            video_mobile: None,
            ..Default::default()
        };
        let after = Website {
            og_image: Some("og-new".into()),
            video_web: Some("web".into()),
            video_mobile: Some("mobile".into()),
            ..Default::default()
        };
        assert_eq!(replaced_media(&before, &after), vec!["og-old".to_string()]);
    }
}
