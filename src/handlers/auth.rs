use axum::{
    Json,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};

use super::AppJson;
use crate::{
    AppState,
    auth::{
        ACCESS_COOKIE, IssuedToken, REFRESH_COOKIE, clear_session_cookies, session_cookies,
        verify_password,
    },
    error::{AppError, AppResult, ErrorResponse},
    models::{
        LoginRequest, MessageResponse, ROLE_ADMIN, TokenResponse, UserResponse,
        VerifyTokenResponse,
    },
};

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

/// admin_login
///
/// [Public Route] Exchanges admin credentials for an access/refresh token pair.
/// Tokens are returned in the body and also set as cookies. Every failure mode
/// (unknown email, wrong password, account without login, non-admin role) gives
/// the same 401 so accounts cannot be enumerated.
#[utoipa::path(
    post,
    path = "/api/auth/admin-login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .repo
        .get_user_by_email(payload.email.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    let hash = user.password.as_deref().ok_or_else(invalid_credentials)?;
    if !verify_password(&payload.password, hash) || user.role != ROLE_ADMIN {
        tracing::info!(email = %user.email, "admin login refused");
        return Err(invalid_credentials());
    }

    let access = state
        .tokens
        .issue_access(user.uuid, &user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let refresh = state
        .tokens
        .issue_refresh(user.uuid, &user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let cookies = session_cookies(
        &access,
        &refresh,
        &UserResponse::from(&user),
        &state.tokens,
        state.config.env.is_production(),
    )?;

    tracing::info!(user_id = %user.uuid, "admin logged in");
    Ok((
        AppendHeaders(cookies),
        Json(TokenResponse {
            admin_access_token: access.token,
            admin_refresh_token: refresh.token,
        }),
    ))
}

/// admin_refresh_token
///
/// [Public Route] Mints a new access token from the refresh cookie. The refresh
/// token itself is not rotated. The user is reloaded so deleted accounts cannot
/// keep refreshing.
#[utoipa::path(
    post,
    path = "/api/auth/admin-refresh-token",
    responses(
        (status = 200, description = "Refreshed", body = TokenResponse),
        (status = 401, description = "Missing or invalid refresh token", body = ErrorResponse)
    )
)]
pub async fn admin_refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let refresh_token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized("missing refresh token".to_string()))?;

    let claims = state.tokens.verify_refresh(&refresh_token).map_err(|e| {
        tracing::debug!("refresh token rejected: {e}");
        AppError::Unauthorized("invalid refresh token".to_string())
    })?;

    let user = state
        .repo
        .get_user_by_uuid(claims.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid refresh token".to_string()))?;

    let access = state
        .tokens
        .issue_access(user.uuid, &user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let refresh = IssuedToken {
        token: refresh_token,
        expires_at: DateTime::<Utc>::from_timestamp(claims.exp as i64, 0).unwrap_or_default(),
    };

    let cookies = session_cookies(
        &access,
        &refresh,
        &UserResponse::from(&user),
        &state.tokens,
        state.config.env.is_production(),
    )?;

    Ok((
        AppendHeaders(cookies),
        Json(TokenResponse {
            admin_access_token: access.token,
            admin_refresh_token: refresh.token,
        }),
    ))
}

/// admin_logout
///
/// [Public Route] Expires all session cookies. Tokens already issued stay valid
/// until they expire.
#[utoipa::path(
    post,
    path = "/api/auth/admin-logout",
    responses((status = 200, description = "Logged out", body = MessageResponse))
)]
pub async fn admin_logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders(clear_session_cookies(state.config.env.is_production())),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// admin_verify_token
///
/// [Public Route] Reports whether the access cookie holds a valid token.
#[utoipa::path(
    post,
    path = "/api/auth/admin-verify-token",
    responses(
        (status = 200, description = "Token is valid", body = VerifyTokenResponse),
        (status = 400, description = "No access cookie", body = ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse)
    )
)]
pub async fn admin_verify_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Json<VerifyTokenResponse>> {
    let token = jar
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("Access token not found in cookie".to_string()))?;

    let claims = state
        .tokens
        .verify_access(&token)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    Ok(Json(VerifyTokenResponse {
        valid: true,
        user_id: claims.user_id,
        role: claims.role,
        expires: DateTime::<Utc>::from_timestamp(claims.exp as i64, 0).unwrap_or_default(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    responses((status = 501, description = "Not implemented", body = ErrorResponse))
)]
pub async fn forgot_password() -> AppError {
    AppError::NotImplemented("Forgot password not implemented".to_string())
}

#[utoipa::path(
    post,
    path = "/api/auth/admin-reset-password",
    responses((status = 501, description = "Not implemented", body = ErrorResponse))
)]
pub async fn admin_reset_password() -> AppError {
    AppError::NotImplemented("Reset password not implemented".to_string())
}
