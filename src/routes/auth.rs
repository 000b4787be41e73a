use crate::{AppState, handlers::auth};
use axum::{Router, routing::post};

/// Auth Router Module
///
/// The admin session lifecycle. Mounted at `/api/auth`; tokens travel in cookies
/// set by these handlers.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/admin-login", post(auth::admin_login))
        .route("/admin-refresh-token", post(auth::admin_refresh_token))
        .route("/admin-logout", post(auth::admin_logout))
        .route("/admin-verify-token", post(auth::admin_verify_token))
        // Both answer 501 until password recovery exists.
        .route("/forgot-password", post(auth::forgot_password))
        .route("/admin-reset-password", post(auth::admin_reset_password))
}
