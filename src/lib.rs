use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, HeaderValue, Method, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;
pub mod util;

// Security-segregated routers (public, auth, admin).
pub mod routes;
use auth::{AdminUser, TokenService};
use routes::{admin::admin_routes, auth::auth_routes, public::public_routes};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document for every handler and payload, served at
/// `/api-docs/openapi.json` and browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::admin_login, handlers::auth::admin_refresh_token,
        handlers::auth::admin_logout, handlers::auth::admin_verify_token,
        handlers::auth::forgot_password, handlers::auth::admin_reset_password,
        handlers::users::get_users, handlers::users::get_user, handlers::users::create_user,
        handlers::users::update_user, handlers::users::delete_user,
        handlers::users::delete_user_photo, handlers::users::get_user_portfolio,
        handlers::users::proxy_user_image,
        handlers::categories::get_published_categories, handlers::categories::get_category_options,
        handlers::categories::get_category_by_slug, handlers::categories::get_categories,
        handlers::categories::get_category, handlers::categories::create_category,
        handlers::categories::update_category, handlers::categories::delete_category,
        handlers::categories::delete_category_photo,
        handlers::albums::get_latest_albums, handlers::albums::get_albums_by_category,
        handlers::albums::get_albums, handlers::albums::get_album, handlers::albums::create_album,
        handlers::albums::update_album, handlers::albums::delete_album,
        handlers::albums::delete_album_image,
        handlers::faqs::get_published_faqs, handlers::faqs::get_faqs, handlers::faqs::get_faq,
        handlers::faqs::create_faq, handlers::faqs::update_faq, handlers::faqs::delete_faq,
        handlers::websites::get_website, handlers::websites::create_website,
        handlers::websites::update_website, handlers::websites::delete_website_media,
    ),
    components(
        schemas(
            models::UserResponse, models::UserPortfolioResponse, models::CategoryResponse,
            models::CategoryOption, models::CategoryBySlugResponse, models::AlbumResponse,
            models::AlbumResponseList, models::FaqResponse, models::WebsiteResponse,
            models::MessageResponse, models::TokenResponse, models::VerifyTokenResponse,
            models::LoginRequest, models::DeleteImageRequest, models::CategoryInput,
            models::FaqInput, models::WebsiteInput, error::ErrorResponse,
        )
    ),
    tags(
        (name = "luminor", description = "Luminor photography CMS API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The unified, cheaply cloneable state shared by every request. Extractors pull
/// the piece they need through the `FromRef` impls below.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub storage: StorageState,
    pub config: AppConfig,
    pub tokens: TokenService,
}

impl AppState {
    /// Builds the token service from `config` so both always agree on secrets.
    pub fn new(repo: RepositoryState, storage: StorageState, config: AppConfig) -> Self {
        let tokens = TokenService::from_config(&config);
        Self {
            repo,
            storage,
            config,
            tokens,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> TokenService {
        app_state.tokens.clone()
    }
}

/// require_admin
///
/// Route layer for the admin router. The `AdminUser` extractor rejects the
/// request (401 without a valid token, 403 for other roles) before any handler
/// or body parsing runs.
async fn require_admin(_admin: AdminUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// Credentialed CORS for a configured admin origin, permissive CORS otherwise.
/// Browsers refuse wildcard origins on credentialed requests, so cookies only
/// work cross-site when `CORS_ORIGIN` is set.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]),
        None => CorsLayer::new()
            .allow_methods(Any)
            .allow_origin(Any)
            .allow_headers(Any),
    }
}

/// create_router
///
/// Assembles `/api` from the public, auth and admin routers, then wraps the
/// whole application in request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());
    let x_request_id = HeaderName::from_static("x-request-id");

    let api = Router::new()
        .merge(public_routes())
        .nest("/auth", auth_routes())
        .merge(
            admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin,
            )),
        );

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the `http_request` span with the request id so every log line of one
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
