use crate::{
    AppState,
    handlers::{MAX_UPLOAD_BYTES, albums, categories, faqs, users, websites},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use tower_http::limit::RequestBodyLimitLayer;

/// Admin Router Module
///
/// Content management for the admin panel. Every route here requires an admin
/// session; `create_router` wraps this router in `require_admin` before merging
/// it with the public routes.
///
/// Uploads are buffered in memory, so the default body limit is replaced with
/// `MAX_UPLOAD_BYTES` for this router only.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes())
        .nest("/categories", category_routes())
        .nest("/albums", album_routes())
        .nest("/faqs", faq_routes())
        .nest("/websites", website_routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/lists", get(users::get_users))
        // POST /users/submit (multipart, optional `photo`)
        .route("/submit", post(users::create_user))
        // PATCH removes the photo only.
        .route(
            "/{uuid}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user)
                .patch(users::delete_user_photo),
        )
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/lists", get(categories::get_categories))
        .route("/submit", post(categories::create_category))
        .route(
            "/{uuid}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category)
                .patch(categories::delete_category_photo),
        )
}

fn album_routes() -> Router<AppState> {
    Router::new()
        .route("/lists", get(albums::get_albums))
        // POST /albums/submit (multipart, `images[]` and `thumbnail`)
        .route("/submit", post(albums::create_album))
        .route(
            "/{uuid}",
            get(albums::get_album)
                .put(albums::update_album)
                .delete(albums::delete_album),
        )
        // PATCH /albums/images/{uuid} with `{"image_url": ...}`
        .route("/images/{uuid}", patch(albums::delete_album_image))
}

fn faq_routes() -> Router<AppState> {
    Router::new()
        .route("/lists", get(faqs::get_faqs))
        .route("/submit", post(faqs::create_faq))
        .route(
            "/{uuid}",
            get(faqs::get_faq)
                .put(faqs::update_faq)
                .delete(faqs::delete_faq),
        )
}

fn website_routes() -> Router<AppState> {
    Router::new()
        // JSON or multipart; see `websites::create_website`.
        .route("/submit", post(websites::create_website))
        .route("/{uuid}", axum::routing::put(websites::update_website))
        // DELETE /websites/{uuid}/{field} clears `video_web`, `video_mobile` or `og_image`.
        .route(
            "/{uuid}/{field}",
            axum::routing::delete(websites::delete_website_media),
        )
}
