use crate::{
    AppState,
    handlers::{albums, categories, faqs, users, websites},
};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints consumed by the public front-end. Nothing here needs a session and
/// nothing here returns an unpublished row.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /categories
        // Published categories for the navigation and listing pages.
        .route("/categories", get(categories::get_published_categories))
        .route("/categories/options", get(categories::get_category_options))
        // GET /categories/slug/{slug}
        // Category landing page with the photographers working in it.
        .route("/categories/slug/{slug}", get(categories::get_category_by_slug))
        // GET /albums
        // Home page feed of the latest published albums.
        .route("/albums", get(albums::get_latest_albums))
        // GET /albums/category/{slug}?page=&limit=
        // Infinite scroll: the response carries the next page number, 0 at the end.
        .route("/albums/category/{slug}", get(albums::get_albums_by_category))
        .route("/faqs", get(faqs::get_published_faqs))
        .route("/websites", get(websites::get_website))
        .route("/users/portfolio/{slug}", get(users::get_user_portfolio))
        // GET /users/image?filename=
        // Streams a photographer's photo from the bucket with a short cache lifetime.
        .route("/users/image", get(users::proxy_user_image))
}
