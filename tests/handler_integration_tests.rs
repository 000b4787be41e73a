mod common;

use axum::http::StatusCode;
use common::{MultipartForm, TestApp, spawn_app};
use luminor_backend::{
    models::{Category, CategoryInput, User},
    repository::Repository,
    storage::MOCK_PUBLIC_URL,
};
use serde_json::{Value, json};

// --- Helpers ---

async fn seed_category(app: &TestApp, name: &str, published: bool) -> Category {
    app.repo
        .create_category(CategoryInput {
            name: name.to_string(),
            description: format!("{name} description"),
            is_published: published,
            photo_url: None,
        })
        .await
        .unwrap()
}

async fn seed_photographer(app: &TestApp, name: &str) -> User {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    app.seed_user(name, &email, "photographer", None).await
}

fn album_form(slug: &str, category: &Category, user: &User, published: bool) -> MultipartForm {
    MultipartForm::new()
        .text("slug", slug)
        .text("title", &format!("Album {slug}"))
        .text("description", "A day in the hills")
        .text("category_id", &category.uuid.to_string())
        .text("user_id", &user.uuid.to_string())
        .text("is_published", if published { "true" } else { "false" })
}

async fn create_album(app: &TestApp, cookie: &str, form: MultipartForm) -> Value {
    let response = app
        .send_form("POST", "/api/albums/submit", Some(cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.message());
    response.json()["data"].clone()
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

// --- Admin guard ---

#[tokio::test]
async fn test_admin_routes_require_a_session() {
    let app = spawn_app();

    let response = app.get("/api/users/lists", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "missing access token");

    let response = app
        .get("/api/users/lists", Some("admin_access_token=not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "invalid or expired token");
}

#[tokio::test]
async fn test_admin_routes_reject_other_roles() {
    let app = spawn_app();
    let photographer = app
        .seed_user("Photo Grapher", "pg@example.com", "photographer", Some("pw"))
        .await;
    let cookie = app.session_cookie(&photographer);

    for uri in ["/api/users/lists", "/api/categories/lists", "/api/faqs/lists"] {
        let response = app.get(uri, Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(response.message(), "forbidden: insufficient role");
    }
}

#[tokio::test]
async fn test_admin_routes_accept_bearer_tokens() {
    let app = spawn_app();
    let admin = app.seed_admin().await;
    let token = app.state.tokens.issue_access(admin.uuid, &admin.role).unwrap();

    let request = axum::http::Request::builder()
        .uri("/api/faqs/lists")
        .header("authorization", format!("Bearer {}", token.token))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_guard_runs_before_body_parsing() {
    let app = spawn_app();
    // A malformed body would be a 400; the guard must answer first.
    let response = app
        .send_form("POST", "/api/users/submit", None, MultipartForm::new())
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// --- Users ---

#[tokio::test]
async fn test_create_user_with_photo() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let form = MultipartForm::new()
        .text("name", "Jane Doe")
        .text("email", "jane@example.com")
        .text("role", "photographer")
        .text("description", "Portraits")
        .text("url_tikTok", "https://tiktok.com/@jane")
        .text("is_published", "true")
        .file("photo", "jane portrait.jpg", "image/jpeg", b"jpeg-bytes");

    let response = app
        .send_form("POST", "/api/users/submit", Some(&cookie), form)
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.message());
    let user = &response.json()["data"];
    assert_eq!(user["slug"], "jane-doe");
    assert_eq!(user["url_tiktok"], "https://tiktok.com/@jane");
    assert_eq!(user["can_login"], false);
    assert_eq!(user["is_published"], true);
    assert!(user.get("password").is_none());

    let photo = user["photo"].as_str().unwrap();
    assert!(photo.starts_with(&format!("{MOCK_PUBLIC_URL}/users/")));
    assert!(photo.ends_with("_jane-portrait.jpg"));
    assert_eq!(app.storage.stored_keys().len(), 1);
}

#[tokio::test]
async fn test_create_user_stores_password_only_for_login_accounts() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let form = MultipartForm::new()
        .text("name", "Editor")
        .text("email", "editor@example.com")
        .text("role", "admin")
        .text("password", "editor-pass");
    let response = app
        .send_form("POST", "/api/users/submit", Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"]["can_login"], true);

    let stored = app
        .repo
        .get_user_by_email("editor@example.com")
        .await
        .unwrap()
        .unwrap();
    let hash = stored.password.unwrap();
    assert_ne!(hash, "editor-pass");
    assert!(luminor_backend::auth::verify_password("editor-pass", &hash));

    let form = MultipartForm::new()
        .text("name", "Guest")
        .text("email", "guest@example.com")
        .text("role", "photographer")
        .text("password", "ignored")
        .text("can_login", "false");
    let response = app
        .send_form("POST", "/api/users/submit", Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let stored = app
        .repo
        .get_user_by_email("guest@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.password.is_none());
}

#[tokio::test]
async fn test_create_user_validation_and_conflict() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let form = MultipartForm::new().text("name", "No Email").text("role", "photographer");
    let response = app
        .send_form("POST", "/api/users/submit", Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "name, email, and role are required");

    let form = MultipartForm::new()
        .text("name", "Someone Else")
        .text("email", common::ADMIN_EMAIL)
        .text("role", "photographer")
        .file("photo", "dup.jpg", "image/jpeg", b"bytes");
    let response = app
        .send_form("POST", "/api/users/submit", Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    // The photo uploaded for the rejected row is released again.
    assert!(app.storage.stored_keys().is_empty());
    assert_eq!(app.storage.deleted_urls().len(), 1);
}

#[tokio::test]
async fn test_update_user_replaces_photo() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let form = MultipartForm::new()
        .text("name", "Jane Doe")
        .text("email", "jane@example.com")
        .text("role", "photographer")
        .file("photo", "old.jpg", "image/jpeg", b"old");
    let created = app
        .send_form("POST", "/api/users/submit", Some(&cookie), form)
        .await
        .json();
    let uuid = created["data"]["uuid"].as_str().unwrap().to_string();
    let old_photo = created["data"]["photo"].as_str().unwrap().to_string();

    let form = MultipartForm::new()
        .text("name", "Jane Smith")
        .text("email", "jane@example.com")
        .text("role", "photographer")
        .file("photo", "new.jpg", "image/jpeg", b"new");
    let response = app
        .send_form("PUT", &format!("/api/users/{uuid}"), Some(&cookie), form)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let user = &response.json()["data"];
    assert_eq!(user["slug"], "jane-smith");
    assert_ne!(user["photo"].as_str().unwrap(), old_photo);
    assert_eq!(app.storage.deleted_urls(), vec![old_photo]);
}

#[tokio::test]
async fn test_user_photo_and_deletion() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let form = MultipartForm::new()
        .text("name", "Jane Doe")
        .text("email", "jane@example.com")
        .text("role", "photographer")
        .file("photo", "me.jpg", "image/jpeg", b"me");
    let created = app
        .send_form("POST", "/api/users/submit", Some(&cookie), form)
        .await
        .json();
    let uuid = created["data"]["uuid"].as_str().unwrap().to_string();
    let photo = created["data"]["photo"].as_str().unwrap().to_string();

    let response = app
        .send_empty("PATCH", &format!("/api/users/{uuid}"), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "image deleted successfully");
    assert_eq!(app.storage.deleted_urls(), vec![photo]);

    let fetched = app.get(&format!("/api/users/{uuid}"), Some(&cookie)).await;
    assert!(fetched.json()["data"]["photo"].is_null());

    let response = app
        .send_empty("DELETE", &format!("/api/users/{uuid}"), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "deleted successfully");

    let response = app.get(&format!("/api/users/{uuid}"), Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "user not found");
}

#[tokio::test]
async fn test_user_list_paging_and_search() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    seed_photographer(&app, "Ana Lee").await;
    seed_photographer(&app, "Budi Santoso").await;

    let response = app
        .get("/api/users/lists?page=1&limit=2&search=budi", Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["data"][0]["name"], "Budi Santoso");

    let response = app.get("/api/users/lists?page=abc", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid page parameter");

    let response = app.get("/api/users/not-a-uuid", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_pages_past_i64_are_rejected() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    seed_category(&app, "Wedding", true).await;

    let response = app
        .get("/api/users/lists?page=9223372036854775807", Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid page parameter");

    let response = app
        .get("/api/albums/category/wedding?page=9223372036854775807&limit=2", None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid page parameter");

    // The last representable window is still a valid (empty) page.
    let response = app
        .get("/api/albums/category/wedding?page=9223372036854775807&limit=1", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["next"], 0);
}

#[tokio::test]
async fn test_portfolio_only_shows_published_users() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    let category = seed_category(&app, "Weddings", true).await;
    let user = seed_photographer(&app, "Ana Lee").await;
    create_album(&app, &cookie, album_form("ana-wedding", &category, &user, true)).await;

    let response = app.get("/api/users/portfolio/ana-lee", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["data"]["users"]["name"], "Ana Lee");
    assert_eq!(body["data"]["categories"][0]["slug"], "weddings");

    let hidden = app
        .repo
        .create_user(luminor_backend::models::UserInput {
            name: "Hidden Person".into(),
            email: "hidden@example.com".into(),
            role: "photographer".into(),
            is_published: false,
            ..Default::default()
        })
        .await
        .unwrap();
    let response = app
        .get(&format!("/api/users/portfolio/{}", hidden.slug), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_image_proxy() {
    let app = spawn_app();
    app.storage
        .insert_object("users/avatar.png", b"png-bytes", "image/png");

    let response = app.get("/api/users/image", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "filename is required");

    let response = app.get("/api/users/image?filename=avatar.png", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"png-bytes");
    assert_eq!(response.headers["content-type"], "image/png");
    assert_eq!(response.headers["cache-control"], "public, max-age=300");

    // A full public URL is reduced to its object name.
    let url = format!("{MOCK_PUBLIC_URL}/users/avatar.png");
    let response = app
        .get(&format!("/api/users/image?filename={url}"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

// --- Categories ---

#[tokio::test]
async fn test_category_lifecycle() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let form = MultipartForm::new()
        .text("name", "Wedding Stories")
        .text("description", "Vows and dances")
        .text("is_published", "false")
        .file("image", "cover.jpg", "image/jpeg", b"cover");
    let response = app
        .send_form("POST", "/api/categories/submit", Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.message());
    let category = response.json()["data"].clone();
    assert_eq!(category["slug"], "wedding-stories");
    let uuid = category["uuid"].as_str().unwrap().to_string();

    // Unpublished categories stay off the public endpoints.
    let public = app.get("/api/categories", None).await.json();
    assert!(public["data"].as_array().unwrap().is_empty());
    let response = app.get("/api/categories/slug/wedding-stories", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "category not found");

    let response = app
        .send_json(
            "PUT",
            &format!("/api/categories/{uuid}"),
            Some(&cookie),
            json!({ "name": "Weddings", "description": "Updated", "is_published": true }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let updated = &response.json()["data"];
    assert_eq!(updated["slug"], "weddings");
    assert_eq!(updated["photo_url"], category["photo_url"]);

    let public = app.get("/api/categories", None).await.json();
    assert_eq!(public["data"].as_array().unwrap().len(), 1);
    let options = app.get("/api/categories/options", None).await.json();
    assert_eq!(options["data"][0]["name"], "Weddings");

    let response = app.get("/api/categories/slug/weddings", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["data"]["users"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_category_validation_and_conflict() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    seed_category(&app, "Portraits", true).await;

    let form = MultipartForm::new().text("description", "no name");
    let response = app
        .send_form("POST", "/api/categories/submit", Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "name is required");

    let form = MultipartForm::new().text("name", "portraits");
    let response = app
        .send_form("POST", "/api/categories/submit", Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_unknown_category_is_not_found_even_when_name_collides() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    seed_category(&app, "Portraits", true).await;

    let response = app
        .send_json(
            "PUT",
            &format!("/api/categories/{}", uuid::Uuid::new_v4()),
            Some(&cookie),
            json!({ "name": "Portraits", "description": "", "is_published": true }),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "category not found");
}

#[tokio::test]
async fn test_category_slug_lists_photographers_with_published_albums() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    let category = seed_category(&app, "Travel", true).await;
    let ana = seed_photographer(&app, "Ana Lee").await;
    let budi = seed_photographer(&app, "Budi Santoso").await;

    create_album(&app, &cookie, album_form("bali", &category, &ana, true)).await;
    create_album(&app, &cookie, album_form("draft", &category, &budi, false)).await;

    let response = app.get("/api/categories/slug/travel", None).await;
    let users = response.json()["data"]["users"].clone();
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["name"], "Ana Lee");
}

#[tokio::test]
async fn test_delete_category_cascades_media() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    let category = seed_category(&app, "Events", true).await;
    let user = seed_photographer(&app, "Ana Lee").await;

    let form = album_form("gala", &category, &user, true)
        .file("images[]", "one.jpg", "image/jpeg", b"1")
        .file("thumbnail", "thumb.jpg", "image/jpeg", b"t");
    create_album(&app, &cookie, form).await;
    assert_eq!(app.storage.stored_keys().len(), 2);

    let response = app
        .send_empty(
            "DELETE",
            &format!("/api/categories/{}", category.uuid),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.storage.stored_keys().is_empty());

    let latest = app.get("/api/albums", None).await.json();
    assert!(latest["data"].as_array().unwrap().is_empty());
}

// --- Albums ---

#[tokio::test]
async fn test_create_album_uploads_images_and_thumbnail() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    let category = seed_category(&app, "Weddings", true).await;
    let user = seed_photographer(&app, "Ana Lee").await;

    let form = album_form("garden-wedding", &category, &user, true)
        .text("youtube_url", "https://youtu.be/xyz")
        .file("images[]", "a.jpg", "image/jpeg", b"a")
        .file("images[]", "b.jpg", "image/jpeg", b"b")
        .file("thumbnail", "cover.jpg", "image/jpeg", b"c");
    let album = create_album(&app, &cookie, form).await;

    assert_eq!(album["slug"], "garden-wedding");
    assert_eq!(album["category_id"], category.uuid.to_string());
    assert_eq!(album["category_slug"], "weddings");
    assert_eq!(album["user_id"], user.uuid.to_string());
    assert_eq!(album["user_slug"], "ana-lee");
    assert_eq!(strings(&album["images"]).len(), 2);
    assert!(
        album["thumbnail"]
            .as_str()
            .unwrap()
            .starts_with(&format!("{MOCK_PUBLIC_URL}/albums/"))
    );
    assert_eq!(app.storage.stored_keys().len(), 3);
}

#[tokio::test]
async fn test_create_album_validation() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    let category = seed_category(&app, "Weddings", true).await;
    let user = seed_photographer(&app, "Ana Lee").await;

    let form = MultipartForm::new().text("slug", "x").text("title", "X");
    let response = app
        .send_form("POST", "/api/albums/submit", Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.message(),
        "slug, title, category_id, description, and user_id are required"
    );

    let form = MultipartForm::new()
        .text("slug", "x")
        .text("title", "X")
        .text("description", "d")
        .text("category_id", "42")
        .text("user_id", &user.uuid.to_string());
    let response = app
        .send_form("POST", "/api/albums/submit", Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "invalid category_id");

    create_album(&app, &cookie, album_form("taken", &category, &user, true)).await;
    let form = album_form("taken", &category, &user, true)
        .file("images[]", "dup.jpg", "image/jpeg", b"d");
    let response = app
        .send_form("POST", "/api/albums/submit", Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(app.storage.stored_keys().is_empty());
}

#[tokio::test]
async fn test_latest_albums_only_published() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    let open = seed_category(&app, "Open", true).await;
    let hidden = seed_category(&app, "Hidden", false).await;
    let user = seed_photographer(&app, "Ana Lee").await;

    for i in 0..7 {
        create_album(&app, &cookie, album_form(&format!("open-{i}"), &open, &user, true)).await;
    }
    create_album(&app, &cookie, album_form("draft", &open, &user, false)).await;
    create_album(&app, &cookie, album_form("secret", &hidden, &user, true)).await;

    let latest = app.get("/api/albums", None).await.json();
    let slugs: Vec<String> = latest["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["slug"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(slugs.len(), 6);
    assert!(slugs.iter().all(|s| s.starts_with("open-")));

    // The admin list sees everything.
    let all = app.get("/api/albums/lists?limit=50", Some(&cookie)).await.json();
    assert_eq!(all["total"], 9);
}

#[tokio::test]
async fn test_albums_by_category_pages_with_next() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    let category = seed_category(&app, "Weddings", true).await;
    let user = seed_photographer(&app, "Ana Lee").await;

    for i in 0..3 {
        create_album(&app, &cookie, album_form(&format!("w-{i}"), &category, &user, true)).await;
    }

    let first = app
        .get("/api/albums/category/weddings?page=1&limit=2", None)
        .await
        .json();
    assert_eq!(first["data"].as_array().unwrap().len(), 2);
    assert_eq!(first["next"], 2);

    let second = app
        .get("/api/albums/category/weddings?page=2&limit=2", None)
        .await
        .json();
    assert_eq!(second["data"].as_array().unwrap().len(), 1);
    assert_eq!(second["next"], 0);

    let unknown = app.get("/api/albums/category/nope", None).await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(unknown.json()["next"], 0);
}

#[tokio::test]
async fn test_update_album_keeps_listed_media_and_releases_the_rest() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    let category = seed_category(&app, "Weddings", true).await;
    let user = seed_photographer(&app, "Ana Lee").await;

    let form = album_form("garden", &category, &user, true)
        .file("images[]", "a.jpg", "image/jpeg", b"a")
        .file("images[]", "b.jpg", "image/jpeg", b"b");
    let album = create_album(&app, &cookie, form).await;
    let uuid = album["uuid"].as_str().unwrap().to_string();
    let images = strings(&album["images"]);
    let (keep, drop) = (images[0].clone(), images[1].clone());

    let form = album_form("garden", &category, &user, true)
        .text("media_url", &format!("\"{keep}\""))
        .file("images[]", "c.jpg", "image/jpeg", b"c");
    let response = app
        .send_form("PUT", &format!("/api/albums/{uuid}"), Some(&cookie), form)
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.message());
    let updated = strings(&response.json()["data"]["images"]);
    assert_eq!(updated.len(), 2);
    assert_eq!(updated[0], keep);
    assert!(updated[1].ends_with("_c.jpg"));
    assert_eq!(app.storage.deleted_urls(), vec![drop]);
}

#[tokio::test]
async fn test_update_album_without_media_url_appends() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    let category = seed_category(&app, "Weddings", true).await;
    let user = seed_photographer(&app, "Ana Lee").await;

    let form = album_form("garden", &category, &user, true)
        .file("images[]", "a.jpg", "image/jpeg", b"a")
        .file("thumbnail", "t.jpg", "image/jpeg", b"t");
    let album = create_album(&app, &cookie, form).await;
    let uuid = album["uuid"].as_str().unwrap().to_string();
    let thumbnail = album["thumbnail"].as_str().unwrap().to_string();

    let form = album_form("garden", &category, &user, true)
        .file("images[]", "b.jpg", "image/jpeg", b"b");
    let response = app
        .send_form("PUT", &format!("/api/albums/{uuid}"), Some(&cookie), form)
        .await;

    let updated = &response.json()["data"];
    assert_eq!(strings(&updated["images"]).len(), 2);
    assert_eq!(updated["thumbnail"], thumbnail.as_str());
    assert!(app.storage.deleted_urls().is_empty());
}

#[tokio::test]
async fn test_remove_single_album_image() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    let category = seed_category(&app, "Weddings", true).await;
    let user = seed_photographer(&app, "Ana Lee").await;

    let form = album_form("garden", &category, &user, true)
        .file("images[]", "a.jpg", "image/jpeg", b"a")
        .file("images[]", "b.jpg", "image/jpeg", b"b");
    let album = create_album(&app, &cookie, form).await;
    let uuid = album["uuid"].as_str().unwrap().to_string();
    let images = strings(&album["images"]);
    let uri = format!("/api/albums/images/{uuid}");

    let response = app
        .send_json("PATCH", &uri, Some(&cookie), json!({ "image_url": "" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "image_url is required in body");

    let response = app
        .send_json("PATCH", &uri, Some(&cookie), json!({ "image_url": "missing.jpg" }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "image not found in album");

    // Matching falls back to the file name when the URL differs.
    let basename = images[0].rsplit('/').next().unwrap();
    let response = app
        .send_json(
            "PATCH",
            &uri,
            Some(&cookie),
            json!({ "image_url": format!("https://other-host/{basename}") }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "image deleted successfully");
    assert_eq!(app.storage.deleted_urls(), vec![images[0].clone()]);

    let album = app.get(&format!("/api/albums/{uuid}"), Some(&cookie)).await.json();
    assert_eq!(strings(&album["data"]["images"]), vec![images[1].clone()]);
}

#[tokio::test]
async fn test_delete_album_releases_media() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;
    let category = seed_category(&app, "Weddings", true).await;
    let user = seed_photographer(&app, "Ana Lee").await;

    let form = album_form("garden", &category, &user, true)
        .file("images[]", "a.jpg", "image/jpeg", b"a")
        .file("thumbnail", "t.jpg", "image/jpeg", b"t");
    let album = create_album(&app, &cookie, form).await;
    let uuid = album["uuid"].as_str().unwrap().to_string();

    let response = app
        .send_empty("DELETE", &format!("/api/albums/{uuid}"), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.storage.deleted_urls().len(), 2);
    assert!(app.storage.stored_keys().is_empty());

    let response = app
        .send_empty("DELETE", &format!("/api/albums/{uuid}"), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "album not found");
}

// --- FAQs ---

fn faq_body(question: &str, published: bool) -> Value {
    json!({
        "question_id": format!("{question}?"),
        "question_en": question,
        "answer_id": "Ya",
        "answer_en": "Yes",
        "is_published": published,
    })
}

#[tokio::test]
async fn test_faq_crud_and_public_visibility() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let response = app
        .send_json("POST", "/api/faqs/submit", Some(&cookie), faq_body("Do you travel", true))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let uuid = response.json()["data"]["uuid"].as_str().unwrap().to_string();

    app.send_json("POST", "/api/faqs/submit", Some(&cookie), faq_body("Draft", false))
        .await;

    let public = app.get("/api/faqs", None).await.json();
    assert_eq!(public["data"].as_array().unwrap().len(), 1);
    assert_eq!(public["data"][0]["question_en"], "Do you travel");

    let admin = app.get("/api/faqs/lists?search=draft", Some(&cookie)).await.json();
    assert_eq!(admin["total"], 1);

    let response = app
        .send_json(
            "PUT",
            &format!("/api/faqs/{uuid}"),
            Some(&cookie),
            faq_body("Do you travel abroad", false),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let public = app.get("/api/faqs", None).await.json();
    assert!(public["data"].as_array().unwrap().is_empty());

    let response = app
        .send_empty("DELETE", &format!("/api/faqs/{uuid}"), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .send_empty("DELETE", &format!("/api/faqs/{uuid}"), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "faq not found");
}

#[tokio::test]
async fn test_faq_requires_every_text_field() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let mut body = faq_body("Question", true);
    body["answer_id"] = json!("  ");
    let response = app
        .send_json("POST", "/api/faqs/submit", Some(&cookie), body)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "answer_id is required");
}

#[tokio::test]
async fn test_json_bodies_missing_keys_are_bad_requests() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let response = app
        .send_json("POST", "/api/faqs/submit", Some(&cookie), json!({ "question_id": "q" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.message().starts_with("Invalid input format"));

    let response = app
        .send_json(
            "PUT",
            &format!("/api/faqs/{}", uuid::Uuid::new_v4()),
            Some(&cookie),
            json!({ "answer_en": "a" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.message().starts_with("Invalid input format"));

    let response = app
        .send_json(
            "PATCH",
            &format!("/api/albums/images/{}", uuid::Uuid::new_v4()),
            Some(&cookie),
            json!({}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "image_url is required in body");
}

#[tokio::test]
async fn test_multipart_endpoints_reject_other_bodies() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let response = app
        .send_json("POST", "/api/users/submit", Some(&cookie), json!({ "name": "Jane" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.message().starts_with("Invalid input format"));
}

// --- Websites ---

#[tokio::test]
async fn test_website_is_null_until_created() {
    let app = spawn_app();
    let response = app.get("/api/websites", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["data"].is_null());
}

#[tokio::test]
async fn test_website_json_create_and_partial_update() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let response = app
        .send_json(
            "POST",
            "/api/websites/submit",
            Some(&cookie),
            json!({
                "address": "Jl. Sunset 1",
                "email": "hello@luminor.id",
                "meta_title": "Luminor",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.message());
    let uuid = response.json()["data"]["uuid"].as_str().unwrap().to_string();

    let response = app
        .send_json(
            "PUT",
            &format!("/api/websites/{uuid}"),
            Some(&cookie),
            json!({ "address": "", "phone_number": "+62 800" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let public = app.get("/api/websites", None).await.json();
    assert_eq!(public["data"]["address"], "Jl. Sunset 1");
    assert_eq!(public["data"]["phone_number"], "+62 800");
    assert_eq!(public["data"]["meta_title"], "Luminor");
}

#[tokio::test]
async fn test_website_rejects_malformed_json() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/websites/submit")
        .header("content-type", "application/json")
        .header("cookie", &cookie)
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.message().starts_with("Invalid input format"));
}

#[tokio::test]
async fn test_website_multipart_media_replacement() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let form = MultipartForm::new()
        .text("meta_title", "Luminor")
        .text("meta_description", "Photography studio")
        .text("meta_keywords", "wedding,portrait")
        .file("ogImage", "og.jpg", "image/jpeg", b"og1")
        .file("video_web", "hero.mp4", "video/mp4", b"vid");
    let response = app
        .send_form("POST", "/api/websites/submit", Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.message());
    let website = response.json()["data"].clone();
    assert_eq!(website["meta_desc"], "Photography studio");
    assert_eq!(website["meta_keyword"], "wedding,portrait");
    let old_og = website["og_image"].as_str().unwrap().to_string();
    let video = website["video_web"].as_str().unwrap().to_string();
    assert!(old_og.starts_with(&format!("{MOCK_PUBLIC_URL}/websites/")));
    let uuid = website["uuid"].as_str().unwrap().to_string();

    let form = MultipartForm::new().file("ogImage", "og2.jpg", "image/jpeg", b"og2");
    let response = app
        .send_form("PUT", &format!("/api/websites/{uuid}"), Some(&cookie), form)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let updated = &response.json()["data"];
    assert_ne!(updated["og_image"].as_str().unwrap(), old_og);
    assert_eq!(updated["video_web"], video.as_str());
    assert_eq!(updated["meta_title"], "Luminor");
    assert_eq!(app.storage.deleted_urls(), vec![old_og]);
}

#[tokio::test]
async fn test_website_media_field_deletion() {
    let app = spawn_app();
    let cookie = app.admin_cookie().await;

    let form = MultipartForm::new().file("video_mobile", "m.mp4", "video/mp4", b"m");
    let website = app
        .send_form("POST", "/api/websites/submit", Some(&cookie), form)
        .await
        .json();
    let uuid = website["data"]["uuid"].as_str().unwrap().to_string();
    let video = website["data"]["video_mobile"].as_str().unwrap().to_string();

    let response = app
        .send_empty(
            "DELETE",
            &format!("/api/websites/{uuid}/address"),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "invalid media field: address");

    let response = app
        .send_empty(
            "DELETE",
            &format!("/api/websites/{uuid}/video_mobile"),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "Website information deleted successfully");
    assert_eq!(app.storage.deleted_urls(), vec![video]);

    let public = app.get("/api/websites", None).await.json();
    assert!(public["data"]["video_mobile"].is_null());
}
