#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use luminor_backend::{
    AppConfig, AppState, InMemoryRepository, MockStorageService, create_router,
    auth::hash_password,
    models::{ROLE_ADMIN, User, UserInput},
    repository::{Repository, RepositoryState},
    storage::StorageState,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const BOUNDARY: &str = "luminor-test-boundary";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// TestApp
///
/// The full router over in-memory state. The concrete repository and storage are
/// kept so tests can seed data and inspect side effects.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub repo: Arc<InMemoryRepository>,
    pub storage: Arc<MockStorageService>,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_storage(MockStorageService::new())
}

pub fn spawn_app_with_storage(storage: MockStorageService) -> TestApp {
    let repo = Arc::new(InMemoryRepository::new());
    let storage = Arc::new(storage);

    let state = AppState::new(
        repo.clone() as RepositoryState,
        storage.clone() as StorageState,
        AppConfig::default(),
    );

    TestApp {
        router: create_router(state.clone()),
        state,
        repo,
        storage,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn message(&self) -> String {
        self.json()["message"].as_str().unwrap_or_default().to_string()
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    /// Value of a cookie set by this response, if any.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.set_cookies().into_iter().find_map(|c| {
            let pair = c.split(';').next()?.to_string();
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Value,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn send_form(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        form: MultipartForm,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.finish())).unwrap())
            .await
    }

    pub async fn send_empty(&self, method: &str, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Inserts a user directly through the repository.
    pub async fn seed_user(&self, name: &str, email: &str, role: &str, password: Option<&str>) -> User {
        let input = UserInput {
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            password: password.map(|p| hash_password(p).unwrap()),
            can_login: password.is_some(),
            is_published: true,
            ..Default::default()
        };
        self.repo.create_user(input).await.unwrap()
    }

    pub async fn seed_admin(&self) -> User {
        self.seed_user("Admin", ADMIN_EMAIL, ROLE_ADMIN, Some(ADMIN_PASSWORD))
            .await
    }

    /// Cookie header carrying a valid access token for `user`.
    pub fn session_cookie(&self, user: &User) -> String {
        let token = self.state.tokens.issue_access(user.uuid, &user.role).unwrap();
        format!("admin_access_token={}", token.token)
    }

    pub async fn admin_cookie(&self) -> String {
        let admin = self.seed_admin().await;
        self.session_cookie(&admin)
    }
}

/// MultipartForm
///
/// Hand-built `multipart/form-data` body using `BOUNDARY`.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}
