use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderName, header, request::Parts},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::AppError,
    models::{ROLE_ADMIN, UserResponse},
};

pub const ACCESS_COOKIE: &str = "admin_access_token";
pub const REFRESH_COOKIE: &str = "admin_refresh_token";
pub const USER_COOKIE: &str = "admin_user";

/// Claims
///
/// Payload of both access and refresh tokens. The two kinds are told apart only by
/// the secret that signed them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Public UUID of the user.
    pub user_id: Uuid,
    /// Role at issue time. Authorization trusts this value without a database lookup.
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// TokenService
///
/// Issues and verifies HS256 tokens. Access and refresh tokens use separate secrets,
/// so a refresh token is never accepted where an access token is expected.
#[derive(Clone)]
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_secret: access_secret.to_string(),
            refresh_secret: refresh_secret.to_string(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            &config.jwt_refresh_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue_access(&self, user_id: Uuid, role: &str) -> Result<IssuedToken, TokenError> {
        issue(&self.access_secret, self.access_ttl, user_id, role)
    }

    pub fn issue_refresh(&self, user_id: Uuid, role: &str) -> Result<IssuedToken, TokenError> {
        issue(&self.refresh_secret, self.refresh_ttl, user_id, role)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        verify(&self.access_secret, token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        verify(&self.refresh_secret, token)
    }
}

fn issue(secret: &str, ttl: Duration, user_id: Uuid, role: &str) -> Result<IssuedToken, TokenError> {
    let now = Utc::now();
    let ttl = chrono::Duration::from_std(ttl).map_err(|e| TokenError::Signing(e.to_string()))?;
    let expires_at = now + ttl;

    let claims = Claims {
        user_id,
        role: role.to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))?;

    Ok(IssuedToken { token, expires_at })
}

fn verify(secret: &str, token: &str) -> Result<Claims, TokenError> {
    // Pinning the algorithm rejects `none` and asymmetric tokens outright.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

// --- Passwords ---

/// hash_password
///
/// Argon2id with a random salt, encoded as a PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Returns false for a wrong password and for an unparseable stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match argon2::PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored password hash is malformed: {e}");
            false
        }
    }
}

// --- Cookies ---

/// AuthCookie
///
/// One `Set-Cookie` header. Every session cookie lives on `Path=/`; production
/// marks them `Secure` with `SameSite=None` so the admin panel can call the API
/// cross-site.
#[derive(Debug, Clone)]
pub struct AuthCookie {
    pub name: &'static str,
    pub value: String,
    pub max_age_seconds: u64,
    pub http_only: bool,
    pub secure: bool,
}

impl AuthCookie {
    pub fn to_header_value(&self) -> String {
        let mut parts = vec![
            format!("{}={}", self.name, self.value),
            format!("Max-Age={}", self.max_age_seconds),
            "Path=/".to_string(),
        ];

        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        if self.secure {
            parts.push("SameSite=None".to_string());
            parts.push("Secure".to_string());
        } else {
            parts.push("SameSite=Lax".to_string());
        }

        parts.join("; ")
    }
}

pub type SetCookieHeaders = Vec<(HeaderName, String)>;

/// session_cookies
///
/// The three cookies written on login and refresh: both tokens (HttpOnly) and a
/// URL-encoded JSON copy of the user that the admin UI can read.
pub fn session_cookies(
    access: &IssuedToken,
    refresh: &IssuedToken,
    user: &UserResponse,
    tokens: &TokenService,
    secure: bool,
) -> Result<SetCookieHeaders, AppError> {
    let user_json =
        serde_json::to_string(user).map_err(|e| AppError::Internal(e.to_string()))?;
    let user_value: String = url::form_urlencoded::byte_serialize(user_json.as_bytes()).collect();

    let cookies = [
        AuthCookie {
            name: ACCESS_COOKIE,
            value: access.token.clone(),
            max_age_seconds: tokens.access_ttl().as_secs(),
            http_only: true,
            secure,
        },
        AuthCookie {
            name: REFRESH_COOKIE,
            value: refresh.token.clone(),
            max_age_seconds: tokens.refresh_ttl().as_secs(),
            http_only: true,
            secure,
        },
        AuthCookie {
            name: USER_COOKIE,
            value: user_value,
            max_age_seconds: tokens.refresh_ttl().as_secs(),
            http_only: false,
            secure,
        },
    ];

    Ok(to_headers(&cookies))
}

/// Expires every session cookie.
pub fn clear_session_cookies(secure: bool) -> SetCookieHeaders {
    let cookies = [ACCESS_COOKIE, REFRESH_COOKIE, USER_COOKIE].map(|name| AuthCookie {
        name,
        value: String::new(),
        max_age_seconds: 0,
        http_only: name != USER_COOKIE,
        secure,
    });

    to_headers(&cookies)
}

fn to_headers(cookies: &[AuthCookie]) -> SetCookieHeaders {
    cookies
        .iter()
        .map(|c| (header::SET_COOKIE, c.to_header_value()))
        .collect()
}

/// Reads a cookie by name from the request headers.
pub fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Access token from the `admin_access_token` cookie, falling back to a Bearer header.
fn access_token(parts: &Parts) -> Option<String> {
    cookie_value(parts, ACCESS_COOKIE).or_else(|| {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string)
            .filter(|v| !v.is_empty())
    })
}

// --- Extractors ---

/// AuthUser
///
/// Identity resolved from a valid access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: String,
}

/// AuthUser Extractor Implementation
///
/// Rejects with 401 when the token is absent, malformed, forged or expired. No
/// database lookup happens here; revocation takes effect when the token expires.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);

        let token = access_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing access token".to_string()))?;

        let claims = tokens.verify_access(&token).map_err(|e| {
            tracing::debug!("access token rejected: {e}");
            AppError::Unauthorized("invalid or expired token".to_string())
        })?;

        Ok(AuthUser {
            id: claims.user_id,
            role: claims.role,
        })
    }
}

/// AdminUser
///
/// An `AuthUser` whose role is `admin`. Any other role gets 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if user.role != ROLE_ADMIN {
            tracing::warn!(user_id = %user.id, role = %user.role, "admin route refused");
            return Err(AppError::Forbidden(
                "forbidden: insufficient role".to_string(),
            ));
        }

        Ok(AdminUser(user))
    }
}
