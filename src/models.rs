use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "admin";

// --- Database Rows ---

/// User
///
/// A staff account or photographer from the `users` table. Photographers without a
/// password hash appear on the site but cannot sign in to the admin panel.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: i32,
    pub uuid: Uuid,
    pub name: String,
    pub email: String,
    // Argon2 PHC string. `None` when the account cannot log in.
    pub password: Option<String>,
    pub role: String,
    pub slug: String,
    pub photo: Option<String>,
    pub description: String,
    pub phone_number: String,
    pub url_instagram: String,
    pub url_tiktok: String,
    pub url_facebook: String,
    pub url_youtube: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category
///
/// A gallery category (`categories` table). The slug is unique and drives the public URLs.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Category {
    pub id: i32,
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub photo_url: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Album
///
/// An `albums` row joined with the owning category and photographer, which is the
/// shape every album read needs.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Album {
    pub id: i32,
    pub uuid: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub youtube_url: String,
    pub images: Vec<String>,
    pub thumbnail: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_uuid: Uuid,
    pub category_name: String,
    pub category_slug: String,
    pub user_uuid: Uuid,
    pub user_name: String,
    pub user_photo: Option<String>,
    pub user_slug: String,
}

#[derive(Debug, Clone, FromRow, Default)]
pub struct Faq {
    pub id: i32,
    pub uuid: Uuid,
    pub question_id: String,
    pub question_en: String,
    pub answer_id: String,
    pub answer_en: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Website
///
/// The single global settings record: bilingual about-us copy, contact details,
/// hero videos and SEO metadata.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Website {
    pub id: i32,
    pub uuid: Uuid,
    pub about_us_brief_home_en: String,
    pub about_us_brief_home_id: String,
    pub about_us_en: String,
    pub about_us_id: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub url_instagram: String,
    pub url_facebook: String,
    pub url_tiktok: String,
    pub video_web: Option<String>,
    pub video_mobile: Option<String>,
    pub meta_title: String,
    pub meta_desc: String,
    pub meta_keyword: String,
    pub og_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The media columns of the website record that can be cleared individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebsiteMedia {
    VideoWeb,
    VideoMobile,
    OgImage,
}

impl WebsiteMedia {
    pub fn parse(field: &str) -> Option<Self> {
        match field {
            "video_web" => Some(Self::VideoWeb),
            "video_mobile" => Some(Self::VideoMobile),
            "og_image" => Some(Self::OgImage),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::VideoWeb => "video_web",
            Self::VideoMobile => "video_mobile",
            Self::OgImage => "og_image",
        }
    }
}

// --- Response Schemas ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct UserResponse {
    pub uuid: Uuid,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub description: String,
    pub role: String,
    pub slug: String,
    pub phone_number: String,
    pub url_instagram: String,
    pub url_tiktok: String,
    pub url_facebook: String,
    pub url_youtube: String,
    pub is_published: bool,
    pub can_login: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            uuid: user.uuid,
            name: user.name.clone(),
            email: user.email.clone(),
            photo: user.photo.clone(),
            description: user.description.clone(),
            role: user.role.clone(),
            slug: user.slug.clone(),
            phone_number: user.phone_number.clone(),
            url_instagram: user.url_instagram.clone(),
            url_tiktok: user.url_tiktok.clone(),
            url_facebook: user.url_facebook.clone(),
            url_youtube: user.url_youtube.clone(),
            is_published: user.is_published,
            can_login: user.password.is_some(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// UserPortfolioResponse
///
/// Public portfolio page: the photographer plus the categories they have published
/// albums in. The JSON key for the user stays `users` for front-end compatibility.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserPortfolioResponse {
    #[serde(rename = "users")]
    pub user: UserResponse,
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct CategoryResponse {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub photo_url: Option<String>,
    pub is_published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Category> for CategoryResponse {
    fn from(c: &Category) -> Self {
        Self {
            uuid: c.uuid,
            name: c.name.clone(),
            description: c.description.clone(),
            slug: c.slug.clone(),
            photo_url: c.photo_url.clone(),
            is_published: c.is_published,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// CategoryOption
///
/// Lightweight entry for front-end select boxes and navigation menus.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct CategoryOption {
    pub uuid: Uuid,
    pub name: String,
    pub slug: String,
    pub photo_url: Option<String>,
}

impl From<&Category> for CategoryOption {
    fn from(c: &Category) -> Self {
        Self {
            uuid: c.uuid,
            name: c.name.clone(),
            slug: c.slug.clone(),
            photo_url: c.photo_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoryBySlugResponse {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub photo_url: Option<String>,
    // Published photographers with at least one published album in this category.
    pub users: Vec<UserResponse>,
}

/// AlbumResponse
///
/// The album as the front-end sees it: related category and photographer are
/// flattened in and referenced by their public UUIDs.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct AlbumResponse {
    pub uuid: Uuid,
    pub slug: String,
    pub title: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub category_slug: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub user_slug: String,
    pub description: String,
    pub youtube_url: String,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub is_published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Album> for AlbumResponse {
    fn from(a: &Album) -> Self {
        Self {
            uuid: a.uuid,
            slug: a.slug.clone(),
            title: a.title.clone(),
            category_id: a.category_uuid,
            category_name: a.category_name.clone(),
            category_slug: a.category_slug.clone(),
            user_id: a.user_uuid,
            user_name: a.user_name.clone(),
            user_avatar: a.user_photo.clone(),
            user_slug: a.user_slug.clone(),
            description: a.description.clone(),
            youtube_url: a.youtube_url.clone(),
            thumbnail: a.thumbnail.clone(),
            images: a.images.clone(),
            is_published: a.is_published,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// AlbumResponseList
///
/// One page of a category's albums. `next` is the following page number, or 0 when
/// this page is the last one.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AlbumResponseList {
    pub data: Vec<AlbumResponse>,
    pub next: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct FaqResponse {
    pub uuid: Uuid,
    pub question_id: String,
    pub question_en: String,
    pub answer_id: String,
    pub answer_en: String,
    pub is_published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Faq> for FaqResponse {
    fn from(f: &Faq) -> Self {
        Self {
            uuid: f.uuid,
            question_id: f.question_id.clone(),
            question_en: f.question_en.clone(),
            answer_id: f.answer_id.clone(),
            answer_en: f.answer_en.clone(),
            is_published: f.is_published,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct WebsiteResponse {
    pub uuid: Uuid,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub url_instagram: String,
    pub url_facebook: String,
    pub url_tiktok: String,
    pub about_us_brief_home_en: String,
    pub about_us_brief_home_id: String,
    pub about_us_en: String,
    pub about_us_id: String,
    pub video_web: Option<String>,
    pub video_mobile: Option<String>,
    pub meta_title: String,
    pub meta_desc: String,
    pub meta_keyword: String,
    pub og_image: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Website> for WebsiteResponse {
    fn from(w: &Website) -> Self {
        Self {
            uuid: w.uuid,
            address: w.address.clone(),
            phone_number: w.phone_number.clone(),
            email: w.email.clone(),
            url_instagram: w.url_instagram.clone(),
            url_facebook: w.url_facebook.clone(),
            url_tiktok: w.url_tiktok.clone(),
            about_us_brief_home_en: w.about_us_brief_home_en.clone(),
            about_us_brief_home_id: w.about_us_brief_home_id.clone(),
            about_us_en: w.about_us_en.clone(),
            about_us_id: w.about_us_id.clone(),
            video_web: w.video_web.clone(),
            video_mobile: w.video_mobile.clone(),
            meta_title: w.meta_title.clone(),
            meta_desc: w.meta_desc.clone(),
            meta_keyword: w.meta_keyword.clone(),
            og_image: w.og_image.clone(),
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

/// Paginated
///
/// Envelope for the admin list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// DataResponse
///
/// Every successful single-payload response is wrapped as `{"data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub admin_access_token: String,
    pub admin_refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub user_id: Uuid,
    pub role: String,
    #[ts(type = "string")]
    pub expires: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "admin@example.com")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(default)]
pub struct DeleteImageRequest {
    pub image_url: String,
}

/// UserInput
///
/// Assembled from the multipart form of the user create/edit endpoints after the
/// optional photo has been uploaded.
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub role: String,
    pub description: String,
    pub photo_url: Option<String>,
    // Plain text; hashed by the handler before it reaches the repository.
    pub password: Option<String>,
    pub url_instagram: String,
    pub url_tiktok: String,
    pub url_facebook: String,
    pub url_youtube: String,
    pub phone_number: String,
    pub can_login: bool,
    pub is_published: bool,
}

/// CategoryInput
///
/// JSON body for category edits; the create endpoint fills it from a multipart form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(skip)]
    #[ts(skip)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AlbumInput {
    pub slug: String,
    pub title: String,
    pub category_id: Uuid,
    pub description: String,
    pub youtube_url: String,
    pub user_id: Uuid,
    pub is_published: bool,
    pub images: Vec<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct FaqInput {
    pub question_id: String,
    pub question_en: String,
    pub answer_id: String,
    pub answer_en: String,
    #[serde(default)]
    pub is_published: bool,
}

impl FaqInput {
    /// Names the first missing required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("question_id", &self.question_id),
            ("question_en", &self.question_en),
            ("answer_id", &self.answer_id),
            ("answer_en", &self.answer_en),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// WebsiteInput
///
/// Partial settings update. Empty strings mean "leave unchanged".
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(default)]
pub struct WebsiteInput {
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub url_instagram: String,
    pub url_facebook: String,
    #[serde(alias = "url_tikTok")]
    pub url_tiktok: String,
    pub about_us_brief_home_en: String,
    pub about_us_brief_home_id: String,
    pub about_us_en: String,
    pub about_us_id: String,
    pub video_web: String,
    pub video_mobile: String,
    pub meta_title: String,
    pub meta_desc: String,
    pub meta_keyword: String,
    pub og_image: String,
}

impl WebsiteInput {
    /// Overwrites `target` with every non-empty field of this input.
    pub fn apply_to(&self, target: &mut Website) {
        fn set(dst: &mut String, src: &str) {
            if !src.is_empty() {
                *dst = src.to_string();
            }
        }
        fn set_opt(dst: &mut Option<String>, src: &str) {
            if !src.is_empty() {
                *dst = Some(src.to_string());
            }
        }

        set(&mut target.address, &self.address);
        set(&mut target.phone_number, &self.phone_number);
        set(&mut target.email, &self.email);
        set(&mut target.url_instagram, &self.url_instagram);
        set(&mut target.url_facebook, &self.url_facebook);
        set(&mut target.url_tiktok, &self.url_tiktok);
        set(&mut target.about_us_brief_home_en, &self.about_us_brief_home_en);
        set(&mut target.about_us_brief_home_id, &self.about_us_brief_home_id);
        set(&mut target.about_us_en, &self.about_us_en);
        set(&mut target.about_us_id, &self.about_us_id);
        set_opt(&mut target.video_web, &self.video_web);
        set_opt(&mut target.video_mobile, &self.video_mobile);
        set(&mut target.meta_title, &self.meta_title);
        set(&mut target.meta_desc, &self.meta_desc);
        set(&mut target.meta_keyword, &self.meta_keyword);
        set_opt(&mut target.og_image, &self.og_image);
    }
}
