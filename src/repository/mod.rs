use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Album, AlbumInput, Category, CategoryInput, CategoryOption, Faq, FaqInput, User, UserInput,
    Website, WebsiteInput, WebsiteMedia,
};

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

#[derive(Debug, Error)]
pub enum RepoError {
    /// A uniqueness rule was violated (slug or email).
    #[error("{0}")]
    Conflict(String),
    /// A row referenced by the input does not exist.
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// PageQuery
///
/// Validated pagination for the admin list endpoints. `page` and `limit` are both
/// at least 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl PageQuery {
    pub fn new(page: i64, limit: i64, search: Option<String>) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            search: search.filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `%term%` for ILIKE matching.
    pub fn pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| format!("%{}%", s.trim()))
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(1, 10, None)
    }
}

/// Repository Trait
///
/// Every persistence operation the handlers need. Implemented by
/// `PostgresRepository` for the server and `InMemoryRepository` for tests, and
/// shared as `Arc<dyn Repository>`.
///
/// Deletes return the storage URLs that belonged to the removed rows so the caller
/// can release them once the transaction has committed.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn list_users(&self, query: &PageQuery) -> RepoResult<(Vec<User>, i64)>;
    async fn get_user_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn get_user_by_slug(&self, slug: &str) -> RepoResult<Option<User>>;
    /// `input.password` must already be hashed.
    async fn create_user(&self, input: UserInput) -> RepoResult<User>;
    /// Replaces every field. `can_login == false` clears the stored hash; a `None`
    /// password with `can_login == true` keeps the current one.
    async fn update_user(&self, uuid: Uuid, input: UserInput) -> RepoResult<Option<User>>;
    /// Removes the user and their albums in one transaction.
    async fn delete_user(&self, uuid: Uuid) -> RepoResult<Option<Vec<String>>>;
    /// Returns the previous photo URL. `NotFound` if the user does not exist.
    async fn clear_user_photo(&self, uuid: Uuid) -> RepoResult<Option<String>>;
    /// Published categories in which the user has at least one published album.
    async fn published_categories_for_user(&self, user_uuid: Uuid) -> RepoResult<Vec<Category>>;

    // --- Categories ---
    async fn list_categories(&self, query: &PageQuery) -> RepoResult<(Vec<Category>, i64)>;
    async fn published_categories(&self) -> RepoResult<Vec<Category>>;
    async fn category_options(&self) -> RepoResult<Vec<CategoryOption>>;
    async fn get_category_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Category>>;
    /// A published category with the published photographers who have a published
    /// album in it.
    async fn get_category_by_slug(&self, slug: &str) -> RepoResult<Option<(Category, Vec<User>)>>;
    async fn create_category(&self, input: CategoryInput) -> RepoResult<Category>;
    /// The slug follows the new name. `input.photo_url == None` keeps the photo.
    async fn update_category(
        &self,
        uuid: Uuid,
        input: CategoryInput,
    ) -> RepoResult<Option<Category>>;
    async fn delete_category(&self, uuid: Uuid) -> RepoResult<Option<Vec<String>>>;
    async fn clear_category_photo(&self, uuid: Uuid) -> RepoResult<Option<String>>;

    // --- Albums ---
    async fn list_albums(&self, query: &PageQuery) -> RepoResult<(Vec<Album>, i64)>;
    async fn latest_albums(&self, limit: i64) -> RepoResult<Vec<Album>>;
    /// One page of published albums in a published category, with the total count.
    async fn albums_by_category_slug(
        &self,
        slug: &str,
        page: i64,
        limit: i64,
    ) -> RepoResult<(Vec<Album>, i64)>;
    async fn get_album_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Album>>;
    async fn create_album(&self, input: AlbumInput) -> RepoResult<Album>;
    /// `input.images` is the complete new image list. `input.thumbnail == None`
    /// keeps the current thumbnail.
    async fn update_album(&self, uuid: Uuid, input: AlbumInput) -> RepoResult<Option<Album>>;
    async fn delete_album(&self, uuid: Uuid) -> RepoResult<Option<Vec<String>>>;
    async fn remove_album_image(&self, uuid: Uuid, image_url: &str) -> RepoResult<Option<Album>>;

    // --- FAQs ---
    async fn list_faqs(&self, query: &PageQuery) -> RepoResult<(Vec<Faq>, i64)>;
    async fn published_faqs(&self) -> RepoResult<Vec<Faq>>;
    async fn get_faq_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Faq>>;
    async fn create_faq(&self, input: FaqInput) -> RepoResult<Faq>;
    async fn update_faq(&self, uuid: Uuid, input: FaqInput) -> RepoResult<Option<Faq>>;
    async fn delete_faq(&self, uuid: Uuid) -> RepoResult<bool>;

    // --- Website ---
    async fn get_website(&self) -> RepoResult<Option<Website>>;
    async fn get_website_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Website>>;
    async fn create_website(&self, input: &WebsiteInput) -> RepoResult<Website>;
    async fn update_website(&self, uuid: Uuid, input: &WebsiteInput) -> RepoResult<Option<Website>>;
    /// Returns the previous URL of the cleared column.
    async fn clear_website_media(&self, uuid: Uuid, field: WebsiteMedia) -> RepoResult<Option<String>>;
}

/// Flattens a row's own media and the images and thumbnails of its albums into the
/// list of storage URLs to release.
pub(crate) fn collect_media(
    own: Option<String>,
    albums: impl IntoIterator<Item = (Vec<String>, Option<String>)>,
) -> Vec<String> {
    own.into_iter()
        .chain(
            albums
                .into_iter()
                .flat_map(|(images, thumbnail)| images.into_iter().chain(thumbnail)),
        )
        .map(|url| url.trim_matches('"').to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
