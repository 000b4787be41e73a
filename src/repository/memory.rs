use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{PageQuery, RepoError, RepoResult, Repository, collect_media};
use crate::models::{
    Album, AlbumInput, Category, CategoryInput, CategoryOption, Faq, FaqInput, User, UserInput,
    Website, WebsiteInput, WebsiteMedia,
};
use crate::util::generate_slug;

/// The stored shape of an album: foreign keys instead of the joined columns.
#[derive(Debug, Clone)]
struct AlbumRecord {
    id: i32,
    uuid: Uuid,
    slug: String,
    title: String,
    description: String,
    youtube_url: String,
    images: Vec<String>,
    thumbnail: Option<String>,
    is_published: bool,
    category_id: i32,
    user_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    next_id: i32,
    users: Vec<User>,
    categories: Vec<Category>,
    albums: Vec<AlbumRecord>,
    faqs: Vec<Faq>,
    websites: Vec<Website>,
}

impl Store {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn join(&self, record: &AlbumRecord) -> Option<Album> {
        let category = self.categories.iter().find(|c| c.id == record.category_id)?;
        let user = self.users.iter().find(|u| u.id == record.user_id)?;

        Some(Album {
            id: record.id,
            uuid: record.uuid,
            slug: record.slug.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            youtube_url: record.youtube_url.clone(),
            images: record.images.clone(),
            thumbnail: record.thumbnail.clone(),
            is_published: record.is_published,
            created_at: record.created_at,
            updated_at: record.updated_at,
            category_uuid: category.uuid,
            category_name: category.name.clone(),
            category_slug: category.slug.clone(),
            user_uuid: user.uuid,
            user_name: user.name.clone(),
            user_photo: user.photo.clone(),
            user_slug: user.slug.clone(),
        })
    }

    /// Albums newest first, joined.
    fn joined_albums(&self) -> Vec<Album> {
        let mut records: Vec<&AlbumRecord> = self.albums.iter().collect();
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        records.into_iter().filter_map(|r| self.join(r)).collect()
    }

    fn album_owner_ids(&self, input: &AlbumInput) -> RepoResult<(i32, i32)> {
        let category_id = self
            .categories
            .iter()
            .find(|c| c.uuid == input.category_id)
            .map(|c| c.id)
            .ok_or_else(|| RepoError::NotFound("category not found".to_string()))?;
        let user_id = self
            .users
            .iter()
            .find(|u| u.uuid == input.user_id)
            .map(|u| u.id)
            .ok_or_else(|| RepoError::NotFound("user not found".to_string()))?;
        Ok((category_id, user_id))
    }

    /// Removes every album matching `pred` and returns their media.
    fn drain_albums(&mut self, pred: impl Fn(&AlbumRecord) -> bool) -> Vec<(Vec<String>, Option<String>)> {
        let (removed, kept): (Vec<_>, Vec<_>) = self.albums.drain(..).partition(|a| pred(a));
        self.albums = kept;
        removed.into_iter().map(|a| (a.images, a.thumbnail)).collect()
    }
}

/// InMemoryRepository
///
/// A `Repository` held entirely in process memory. It mirrors the visibility and
/// uniqueness rules of the Postgres implementation so router tests exercise the
/// same behavior without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Newest first, then applies the page window.
fn paginate<T: Clone>(
    mut items: Vec<T>,
    key: impl Fn(&T) -> (DateTime<Utc>, i32),
    query: &PageQuery,
) -> (Vec<T>, i64) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    let total = items.len() as i64;
    let page = items
        .into_iter()
        .skip(query.offset() as usize)
        .take(query.limit as usize)
        .collect();
    (page, total)
}

fn matches(query: &PageQuery, fields: &[&str]) -> bool {
    match &query.search {
        Some(term) => {
            let term = term.trim().to_lowercase();
            fields.iter().any(|f| f.to_lowercase().contains(&term))
        }
        None => true,
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    // --- Users ---

    async fn list_users(&self, query: &PageQuery) -> RepoResult<(Vec<User>, i64)> {
        let store = self.store();
        let users = store
            .users
            .iter()
            .filter(|u| matches(query, &[u.name.as_str(), u.email.as_str()]))
            .cloned()
            .collect();
        Ok(paginate(users, |u: &User| (u.created_at, u.id), query))
    }

    async fn get_user_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<User>> {
        Ok(self.store().users.iter().find(|u| u.uuid == uuid).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.store().users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_slug(&self, slug: &str) -> RepoResult<Option<User>> {
        Ok(self.store().users.iter().find(|u| u.slug == slug).cloned())
    }

    async fn create_user(&self, input: UserInput) -> RepoResult<User> {
        let mut store = self.store();
        if store.users.iter().any(|u| u.email == input.email) {
            return Err(RepoError::Conflict("email already exists".to_string()));
        }
        let slug = generate_slug(&input.name);
        if store.users.iter().any(|u| u.slug == slug) {
            return Err(RepoError::Conflict("a user with this name already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: store.next_id(),
            uuid: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password: if input.can_login { input.password } else { None },
            role: input.role,
            slug,
            photo: input.photo_url,
            description: input.description,
            phone_number: input.phone_number,
            url_instagram: input.url_instagram,
            url_tiktok: input.url_tiktok,
            url_facebook: input.url_facebook,
            url_youtube: input.url_youtube,
            is_published: input.is_published,
            created_at: now,
            updated_at: now,
        };
        store.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, uuid: Uuid, input: UserInput) -> RepoResult<Option<User>> {
        let mut store = self.store();
        if !store.users.iter().any(|u| u.uuid == uuid) {
            return Ok(None);
        }
        if store.users.iter().any(|u| u.email == input.email && u.uuid != uuid) {
            return Err(RepoError::Conflict("email already exists".to_string()));
        }
        let slug = generate_slug(&input.name);
        if store.users.iter().any(|u| u.slug == slug && u.uuid != uuid) {
            return Err(RepoError::Conflict("a user with this name already exists".to_string()));
        }
        let Some(user) = store.users.iter_mut().find(|u| u.uuid == uuid) else {
            return Ok(None);
        };

        user.password = if input.can_login {
            input.password.or(user.password.take())
        } else {
            None
        };
        if input.photo_url.is_some() {
            user.photo = input.photo_url;
        }
        user.name = input.name;
        user.email = input.email;
        user.role = input.role;
        user.slug = slug;
        user.description = input.description;
        user.phone_number = input.phone_number;
        user.url_instagram = input.url_instagram;
        user.url_tiktok = input.url_tiktok;
        user.url_facebook = input.url_facebook;
        user.url_youtube = input.url_youtube;
        user.is_published = input.is_published;
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, uuid: Uuid) -> RepoResult<Option<Vec<String>>> {
        let mut store = self.store();
        let Some(pos) = store.users.iter().position(|u| u.uuid == uuid) else {
            return Ok(None);
        };
        let user = store.users.remove(pos);
        let albums = store.drain_albums(|a| a.user_id == user.id);
        Ok(Some(collect_media(user.photo, albums)))
    }

    async fn clear_user_photo(&self, uuid: Uuid) -> RepoResult<Option<String>> {
        let mut store = self.store();
        let user = store
            .users
            .iter_mut()
            .find(|u| u.uuid == uuid)
            .ok_or_else(|| RepoError::NotFound("user not found".to_string()))?;
        user.updated_at = Utc::now();
        Ok(user.photo.take())
    }

    async fn published_categories_for_user(&self, user_uuid: Uuid) -> RepoResult<Vec<Category>> {
        let store = self.store();
        let Some(user) = store.users.iter().find(|u| u.uuid == user_uuid) else {
            return Ok(Vec::new());
        };

        let mut categories: Vec<Category> = store
            .categories
            .iter()
            .filter(|c| c.is_published)
            .filter(|c| {
                store
                    .albums
                    .iter()
                    .any(|a| a.user_id == user.id && a.category_id == c.id && a.is_published)
            })
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    // --- Categories ---

    async fn list_categories(&self, query: &PageQuery) -> RepoResult<(Vec<Category>, i64)> {
        let store = self.store();
        let categories = store
            .categories
            .iter()
            .filter(|c| matches(query, &[c.name.as_str()]))
            .cloned()
            .collect();
        Ok(paginate(categories, |c: &Category| (c.created_at, c.id), query))
    }

    async fn published_categories(&self) -> RepoResult<Vec<Category>> {
        let store = self.store();
        let mut categories: Vec<Category> =
            store.categories.iter().filter(|c| c.is_published).cloned().collect();
        categories.sort_by_key(|c| std::cmp::Reverse((c.created_at, c.id)));
        Ok(categories)
    }

    async fn category_options(&self) -> RepoResult<Vec<CategoryOption>> {
        let store = self.store();
        let mut options: Vec<CategoryOption> = store
            .categories
            .iter()
            .filter(|c| c.is_published)
            .map(CategoryOption::from)
            .collect();
        options.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(options)
    }

    async fn get_category_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Category>> {
        Ok(self.store().categories.iter().find(|c| c.uuid == uuid).cloned())
    }

    async fn get_category_by_slug(&self, slug: &str) -> RepoResult<Option<(Category, Vec<User>)>> {
        let store = self.store();
        let Some(category) = store
            .categories
            .iter()
            .find(|c| c.slug == slug && c.is_published)
            .cloned()
        else {
            return Ok(None);
        };

        let mut users: Vec<User> = store
            .users
            .iter()
            .filter(|u| u.is_published)
            .filter(|u| {
                store
                    .albums
                    .iter()
                    .any(|a| a.user_id == u.id && a.category_id == category.id && a.is_published)
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Some((category, users)))
    }

    async fn create_category(&self, input: CategoryInput) -> RepoResult<Category> {
        let mut store = self.store();
        let slug = generate_slug(&input.name);
        if store.categories.iter().any(|c| c.slug == slug) {
            return Err(RepoError::Conflict("slug already exists".to_string()));
        }

        let now = Utc::now();
        let category = Category {
            id: store.next_id(),
            uuid: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            slug,
            photo_url: input.photo_url,
            is_published: input.is_published,
            created_at: now,
            updated_at: now,
        };
        store.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        uuid: Uuid,
        input: CategoryInput,
    ) -> RepoResult<Option<Category>> {
        let mut store = self.store();
        if !store.categories.iter().any(|c| c.uuid == uuid) {
            return Ok(None);
        }
        let slug = generate_slug(&input.name);
        if store.categories.iter().any(|c| c.slug == slug && c.uuid != uuid) {
            return Err(RepoError::Conflict("slug already exists".to_string()));
        }
        let Some(category) = store.categories.iter_mut().find(|c| c.uuid == uuid) else {
            return Ok(None);
        };

        category.name = input.name;
        category.description = input.description;
        category.slug = slug;
        category.is_published = input.is_published;
        if input.photo_url.is_some() {
            category.photo_url = input.photo_url;
        }
        category.updated_at = Utc::now();

        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, uuid: Uuid) -> RepoResult<Option<Vec<String>>> {
        let mut store = self.store();
        let Some(pos) = store.categories.iter().position(|c| c.uuid == uuid) else {
            return Ok(None);
        };
        let category = store.categories.remove(pos);
        let albums = store.drain_albums(|a| a.category_id == category.id);
        Ok(Some(collect_media(category.photo_url, albums)))
    }

    async fn clear_category_photo(&self, uuid: Uuid) -> RepoResult<Option<String>> {
        let mut store = self.store();
        let category = store
            .categories
            .iter_mut()
            .find(|c| c.uuid == uuid)
            .ok_or_else(|| RepoError::NotFound("category not found".to_string()))?;
        category.updated_at = Utc::now();
        Ok(category.photo_url.take())
    }

    // --- Albums ---

    async fn list_albums(&self, query: &PageQuery) -> RepoResult<(Vec<Album>, i64)> {
        let albums = self
            .store()
            .joined_albums()
            .into_iter()
            .filter(|a| matches(query, &[a.title.as_str()]))
            .collect();
        Ok(paginate(albums, |a: &Album| (a.created_at, a.id), query))
    }

    async fn latest_albums(&self, limit: i64) -> RepoResult<Vec<Album>> {
        let store = self.store();
        let published_categories: Vec<Uuid> = store
            .categories
            .iter()
            .filter(|c| c.is_published)
            .map(|c| c.uuid)
            .collect();

        Ok(store
            .joined_albums()
            .into_iter()
            .filter(|a| a.is_published && published_categories.contains(&a.category_uuid))
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn albums_by_category_slug(
        &self,
        slug: &str,
        page: i64,
        limit: i64,
    ) -> RepoResult<(Vec<Album>, i64)> {
        let store = self.store();
        let category_published = store
            .categories
            .iter()
            .any(|c| c.slug == slug && c.is_published);
        if !category_published {
            return Ok((Vec::new(), 0));
        }

        let albums = store
            .joined_albums()
            .into_iter()
            .filter(|a| a.category_slug == slug && a.is_published)
            .collect();
        Ok(paginate(
            albums,
            |a: &Album| (a.created_at, a.id),
            &PageQuery::new(page, limit, None),
        ))
    }

    async fn get_album_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Album>> {
        let store = self.store();
        Ok(store
            .albums
            .iter()
            .find(|a| a.uuid == uuid)
            .and_then(|a| store.join(a)))
    }

    async fn create_album(&self, input: AlbumInput) -> RepoResult<Album> {
        let mut store = self.store();
        if store.albums.iter().any(|a| a.slug == input.slug) {
            return Err(RepoError::Conflict("slug already exists".to_string()));
        }
        let (category_id, user_id) = store.album_owner_ids(&input)?;

        let now = Utc::now();
        let record = AlbumRecord {
            id: store.next_id(),
            uuid: Uuid::new_v4(),
            slug: input.slug,
            title: input.title,
            description: input.description,
            youtube_url: input.youtube_url,
            images: input.images,
            thumbnail: input.thumbnail,
            is_published: input.is_published,
            category_id,
            user_id,
            created_at: now,
            updated_at: now,
        };
        let album = store
            .join(&record)
            .ok_or_else(|| RepoError::NotFound("album not found".to_string()))?;
        store.albums.push(record);
        Ok(album)
    }

    async fn update_album(&self, uuid: Uuid, input: AlbumInput) -> RepoResult<Option<Album>> {
        let mut store = self.store();
        if !store.albums.iter().any(|a| a.uuid == uuid) {
            return Ok(None);
        }
        if store.albums.iter().any(|a| a.slug == input.slug && a.uuid != uuid) {
            return Err(RepoError::Conflict("slug already exists".to_string()));
        }
        let (category_id, user_id) = store.album_owner_ids(&input)?;

        let Some(record) = store.albums.iter_mut().find(|a| a.uuid == uuid) else {
            return Ok(None);
        };
        record.slug = input.slug;
        record.title = input.title;
        record.description = input.description;
        record.youtube_url = input.youtube_url;
        record.images = input.images;
        if input.thumbnail.is_some() {
            record.thumbnail = input.thumbnail;
        }
        record.is_published = input.is_published;
        record.category_id = category_id;
        record.user_id = user_id;
        record.updated_at = Utc::now();

        let record = record.clone();
        Ok(store.join(&record))
    }

    async fn delete_album(&self, uuid: Uuid) -> RepoResult<Option<Vec<String>>> {
        let mut store = self.store();
        let removed = store.drain_albums(|a| a.uuid == uuid);
        if removed.is_empty() {
            return Ok(None);
        }
        Ok(Some(collect_media(None, removed)))
    }

    async fn remove_album_image(&self, uuid: Uuid, image_url: &str) -> RepoResult<Option<Album>> {
        let mut store = self.store();
        let target = image_url.trim_matches('"');
        let Some(record) = store.albums.iter_mut().find(|a| a.uuid == uuid) else {
            return Ok(None);
        };
        record.images.retain(|img| img.trim_matches('"') != target);
        record.updated_at = Utc::now();

        let record = record.clone();
        Ok(store.join(&record))
    }

    // --- FAQs ---

    async fn list_faqs(&self, query: &PageQuery) -> RepoResult<(Vec<Faq>, i64)> {
        let store = self.store();
        let faqs = store
            .faqs
            .iter()
            .filter(|f| {
                matches(
                    query,
                    &[
                        f.question_id.as_str(),
                        f.question_en.as_str(),
                        f.answer_id.as_str(),
                        f.answer_en.as_str(),
                    ],
                )
            })
            .cloned()
            .collect();
        Ok(paginate(faqs, |f: &Faq| (f.created_at, f.id), query))
    }

    async fn published_faqs(&self) -> RepoResult<Vec<Faq>> {
        let store = self.store();
        let mut faqs: Vec<Faq> = store.faqs.iter().filter(|f| f.is_published).cloned().collect();
        faqs.sort_by_key(|f| (f.created_at, f.id));
        Ok(faqs)
    }

    async fn get_faq_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Faq>> {
        Ok(self.store().faqs.iter().find(|f| f.uuid == uuid).cloned())
    }

    async fn create_faq(&self, input: FaqInput) -> RepoResult<Faq> {
        let mut store = self.store();
        let now = Utc::now();
        let faq = Faq {
            id: store.next_id(),
            uuid: Uuid::new_v4(),
            question_id: input.question_id,
            question_en: input.question_en,
            answer_id: input.answer_id,
            answer_en: input.answer_en,
            is_published: input.is_published,
            created_at: now,
            updated_at: now,
        };
        store.faqs.push(faq.clone());
        Ok(faq)
    }

    async fn update_faq(&self, uuid: Uuid, input: FaqInput) -> RepoResult<Option<Faq>> {
        let mut store = self.store();
        let Some(faq) = store.faqs.iter_mut().find(|f| f.uuid == uuid) else {
            return Ok(None);
        };
        faq.question_id = input.question_id;
        faq.question_en = input.question_en;
        faq.answer_id = input.answer_id;
        faq.answer_en = input.answer_en;
        faq.is_published = input.is_published;
        faq.updated_at = Utc::now();
        Ok(Some(faq.clone()))
    }

    async fn delete_faq(&self, uuid: Uuid) -> RepoResult<bool> {
        let mut store = self.store();
        let before = store.faqs.len();
        store.faqs.retain(|f| f.uuid != uuid);
        Ok(store.faqs.len() < before)
    }

    // --- Website ---

    async fn get_website(&self) -> RepoResult<Option<Website>> {
        Ok(self.store().websites.iter().min_by_key(|w| w.id).cloned())
    }

    async fn get_website_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Website>> {
        Ok(self.store().websites.iter().find(|w| w.uuid == uuid).cloned())
    }

    async fn create_website(&self, input: &WebsiteInput) -> RepoResult<Website> {
        let mut store = self.store();
        let now = Utc::now();
        let mut website = Website {
            id: store.next_id(),
            uuid: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            ..Website::default()
        };
        input.apply_to(&mut website);
        store.websites.push(website.clone());
        Ok(website)
    }

    async fn update_website(&self, uuid: Uuid, input: &WebsiteInput) -> RepoResult<Option<Website>> {
        let mut store = self.store();
        let Some(website) = store.websites.iter_mut().find(|w| w.uuid == uuid) else {
            return Ok(None);
        };
        input.apply_to(website);
        website.updated_at = Utc::now();
        Ok(Some(website.clone()))
    }

    async fn clear_website_media(&self, uuid: Uuid, field: WebsiteMedia) -> RepoResult<Option<String>> {
        let mut store = self.store();
        let website = store
            .websites
            .iter_mut()
            .find(|w| w.uuid == uuid)
            .ok_or_else(|| RepoError::NotFound("website not found".to_string()))?;
        website.updated_at = Utc::now();

        Ok(match field {
            WebsiteMedia::VideoWeb => website.video_web.take(),
            WebsiteMedia::VideoMobile => website.video_mobile.take(),
            WebsiteMedia::OgImage => website.og_image.take(),
        })
    }
}
