use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, postgres::PgRow, query_builder::QueryBuilder};
use uuid::Uuid;

use super::{PageQuery, RepoError, RepoResult, Repository, collect_media};
use crate::models::{
    Album, AlbumInput, Category, CategoryInput, CategoryOption, Faq, FaqInput, User, UserInput,
    Website, WebsiteInput, WebsiteMedia,
};
use crate::util::generate_slug;

const USER_SELECT: &str = r#"
    SELECT id, uuid, name, email, password, role, slug, photo, description, phone_number,
           url_instagram, url_tiktok, url_facebook, url_youtube, is_published,
           created_at, updated_at
    FROM users"#;

const CATEGORY_SELECT: &str = r#"
    SELECT id, uuid, name, description, slug, photo_url, is_published, created_at, updated_at
    FROM categories"#;

// Every album read joins its category and photographer.
const ALBUM_SELECT: &str = r#"
    SELECT a.id, a.uuid, a.slug, a.title, a.description, a.youtube_url, a.images, a.thumbnail,
           a.is_published, a.created_at, a.updated_at,
           c.uuid AS category_uuid, c.name AS category_name, c.slug AS category_slug,
           u.uuid AS user_uuid, u.name AS user_name, u.photo AS user_photo, u.slug AS user_slug
    FROM albums a
    JOIN categories c ON c.id = a.category_id
    JOIN users u ON u.id = a.user_id"#;

const FAQ_SELECT: &str = r#"
    SELECT id, uuid, question_id, question_en, answer_id, answer_en, is_published,
           created_at, updated_at
    FROM faqs"#;

const WEBSITE_SELECT: &str = r#"
    SELECT id, uuid, about_us_brief_home_en, about_us_brief_home_id, about_us_en, about_us_id,
           address, phone_number, email, url_instagram, url_facebook, url_tiktok,
           video_web, video_mobile, meta_title, meta_desc, meta_keyword, og_image,
           created_at, updated_at
    FROM websites"#;

/// PostgresRepository
///
/// The `Repository` backed by PostgreSQL. Queries are assembled at runtime with
/// `QueryBuilder` and bound parameters; nothing user-supplied is interpolated.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// paginate
    ///
    /// Runs the count and the page query for an admin list, applying the same ILIKE
    /// filter across `search_columns` to both.
    async fn paginate<T>(
        &self,
        select: &str,
        count: &str,
        search_columns: &[&str],
        order_by: &str,
        query: &PageQuery,
    ) -> RepoResult<(Vec<T>, i64)>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut count_builder: QueryBuilder<Postgres> = QueryBuilder::new(count);
        let mut rows_builder: QueryBuilder<Postgres> = QueryBuilder::new(select);

        if let Some(pattern) = query.pattern() {
            push_search(&mut count_builder, search_columns, &pattern);
            push_search(&mut rows_builder, search_columns, &pattern);
        }

        let total: i64 = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        rows_builder
            .push(" ORDER BY ")
            .push(order_by)
            .push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let rows = rows_builder.build_query_as::<T>().fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    async fn slug_taken(&self, table: &str, slug: &str, except: Option<Uuid>) -> RepoResult<bool> {
        // `table` is always one of our own literals.
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE slug = $1 AND ($2::uuid IS NULL OR uuid <> $2))"
        );
        let taken: bool = sqlx::query_scalar(&sql)
            .bind(slug)
            .bind(except)
            .fetch_one(&self.pool)
            .await?;
        Ok(taken)
    }

    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> RepoResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::uuid IS NULL OR uuid <> $2))",
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Resolves the internal ids of an album's category and photographer.
    async fn album_owner_ids(&self, input: &AlbumInput) -> RepoResult<(i32, i32)> {
        let category_id: Option<i32> = sqlx::query_scalar("SELECT id FROM categories WHERE uuid = $1")
            .bind(input.category_id)
            .fetch_optional(&self.pool)
            .await?;
        let category_id =
            category_id.ok_or_else(|| RepoError::NotFound("category not found".to_string()))?;

        let user_id: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE uuid = $1")
            .bind(input.user_id)
            .fetch_optional(&self.pool)
            .await?;
        let user_id = user_id.ok_or_else(|| RepoError::NotFound("user not found".to_string()))?;

        Ok((category_id, user_id))
    }

    async fn album_or_missing(&self, uuid: Uuid) -> RepoResult<Album> {
        self.get_album_by_uuid(uuid)
            .await?
            .ok_or_else(|| RepoError::NotFound("album not found".to_string()))
    }
}

fn push_search(builder: &mut QueryBuilder<Postgres>, columns: &[&str], pattern: &str) {
    builder.push(" WHERE (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder.push(*column).push(" ILIKE ").push_bind(pattern.to_string());
    }
    builder.push(")");
}

/// Maps a unique-constraint violation that slipped past the pre-checks to `Conflict`.
fn unique_to_conflict(err: sqlx::Error, message: &str) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(message.to_string())
        }
        _ => RepoError::Database(err),
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Users ---

    async fn list_users(&self, query: &PageQuery) -> RepoResult<(Vec<User>, i64)> {
        self.paginate(
            USER_SELECT,
            "SELECT COUNT(*) FROM users",
            &["name", "email"],
            "created_at DESC, id DESC",
            query,
        )
        .await
    }

    async fn get_user_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE uuid = $1"))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_slug(&self, slug: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, input: UserInput) -> RepoResult<User> {
        if self.email_taken(&input.email, None).await? {
            return Err(RepoError::Conflict("email already exists".to_string()));
        }
        let slug = generate_slug(&input.name);
        if self.slug_taken("users", &slug, None).await? {
            return Err(RepoError::Conflict("a user with this name already exists".to_string()));
        }
        let password = if input.can_login { input.password } else { None };

        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password, role, slug, photo, description, phone_number,
                               url_instagram, url_tiktok, url_facebook, url_youtube, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            returning_columns(USER_SELECT)
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(password)
        .bind(&input.role)
        .bind(&slug)
        .bind(&input.photo_url)
        .bind(&input.description)
        .bind(&input.phone_number)
        .bind(&input.url_instagram)
        .bind(&input.url_tiktok)
        .bind(&input.url_facebook)
        .bind(&input.url_youtube)
        .bind(input.is_published)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_to_conflict(e, "email already exists"))
    }

    async fn update_user(&self, uuid: Uuid, input: UserInput) -> RepoResult<Option<User>> {
        let Some(existing) = self.get_user_by_uuid(uuid).await? else {
            return Ok(None);
        };
        if self.email_taken(&input.email, Some(uuid)).await? {
            return Err(RepoError::Conflict("email already exists".to_string()));
        }
        let slug = generate_slug(&input.name);
        if self.slug_taken("users", &slug, Some(uuid)).await? {
            return Err(RepoError::Conflict("a user with this name already exists".to_string()));
        }

        let password = if input.can_login {
            input.password.or(existing.password)
        } else {
            None
        };
        let photo = input.photo_url.or(existing.photo);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $1, email = $2, role = $3, slug = $4, photo = $5, description = $6,
                phone_number = $7, url_instagram = $8, url_tiktok = $9, url_facebook = $10,
                url_youtube = $11, is_published = $12, password = $13, updated_at = NOW()
            WHERE uuid = $14
            RETURNING {}
            "#,
            returning_columns(USER_SELECT)
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.role)
        .bind(&slug)
        .bind(photo)
        .bind(&input.description)
        .bind(&input.phone_number)
        .bind(&input.url_instagram)
        .bind(&input.url_tiktok)
        .bind(&input.url_facebook)
        .bind(&input.url_youtube)
        .bind(input.is_published)
        .bind(password)
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_to_conflict(e, "email already exists"))?;

        Ok(user)
    }

    async fn delete_user(&self, uuid: Uuid) -> RepoResult<Option<Vec<String>>> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE uuid = $1 FOR UPDATE"))
            .bind(uuid)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(user) = user else {
            return Ok(None);
        };

        let albums: Vec<(Vec<String>, Option<String>)> =
            sqlx::query_as("DELETE FROM albums WHERE user_id = $1 RETURNING images, thumbnail")
                .bind(user.id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(collect_media(user.photo, albums)))
    }

    async fn clear_user_photo(&self, uuid: Uuid) -> RepoResult<Option<String>> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT photo FROM users WHERE uuid = $1 FOR UPDATE")
                .bind(uuid)
                .fetch_optional(&mut *tx)
                .await?;
        let previous = previous.ok_or_else(|| RepoError::NotFound("user not found".to_string()))?;

        sqlx::query("UPDATE users SET photo = NULL, updated_at = NOW() WHERE uuid = $1")
            .bind(uuid)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(previous)
    }

    async fn published_categories_for_user(&self, user_uuid: Uuid) -> RepoResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT DISTINCT c.id, c.uuid, c.name, c.description, c.slug, c.photo_url,
                   c.is_published, c.created_at, c.updated_at
            FROM categories c
            JOIN albums a ON a.category_id = c.id
            JOIN users u ON u.id = a.user_id
            WHERE u.uuid = $1 AND c.is_published = true AND a.is_published = true
            ORDER BY c.name
            "#,
        )
        .bind(user_uuid)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    // --- Categories ---

    async fn list_categories(&self, query: &PageQuery) -> RepoResult<(Vec<Category>, i64)> {
        self.paginate(
            CATEGORY_SELECT,
            "SELECT COUNT(*) FROM categories",
            &["name"],
            "created_at DESC, id DESC",
            query,
        )
        .await
    }

    async fn published_categories(&self) -> RepoResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "{CATEGORY_SELECT} WHERE is_published = true ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn category_options(&self) -> RepoResult<Vec<CategoryOption>> {
        let options = sqlx::query_as::<_, CategoryOption>(
            "SELECT uuid, name, slug, photo_url FROM categories WHERE is_published = true ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }

    async fn get_category_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!("{CATEGORY_SELECT} WHERE uuid = $1"))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn get_category_by_slug(&self, slug: &str) -> RepoResult<Option<(Category, Vec<User>)>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "{CATEGORY_SELECT} WHERE slug = $1 AND is_published = true"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        let Some(category) = category else {
            return Ok(None);
        };

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT DISTINCT u.id, u.uuid, u.name, u.email, u.password, u.role, u.slug, u.photo,
                   u.description, u.phone_number, u.url_instagram, u.url_tiktok, u.url_facebook,
                   u.url_youtube, u.is_published, u.created_at, u.updated_at
            FROM users u
            JOIN albums a ON a.user_id = u.id
            WHERE a.category_id = $1 AND a.is_published = true AND u.is_published = true
            ORDER BY u.name
            "#,
        )
        .bind(category.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some((category, users)))
    }

    async fn create_category(&self, input: CategoryInput) -> RepoResult<Category> {
        let slug = generate_slug(&input.name);
        if self.slug_taken("categories", &slug, None).await? {
            return Err(RepoError::Conflict("slug already exists".to_string()));
        }

        sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (name, description, slug, photo_url, is_published)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            returning_columns(CATEGORY_SELECT)
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(&slug)
        .bind(&input.photo_url)
        .bind(input.is_published)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_to_conflict(e, "slug already exists"))
    }

    async fn update_category(
        &self,
        uuid: Uuid,
        input: CategoryInput,
    ) -> RepoResult<Option<Category>> {
        if self.get_category_by_uuid(uuid).await?.is_none() {
            return Ok(None);
        }
        let slug = generate_slug(&input.name);
        if self.slug_taken("categories", &slug, Some(uuid)).await? {
            return Err(RepoError::Conflict("slug already exists".to_string()));
        }

        sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET name = $1, description = $2, slug = $3, is_published = $4,
                photo_url = COALESCE($5, photo_url), updated_at = NOW()
            WHERE uuid = $6
            RETURNING {}
            "#,
            returning_columns(CATEGORY_SELECT)
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(&slug)
        .bind(input.is_published)
        .bind(&input.photo_url)
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_to_conflict(e, "slug already exists"))
    }

    async fn delete_category(&self, uuid: Uuid) -> RepoResult<Option<Vec<String>>> {
        let mut tx = self.pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(&format!(
            "{CATEGORY_SELECT} WHERE uuid = $1 FOR UPDATE"
        ))
        .bind(uuid)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(category) = category else {
            return Ok(None);
        };

        let albums: Vec<(Vec<String>, Option<String>)> =
            sqlx::query_as("DELETE FROM albums WHERE category_id = $1 RETURNING images, thumbnail")
                .bind(category.id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(collect_media(category.photo_url, albums)))
    }

    async fn clear_category_photo(&self, uuid: Uuid) -> RepoResult<Option<String>> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT photo_url FROM categories WHERE uuid = $1 FOR UPDATE")
                .bind(uuid)
                .fetch_optional(&mut *tx)
                .await?;
        let previous =
            previous.ok_or_else(|| RepoError::NotFound("category not found".to_string()))?;

        sqlx::query("UPDATE categories SET photo_url = NULL, updated_at = NOW() WHERE uuid = $1")
            .bind(uuid)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(previous)
    }

    // --- Albums ---

    async fn list_albums(&self, query: &PageQuery) -> RepoResult<(Vec<Album>, i64)> {
        self.paginate(
            ALBUM_SELECT,
            "SELECT COUNT(*) FROM albums a",
            &["a.title"],
            "a.created_at DESC, a.id DESC",
            query,
        )
        .await
    }

    async fn latest_albums(&self, limit: i64) -> RepoResult<Vec<Album>> {
        let albums = sqlx::query_as::<_, Album>(&format!(
            r#"{ALBUM_SELECT}
            WHERE a.is_published = true AND c.is_published = true
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $1"#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(albums)
    }

    async fn albums_by_category_slug(
        &self,
        slug: &str,
        page: i64,
        limit: i64,
    ) -> RepoResult<(Vec<Album>, i64)> {
        let query = PageQuery::new(page, limit, None);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM albums a
            JOIN categories c ON c.id = a.category_id
            WHERE c.slug = $1 AND a.is_published = true AND c.is_published = true
            "#,
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        let albums = sqlx::query_as::<_, Album>(&format!(
            r#"{ALBUM_SELECT}
            WHERE c.slug = $1 AND a.is_published = true AND c.is_published = true
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $2 OFFSET $3"#
        ))
        .bind(slug)
        .bind(query.limit)
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((albums, total))
    }

    async fn get_album_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Album>> {
        let album = sqlx::query_as::<_, Album>(&format!("{ALBUM_SELECT} WHERE a.uuid = $1"))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(album)
    }

    async fn create_album(&self, input: AlbumInput) -> RepoResult<Album> {
        if self.slug_taken("albums", &input.slug, None).await? {
            return Err(RepoError::Conflict("slug already exists".to_string()));
        }
        let (category_id, user_id) = self.album_owner_ids(&input).await?;

        let uuid: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO albums (slug, title, description, youtube_url, images, thumbnail,
                                is_published, category_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING uuid
            "#,
        )
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.youtube_url)
        .bind(&input.images)
        .bind(&input.thumbnail)
        .bind(input.is_published)
        .bind(category_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_to_conflict(e, "slug already exists"))?;

        self.album_or_missing(uuid).await
    }

    async fn update_album(&self, uuid: Uuid, input: AlbumInput) -> RepoResult<Option<Album>> {
        if self.get_album_by_uuid(uuid).await?.is_none() {
            return Ok(None);
        }
        if self.slug_taken("albums", &input.slug, Some(uuid)).await? {
            return Err(RepoError::Conflict("slug already exists".to_string()));
        }
        let (category_id, user_id) = self.album_owner_ids(&input).await?;

        sqlx::query(
            r#"
            UPDATE albums
            SET slug = $1, title = $2, description = $3, youtube_url = $4, images = $5,
                thumbnail = COALESCE($6, thumbnail), is_published = $7, category_id = $8,
                user_id = $9, updated_at = NOW()
            WHERE uuid = $10
            "#,
        )
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.youtube_url)
        .bind(&input.images)
        .bind(&input.thumbnail)
        .bind(input.is_published)
        .bind(category_id)
        .bind(user_id)
        .bind(uuid)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_to_conflict(e, "slug already exists"))?;

        self.get_album_by_uuid(uuid).await
    }

    async fn delete_album(&self, uuid: Uuid) -> RepoResult<Option<Vec<String>>> {
        let media: Option<(Vec<String>, Option<String>)> =
            sqlx::query_as("DELETE FROM albums WHERE uuid = $1 RETURNING images, thumbnail")
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;

        Ok(media.map(|album| collect_media(None, [album])))
    }

    async fn remove_album_image(&self, uuid: Uuid, image_url: &str) -> RepoResult<Option<Album>> {
        let image_url = image_url.trim_matches('"');

        // Stored values may carry stray quotes from older clients.
        let updated = sqlx::query(
            r#"
            UPDATE albums
            SET images = array_remove(array_remove(images, $2), '"' || $2 || '"'),
                updated_at = NOW()
            WHERE uuid = $1
            "#,
        )
        .bind(uuid)
        .bind(image_url)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_album_by_uuid(uuid).await
    }

    // --- FAQs ---

    async fn list_faqs(&self, query: &PageQuery) -> RepoResult<(Vec<Faq>, i64)> {
        self.paginate(
            FAQ_SELECT,
            "SELECT COUNT(*) FROM faqs",
            &["question_id", "question_en", "answer_id", "answer_en"],
            "created_at DESC, id DESC",
            query,
        )
        .await
    }

    async fn published_faqs(&self) -> RepoResult<Vec<Faq>> {
        let faqs = sqlx::query_as::<_, Faq>(&format!(
            "{FAQ_SELECT} WHERE is_published = true ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(faqs)
    }

    async fn get_faq_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Faq>> {
        let faq = sqlx::query_as::<_, Faq>(&format!("{FAQ_SELECT} WHERE uuid = $1"))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(faq)
    }

    async fn create_faq(&self, input: FaqInput) -> RepoResult<Faq> {
        let faq = sqlx::query_as::<_, Faq>(&format!(
            r#"
            INSERT INTO faqs (question_id, question_en, answer_id, answer_en, is_published)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            returning_columns(FAQ_SELECT)
        ))
        .bind(&input.question_id)
        .bind(&input.question_en)
        .bind(&input.answer_id)
        .bind(&input.answer_en)
        .bind(input.is_published)
        .fetch_one(&self.pool)
        .await?;
        Ok(faq)
    }

    async fn update_faq(&self, uuid: Uuid, input: FaqInput) -> RepoResult<Option<Faq>> {
        let faq = sqlx::query_as::<_, Faq>(&format!(
            r#"
            UPDATE faqs
            SET question_id = $1, question_en = $2, answer_id = $3, answer_en = $4,
                is_published = $5, updated_at = NOW()
            WHERE uuid = $6
            RETURNING {}
            "#,
            returning_columns(FAQ_SELECT)
        ))
        .bind(&input.question_id)
        .bind(&input.question_en)
        .bind(&input.answer_id)
        .bind(&input.answer_en)
        .bind(input.is_published)
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(faq)
    }

    async fn delete_faq(&self, uuid: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM faqs WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Website ---

    async fn get_website(&self) -> RepoResult<Option<Website>> {
        let website = sqlx::query_as::<_, Website>(&format!("{WEBSITE_SELECT} ORDER BY id LIMIT 1"))
            .fetch_optional(&self.pool)
            .await?;
        Ok(website)
    }

    async fn get_website_by_uuid(&self, uuid: Uuid) -> RepoResult<Option<Website>> {
        let website = sqlx::query_as::<_, Website>(&format!("{WEBSITE_SELECT} WHERE uuid = $1"))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(website)
    }

    async fn create_website(&self, input: &WebsiteInput) -> RepoResult<Website> {
        let mut w = Website::default();
        input.apply_to(&mut w);

        let website = sqlx::query_as::<_, Website>(&format!(
            r#"
            INSERT INTO websites (about_us_brief_home_en, about_us_brief_home_id, about_us_en,
                                  about_us_id, address, phone_number, email, url_instagram,
                                  url_facebook, url_tiktok, video_web, video_mobile, meta_title,
                                  meta_desc, meta_keyword, og_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            returning_columns(WEBSITE_SELECT)
        ))
        .bind(&w.about_us_brief_home_en)
        .bind(&w.about_us_brief_home_id)
        .bind(&w.about_us_en)
        .bind(&w.about_us_id)
        .bind(&w.address)
        .bind(&w.phone_number)
        .bind(&w.email)
        .bind(&w.url_instagram)
        .bind(&w.url_facebook)
        .bind(&w.url_tiktok)
        .bind(&w.video_web)
        .bind(&w.video_mobile)
        .bind(&w.meta_title)
        .bind(&w.meta_desc)
        .bind(&w.meta_keyword)
        .bind(&w.og_image)
        .fetch_one(&self.pool)
        .await?;
        Ok(website)
    }

    async fn update_website(&self, uuid: Uuid, input: &WebsiteInput) -> RepoResult<Option<Website>> {
        let Some(mut w) = self.get_website_by_uuid(uuid).await? else {
            return Ok(None);
        };
        input.apply_to(&mut w);

        let website = sqlx::query_as::<_, Website>(&format!(
            r#"
            UPDATE websites
            SET about_us_brief_home_en = $1, about_us_brief_home_id = $2, about_us_en = $3,
                about_us_id = $4, address = $5, phone_number = $6, email = $7,
                url_instagram = $8, url_facebook = $9, url_tiktok = $10, video_web = $11,
                video_mobile = $12, meta_title = $13, meta_desc = $14, meta_keyword = $15,
                og_image = $16, updated_at = NOW()
            WHERE uuid = $17
            RETURNING {}
            "#,
            returning_columns(WEBSITE_SELECT)
        ))
        .bind(&w.about_us_brief_home_en)
        .bind(&w.about_us_brief_home_id)
        .bind(&w.about_us_en)
        .bind(&w.about_us_id)
        .bind(&w.address)
        .bind(&w.phone_number)
        .bind(&w.email)
        .bind(&w.url_instagram)
        .bind(&w.url_facebook)
        .bind(&w.url_tiktok)
        .bind(&w.video_web)
        .bind(&w.video_mobile)
        .bind(&w.meta_title)
        .bind(&w.meta_desc)
        .bind(&w.meta_keyword)
        .bind(&w.og_image)
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(website)
    }

    async fn clear_website_media(&self, uuid: Uuid, field: WebsiteMedia) -> RepoResult<Option<String>> {
        let column = field.column();
        let mut tx = self.pool.begin().await?;

        let previous: Option<Option<String>> =
            sqlx::query_scalar(&format!("SELECT {column} FROM websites WHERE uuid = $1 FOR UPDATE"))
                .bind(uuid)
                .fetch_optional(&mut *tx)
                .await?;
        let previous =
            previous.ok_or_else(|| RepoError::NotFound("website not found".to_string()))?;

        sqlx::query(&format!(
            "UPDATE websites SET {column} = NULL, updated_at = NOW() WHERE uuid = $1"
        ))
        .bind(uuid)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(previous)
    }
}

/// The column list of a `SELECT ... FROM table` constant, reused for `RETURNING`.
fn returning_columns(select: &str) -> &str {
    let select = select.trim_start();
    let start = select.strip_prefix("SELECT").unwrap_or(select);
    match start.rfind("FROM") {
        Some(idx) => start[..idx].trim(),
        None => start.trim(),
    }
}
