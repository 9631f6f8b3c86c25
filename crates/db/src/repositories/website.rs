use crate::models::{DbCategoryImage, DbCategorySummary, DbWebsiteCategory};
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn list_categories(pool: &Pool<Postgres>) -> Result<Vec<DbCategorySummary>> {
    let categories = sqlx::query_as::<_, DbCategorySummary>(
        r#"
        SELECT c.id, c.name, c.is_default, c.sort_order, c.cover_image_url, c.cover_object_key,
            c.created_at, COUNT(i.id) AS image_count
        FROM website_categories c
        LEFT JOIN website_category_images i ON i.category_id = c.id
        GROUP BY c.id
        ORDER BY c.sort_order ASC, c.created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

pub async fn get_category(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbWebsiteCategory>> {
    let category = sqlx::query_as::<_, DbWebsiteCategory>(
        r#"
        SELECT id, name, is_default, sort_order, cover_image_url, cover_object_key, created_at
        FROM website_categories
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(category)
}

/// New categories are never protected and go after the existing ones.
pub async fn create_category(pool: &Pool<Postgres>, name: &str) -> Result<DbWebsiteCategory> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let category = sqlx::query_as::<_, DbWebsiteCategory>(
        r#"
        INSERT INTO website_categories (id, name, is_default, sort_order, created_at)
        SELECT $1, $2, FALSE, COALESCE(MAX(sort_order), 0) + 1, $3
        FROM website_categories
        RETURNING id, name, is_default, sort_order, cover_image_url, cover_object_key, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(category)
}

pub async fn rename_category(
    pool: &Pool<Postgres>,
    id: Uuid,
    name: &str,
) -> Result<Option<DbWebsiteCategory>> {
    let category = sqlx::query_as::<_, DbWebsiteCategory>(
        r#"
        UPDATE website_categories
        SET name = $2
        WHERE id = $1
        RETURNING id, name, is_default, sort_order, cover_image_url, cover_object_key, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(category)
}

pub async fn count_category_images(pool: &Pool<Postgres>, category_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM website_category_images
        WHERE category_id = $1
        "#,
    )
    .bind(category_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Deletes a category and queues its cover object for removal.
pub async fn delete_category(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO pending_object_deletions (object_key)
        SELECT cover_object_key FROM website_categories
        WHERE id = $1 AND cover_object_key IS NOT NULL
        ON CONFLICT (object_key) DO NOTHING
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO pending_object_deletions (object_key)
        SELECT object_key FROM website_category_images
        WHERE category_id = $1 AND object_key IS NOT NULL
        ON CONFLICT (object_key) DO NOTHING
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let deleted = sqlx::query(
        r#"
        DELETE FROM website_categories
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    Ok(deleted > 0)
}

/// Points the category at a new cover and queues the previous cover object
/// for removal.
pub async fn set_category_cover(
    pool: &Pool<Postgres>,
    id: Uuid,
    image_url: &str,
    object_key: &str,
) -> Result<Option<DbWebsiteCategory>> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO pending_object_deletions (object_key)
        SELECT cover_object_key FROM website_categories
        WHERE id = $1 AND cover_object_key IS NOT NULL AND cover_object_key <> $2
        ON CONFLICT (object_key) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(object_key)
    .execute(&mut *tx)
    .await?;

    let category = sqlx::query_as::<_, DbWebsiteCategory>(
        r#"
        UPDATE website_categories
        SET cover_image_url = $2, cover_object_key = $3
        WHERE id = $1
        RETURNING id, name, is_default, sort_order, cover_image_url, cover_object_key, created_at
        "#,
    )
    .bind(id)
    .bind(image_url)
    .bind(object_key)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(category)
}

pub async fn list_category_images(
    pool: &Pool<Postgres>,
    category_id: Uuid,
) -> Result<Vec<DbCategoryImage>> {
    let images = sqlx::query_as::<_, DbCategoryImage>(
        r#"
        SELECT id, category_id, image_url, object_key, alt_text, sort_order, created_at
        FROM website_category_images
        WHERE category_id = $1
        ORDER BY sort_order ASC, created_at ASC
        "#,
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;

    Ok(images)
}

/// Sort order for the next image appended to a category, starting at 0.
pub async fn next_image_sort_order(pool: &Pool<Postgres>, category_id: Uuid) -> Result<i32> {
    let next = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT COALESCE(MAX(sort_order) + 1, 0)
        FROM website_category_images
        WHERE category_id = $1
        "#,
    )
    .bind(category_id)
    .fetch_one(pool)
    .await?;

    Ok(next)
}

pub async fn insert_category_image(
    pool: &Pool<Postgres>,
    category_id: Uuid,
    image_url: &str,
    object_key: &str,
    alt_text: &str,
    sort_order: i32,
) -> Result<DbCategoryImage> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let image = sqlx::query_as::<_, DbCategoryImage>(
        r#"
        INSERT INTO website_category_images
            (id, category_id, image_url, object_key, alt_text, sort_order, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, category_id, image_url, object_key, alt_text, sort_order, created_at
        "#,
    )
    .bind(id)
    .bind(category_id)
    .bind(image_url)
    .bind(object_key)
    .bind(alt_text)
    .bind(sort_order)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(image)
}

pub async fn update_alt_text(
    pool: &Pool<Postgres>,
    id: Uuid,
    alt_text: &str,
) -> Result<Option<DbCategoryImage>> {
    let image = sqlx::query_as::<_, DbCategoryImage>(
        r#"
        UPDATE website_category_images
        SET alt_text = $2
        WHERE id = $1
        RETURNING id, category_id, image_url, object_key, alt_text, sort_order, created_at
        "#,
    )
    .bind(id)
    .bind(alt_text)
    .fetch_optional(pool)
    .await?;

    Ok(image)
}

/// Deletes images of one category and queues their objects for removal.
pub async fn delete_category_images(
    pool: &Pool<Postgres>,
    category_id: Uuid,
    ids: &[Uuid],
) -> Result<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO pending_object_deletions (object_key)
        SELECT object_key FROM website_category_images
        WHERE category_id = $1 AND id = ANY($2) AND object_key IS NOT NULL
        ON CONFLICT (object_key) DO NOTHING
        "#,
    )
    .bind(category_id)
    .bind(ids)
    .execute(&mut *tx)
    .await?;

    let deleted = sqlx::query(
        r#"
        DELETE FROM website_category_images
        WHERE category_id = $1 AND id = ANY($2)
        "#,
    )
    .bind(category_id)
    .bind(ids)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    Ok(deleted)
}
