use crate::models::DbEventImage;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Images of an event, newest first, optionally restricted to one status.
pub async fn list_event_images(
    pool: &Pool<Postgres>,
    event_id: Uuid,
    status: Option<&str>,
) -> Result<Vec<DbEventImage>> {
    let images = sqlx::query_as::<_, DbEventImage>(
        r#"
        SELECT id, event_id, image_url, object_key, status, created_at
        FROM event_images
        WHERE event_id = $1 AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(event_id)
    .bind(status)
    .fetch_all(pool)
    .await?;

    Ok(images)
}

pub async fn list_selected_image_urls(pool: &Pool<Postgres>, event_id: Uuid) -> Result<Vec<String>> {
    let urls = sqlx::query_scalar::<_, String>(
        r#"
        SELECT image_url
        FROM event_images
        WHERE event_id = $1 AND status = 'selected'
        ORDER BY created_at ASC
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(urls)
}

pub async fn get_event_image(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbEventImage>> {
    let image = sqlx::query_as::<_, DbEventImage>(
        r#"
        SELECT id, event_id, image_url, object_key, status, created_at
        FROM event_images
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(image)
}

pub async fn insert_event_image(
    pool: &Pool<Postgres>,
    event_id: Uuid,
    image_url: &str,
    object_key: &str,
) -> Result<DbEventImage> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let image = sqlx::query_as::<_, DbEventImage>(
        r#"
        INSERT INTO event_images (id, event_id, image_url, object_key, status, created_at)
        VALUES ($1, $2, $3, $4, 'none', $5)
        RETURNING id, event_id, image_url, object_key, status, created_at
        "#,
    )
    .bind(id)
    .bind(event_id)
    .bind(image_url)
    .bind(object_key)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(image)
}

pub async fn update_image_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: &str,
) -> Result<Option<DbEventImage>> {
    let image = sqlx::query_as::<_, DbEventImage>(
        r#"
        UPDATE event_images
        SET status = $2
        WHERE id = $1
        RETURNING id, event_id, image_url, object_key, status, created_at
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?;

    Ok(image)
}

/// Sets `status` on every image of an event, or only on those currently in
/// `only_status`. Returns the number of rows changed.
pub async fn bulk_update_status(
    pool: &Pool<Postgres>,
    event_id: Uuid,
    status: &str,
    only_status: Option<&str>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE event_images
        SET status = $2
        WHERE event_id = $1 AND ($3::text IS NULL OR status = $3)
        "#,
    )
    .bind(event_id)
    .bind(status)
    .bind(only_status)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Deletes images and queues their storage objects for removal in the same
/// transaction.
pub async fn delete_event_images(pool: &Pool<Postgres>, ids: &[Uuid]) -> Result<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO pending_object_deletions (object_key)
        SELECT object_key FROM event_images
        WHERE id = ANY($1) AND object_key IS NOT NULL
        ON CONFLICT (object_key) DO NOTHING
        "#,
    )
    .bind(ids)
    .execute(&mut *tx)
    .await?;

    let deleted = sqlx::query(
        r#"
        DELETE FROM event_images
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    Ok(deleted)
}
