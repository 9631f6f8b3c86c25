//! Operation log of storage objects waiting to be removed.
//!
//! Rows are written in the same transaction that deletes the database
//! records referencing the objects, so no object is forgotten when the
//! storage call fails afterwards. Draining the log is idempotent.

use crate::models::DbPendingDeletion;
use eyre::Result;
use sqlx::{Pool, Postgres};

pub async fn enqueue_deletion(pool: &Pool<Postgres>, object_key: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO pending_object_deletions (object_key)
        VALUES ($1)
        ON CONFLICT (object_key) DO NOTHING
        "#,
    )
    .bind(object_key)
    .execute(pool)
    .await?;

    Ok(())
}

/// Least-retried entries first, oldest first among equals, so keys that
/// keep failing do not starve newer ones.
pub const LIST_PENDING_SQL: &str = r#"
    SELECT object_key, enqueued_at, attempts, last_error
    FROM pending_object_deletions
    ORDER BY attempts ASC, enqueued_at ASC
    LIMIT $1
"#;

pub async fn list_pending_deletions(
    pool: &Pool<Postgres>,
    limit: i64,
) -> Result<Vec<DbPendingDeletion>> {
    let pending = sqlx::query_as::<_, DbPendingDeletion>(LIST_PENDING_SQL)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(pending)
}

/// Whether any image row or category cover still points at the object.
/// Keys are derived from file names, so a re-upload can share one object
/// between rows.
pub async fn is_object_referenced(pool: &Pool<Postgres>, object_key: &str) -> Result<bool> {
    let referenced = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (SELECT 1 FROM event_images WHERE object_key = $1)
            OR EXISTS (SELECT 1 FROM website_category_images WHERE object_key = $1)
            OR EXISTS (SELECT 1 FROM website_categories WHERE cover_object_key = $1)
        "#,
    )
    .bind(object_key)
    .fetch_one(pool)
    .await?;

    Ok(referenced)
}

pub async fn complete_deletion(pool: &Pool<Postgres>, object_key: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM pending_object_deletions
        WHERE object_key = $1
        "#,
    )
    .bind(object_key)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn record_deletion_failure(
    pool: &Pool<Postgres>,
    object_key: &str,
    error: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE pending_object_deletions
        SET attempts = attempts + 1, last_error = $2
        WHERE object_key = $1
        "#,
    )
    .bind(object_key)
    .bind(error)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn count_pending_deletions(pool: &Pool<Postgres>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM pending_object_deletions
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
