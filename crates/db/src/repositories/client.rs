use crate::models::{DbClientSummary, DbClientUser};
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn list_clients(pool: &Pool<Postgres>) -> Result<Vec<DbClientSummary>> {
    let clients = sqlx::query_as::<_, DbClientSummary>(
        r#"
        SELECT c.id, c.username, c.display_name, c.created_at, COUNT(a.event_id) AS event_count
        FROM client_users c
        LEFT JOIN client_event_access a ON a.client_id = c.id
        GROUP BY c.id
        ORDER BY c.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

pub async fn get_client(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbClientUser>> {
    let client = sqlx::query_as::<_, DbClientUser>(
        r#"
        SELECT id, username, password_hash, display_name, created_at
        FROM client_users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(client)
}

pub async fn find_client_by_username(
    pool: &Pool<Postgres>,
    username: &str,
) -> Result<Option<DbClientUser>> {
    let client = sqlx::query_as::<_, DbClientUser>(
        r#"
        SELECT id, username, password_hash, display_name, created_at
        FROM client_users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(client)
}

/// Creates a client and its initial access grants in one transaction.
pub async fn create_client(
    pool: &Pool<Postgres>,
    username: &str,
    password_hash: &str,
    display_name: Option<&str>,
    event_ids: &[Uuid],
) -> Result<DbClientUser> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating client: id={}, username={}, grants={}",
        id,
        username,
        event_ids.len()
    );

    let mut tx = pool.begin().await?;

    let client = sqlx::query_as::<_, DbClientUser>(
        r#"
        INSERT INTO client_users (id, username, password_hash, display_name, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, username, password_hash, display_name, created_at
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .bind(display_name)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for event_id in event_ids {
        sqlx::query(
            r#"
            INSERT INTO client_event_access (client_id, event_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (client_id, event_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(event_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(client)
}

/// Replaces username and label. The password hash is only replaced when a
/// new one is given.
pub async fn update_client(
    pool: &Pool<Postgres>,
    id: Uuid,
    username: &str,
    password_hash: Option<&str>,
    display_name: Option<&str>,
) -> Result<Option<DbClientUser>> {
    let client = sqlx::query_as::<_, DbClientUser>(
        r#"
        UPDATE client_users
        SET username = $2,
            password_hash = COALESCE($3, password_hash),
            display_name = $4
        WHERE id = $1
        RETURNING id, username, password_hash, display_name, created_at
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .bind(display_name)
    .fetch_optional(pool)
    .await?;

    Ok(client)
}

pub async fn delete_client(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM client_users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_granted_event_ids(pool: &Pool<Postgres>, client_id: Uuid) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT event_id
        FROM client_event_access
        WHERE client_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Returns `false` when the grant already existed.
pub async fn grant_access(pool: &Pool<Postgres>, client_id: Uuid, event_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO client_event_access (client_id, event_id, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (client_id, event_id) DO NOTHING
        "#,
    )
    .bind(client_id)
    .bind(event_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn revoke_access(pool: &Pool<Postgres>, client_id: Uuid, event_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM client_event_access
        WHERE client_id = $1 AND event_id = $2
        "#,
    )
    .bind(client_id)
    .bind(event_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn has_access(pool: &Pool<Postgres>, client_id: Uuid, event_id: Uuid) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM client_event_access
            WHERE client_id = $1 AND event_id = $2
        )
        "#,
    )
    .bind(client_id)
    .bind(event_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}
