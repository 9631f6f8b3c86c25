use crate::models::DbBooking;
use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use studio_core::models::booking::BookingRequest;
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, client_name, client_phone, event_name, event_place, event_date, \
     start_time, end_time, price_quote, advance_paid, payment_method, photos_committed, status, \
     assistant_name, description, created_at";

pub async fn list_bookings(pool: &Pool<Postgres>) -> Result<Vec<DbBooking>> {
    let bookings = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM events
        ORDER BY event_date DESC NULLS LAST, start_time ASC NULLS LAST, created_at DESC
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

/// Bookings on `date`, in the order the conflict check scans them.
pub async fn list_bookings_on_date(
    pool: &Pool<Postgres>,
    date: NaiveDate,
) -> Result<Vec<DbBooking>> {
    let bookings = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM events
        WHERE event_date = $1
        ORDER BY start_time ASC NULLS LAST, created_at ASC
        "#
    ))
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

pub async fn get_booking(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbBooking>> {
    let booking = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM events
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

pub async fn create_booking(pool: &Pool<Postgres>, request: &BookingRequest) -> Result<DbBooking> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating booking: id={}, event_name={}", id, request.event_name);

    let booking = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        INSERT INTO events (id, client_name, client_phone, event_name, event_place, event_date,
            start_time, end_time, price_quote, advance_paid, payment_method, photos_committed,
            status, assistant_name, description, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(blank_to_none(&request.client_name))
    .bind(blank_to_none(&request.client_phone))
    .bind(request.event_name.trim())
    .bind(blank_to_none(&request.event_place))
    .bind(request.event_date)
    .bind(request.start_time)
    .bind(request.end_time)
    .bind(request.price_quote)
    .bind(request.advance_paid)
    .bind(blank_to_none(&request.payment_method))
    .bind(request.photos_committed)
    .bind(request.status.as_str())
    .bind(blank_to_none(&request.assistant_name))
    .bind(blank_to_none(&request.description))
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(booking)
}

pub async fn update_booking(
    pool: &Pool<Postgres>,
    id: Uuid,
    request: &BookingRequest,
) -> Result<Option<DbBooking>> {
    let booking = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        UPDATE events
        SET client_name = $2, client_phone = $3, event_name = $4, event_place = $5,
            event_date = $6, start_time = $7, end_time = $8, price_quote = $9,
            advance_paid = $10, payment_method = $11, photos_committed = $12, status = $13,
            assistant_name = $14, description = $15
        WHERE id = $1
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(blank_to_none(&request.client_name))
    .bind(blank_to_none(&request.client_phone))
    .bind(request.event_name.trim())
    .bind(blank_to_none(&request.event_place))
    .bind(request.event_date)
    .bind(request.start_time)
    .bind(request.end_time)
    .bind(request.price_quote)
    .bind(request.advance_paid)
    .bind(blank_to_none(&request.payment_method))
    .bind(request.photos_committed)
    .bind(request.status.as_str())
    .bind(blank_to_none(&request.assistant_name))
    .bind(blank_to_none(&request.description))
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

/// Deletes a booking. Its images go with it through the cascade, and their
/// storage objects are queued for removal in the same transaction.
pub async fn delete_booking(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let queued = sqlx::query(
        r#"
        INSERT INTO pending_object_deletions (object_key)
        SELECT object_key FROM event_images
        WHERE event_id = $1 AND object_key IS NOT NULL
        ON CONFLICT (object_key) DO NOTHING
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let deleted = sqlx::query(
        r#"
        DELETE FROM events
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    tracing::debug!(
        "Deleted booking {}: removed={}, queued_objects={}",
        id,
        deleted > 0,
        queued
    );
    Ok(deleted > 0)
}

/// Events a client has been granted access to.
pub async fn list_bookings_for_client(
    pool: &Pool<Postgres>,
    client_id: Uuid,
) -> Result<Vec<DbBooking>> {
    let bookings = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {columns}
        FROM events e
        JOIN client_event_access a ON a.event_id = e.id
        WHERE a.client_id = $1
        ORDER BY e.event_date DESC NULLS LAST, e.created_at DESC
        "#,
        columns = prefixed_columns("e")
    ))
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

fn prefixed_columns(alias: &str) -> String {
    BOOKING_COLUMNS
        .split(',')
        .map(|column| format!("{}.{}", alias, column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
