use axum::{Json, extract::State};
use chrono::Local;
use std::sync::Arc;
use studio_core::{
    errors::StudioError,
    finance::{self, DashboardSummary, PaymentSummary},
    models::booking::Booking,
};

use crate::{
    ApiState,
    middleware::{auth::AdminSession, error_handling::AppError},
};

async fn all_bookings(state: &ApiState) -> Result<Vec<Booking>, AppError> {
    let rows = studio_db::repositories::booking::list_bookings(&state.db_pool)
        .await
        .map_err(StudioError::Database)?;

    let bookings = rows
        .into_iter()
        .map(Booking::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bookings)
}

/// Event counts, today's schedule, revenue and outstanding balances. "Today"
/// and "this month" follow the server's local calendar.
#[axum::debug_handler]
pub async fn dashboard(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
) -> Result<Json<DashboardSummary>, AppError> {
    let bookings = all_bookings(&state).await?;
    let today = Local::now().date_naive();

    Ok(Json(finance::dashboard(&bookings, today)))
}

#[axum::debug_handler]
pub async fn payments(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
) -> Result<Json<PaymentSummary>, AppError> {
    let bookings = all_bookings(&state).await?;

    Ok(Json(finance::payment_summary(&bookings)))
}
