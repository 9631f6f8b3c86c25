use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::errors::StudioError;
use studio_core::models::{
    booking::Booking,
    client::{ClientSummary, ClientUser},
    gallery::EventImage,
    website::{CategoryImage, CategorySummary, WebsiteCategory},
};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub event_name: String,
    pub event_place: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub price_quote: i64,
    pub advance_paid: i64,
    pub payment_method: Option<String>,
    pub photos_committed: i32,
    pub status: String,
    pub assistant_name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbBooking> for Booking {
    type Error = StudioError;

    fn try_from(row: DbBooking) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            client_name: row.client_name,
            client_phone: row.client_phone,
            event_name: row.event_name,
            event_place: row.event_place,
            event_date: row.event_date,
            start_time: row.start_time,
            end_time: row.end_time,
            price_quote: row.price_quote,
            advance_paid: row.advance_paid,
            payment_method: row.payment_method,
            photos_committed: row.photos_committed,
            status: row.status.parse()?,
            assistant_name: row.assistant_name,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbClientUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DbClientUser> for ClientUser {
    fn from(row: DbClientUser) -> Self {
        ClientUser {
            id: row.id,
            username: row.username,
            display_name: row.display_name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbClientSummary {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub event_count: i64,
}

impl From<DbClientSummary> for ClientSummary {
    fn from(row: DbClientSummary) -> Self {
        ClientSummary {
            client: ClientUser {
                id: row.id,
                username: row.username,
                display_name: row.display_name,
                created_at: row.created_at,
            },
            event_count: row.event_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEventImage {
    pub id: Uuid,
    pub event_id: Uuid,
    pub image_url: String,
    pub object_key: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbEventImage> for EventImage {
    type Error = StudioError;

    fn try_from(row: DbEventImage) -> Result<Self, Self::Error> {
        Ok(EventImage {
            id: row.id,
            event_id: row.event_id,
            image_url: row.image_url,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWebsiteCategory {
    pub id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub sort_order: i32,
    pub cover_image_url: Option<String>,
    pub cover_object_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DbWebsiteCategory> for WebsiteCategory {
    fn from(row: DbWebsiteCategory) -> Self {
        WebsiteCategory {
            id: row.id,
            name: row.name,
            is_default: row.is_default,
            sort_order: row.sort_order,
            cover_image_url: row.cover_image_url,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCategorySummary {
    #[sqlx(flatten)]
    pub category: DbWebsiteCategory,
    pub image_count: i64,
}

impl From<DbCategorySummary> for CategorySummary {
    fn from(row: DbCategorySummary) -> Self {
        CategorySummary {
            category: row.category.into(),
            image_count: row.image_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCategoryImage {
    pub id: Uuid,
    pub category_id: Uuid,
    pub image_url: String,
    pub object_key: Option<String>,
    pub alt_text: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<DbCategoryImage> for CategoryImage {
    fn from(row: DbCategoryImage) -> Self {
        CategoryImage {
            id: row.id,
            category_id: row.category_id,
            image_url: row.image_url,
            alt_text: row.alt_text,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPendingDeletion {
    pub object_key: String,
    pub enqueued_at: DateTime<Utc>,
    pub attempts: i32,
    pub last_error: Option<String>,
}
