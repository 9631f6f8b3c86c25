use eyre::{Result, WrapErr};
use sqlx::{Pool, Postgres};
use tracing::{debug, info};

const TABLES: [&str; 7] = [
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        client_name VARCHAR(255) NULL,
        client_phone VARCHAR(32) NULL,
        event_name VARCHAR(255) NOT NULL,
        event_place VARCHAR(255) NULL,
        event_date DATE NULL,
        start_time TIME NULL,
        end_time TIME NULL,
        price_quote BIGINT NOT NULL DEFAULT 0,
        advance_paid BIGINT NOT NULL DEFAULT 0,
        payment_method VARCHAR(32) NULL,
        photos_committed INTEGER NOT NULL DEFAULT 0,
        status VARCHAR(16) NOT NULL DEFAULT 'upcoming',
        assistant_name VARCHAR(255) NULL,
        description TEXT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT valid_event_status CHECK (status IN ('upcoming', 'completed', 'cancelled')),
        CONSTRAINT valid_event_amounts CHECK (price_quote >= 0 AND advance_paid >= 0)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS client_users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        username VARCHAR(255) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL,
        display_name VARCHAR(255) NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS client_event_access (
        client_id UUID NOT NULL REFERENCES client_users(id) ON DELETE CASCADE,
        event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        PRIMARY KEY (client_id, event_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS event_images (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        image_url TEXT NOT NULL,
        object_key TEXT NULL,
        status VARCHAR(16) NOT NULL DEFAULT 'none',
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT valid_selection_status CHECK (status IN ('none', 'pending', 'selected'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS website_categories (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name VARCHAR(255) NOT NULL,
        is_default BOOLEAN NOT NULL DEFAULT FALSE,
        sort_order INTEGER NOT NULL DEFAULT 0,
        cover_image_url TEXT NULL,
        cover_object_key TEXT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS website_category_images (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        category_id UUID NOT NULL REFERENCES website_categories(id) ON DELETE CASCADE,
        image_url TEXT NOT NULL,
        object_key TEXT NULL,
        alt_text TEXT NOT NULL DEFAULT '',
        sort_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pending_object_deletions (
        object_key TEXT PRIMARY KEY,
        enqueued_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        attempts INTEGER NOT NULL DEFAULT 0,
        last_error TEXT NULL
    );
    "#,
];

const INDEXES: [&str; 8] = [
    "CREATE INDEX IF NOT EXISTS idx_events_event_date ON events(event_date);",
    "CREATE INDEX IF NOT EXISTS idx_client_event_access_event_id ON client_event_access(event_id);",
    "CREATE INDEX IF NOT EXISTS idx_event_images_event_id ON event_images(event_id);",
    "CREATE INDEX IF NOT EXISTS idx_event_images_status ON event_images(event_id, status);",
    "CREATE INDEX IF NOT EXISTS idx_category_images_category_id ON website_category_images(category_id);",
    "CREATE INDEX IF NOT EXISTS idx_pending_deletions_enqueued_at ON pending_object_deletions(enqueued_at);",
    "CREATE INDEX IF NOT EXISTS idx_pending_deletions_attempts ON pending_object_deletions(attempts, enqueued_at);",
    "CREATE INDEX IF NOT EXISTS idx_event_images_object_key ON event_images(object_key);",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for statement in TABLES.iter().chain(INDEXES.iter()) {
        debug!("Running schema statement: {}", statement.trim());
        sqlx::query(statement)
            .execute(pool)
            .await
            .wrap_err("Failed to apply schema statement")?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
