//! Creates or updates the studio schema without starting the server.

use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use studio_db::schema::initialize_database;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .wrap_err("DATABASE_URL environment variable must be set")?;

    println!("Connecting to database...");
    let db_pool = studio_db::create_pool(&database_url)
        .await
        .wrap_err("Could not connect to the studio database")?;

    println!("Creating studio tables...");
    initialize_database(&db_pool).await?;
    println!("Bookings, clients, galleries, website and cleanup tables are ready.");

    Ok(())
}
