use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use studio_api::config::ApiConfig;
use studio_db::{create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env().wrap_err("Invalid studio configuration")?;

    let db_pool = create_pool(&config.database_url)
        .await
        .wrap_err("Could not connect to the studio database")?;
    initialize_database(&db_pool).await?;

    // Serves both portals and the public site until Ctrl-C
    studio_api::start_server(config, db_pool).await
}
