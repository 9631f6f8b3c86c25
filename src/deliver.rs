//! Packages the originals a client selected into a local delivery archive.
//!
//! Usage: `deliver <event-id> <originals-dir> [output-dir]`

use std::path::PathBuf;

use chrono::Local;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use dotenv::dotenv;
use studio_core::originals::package_delivery;
use studio_db::repositories::{booking, image};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("usage: deliver <event-id> <originals-dir> [output-dir]");
    }

    let event_id = Uuid::parse_str(&args[0])
        .wrap_err_with(|| format!("'{}' is not a valid event id", args[0]))?;
    let originals_dir = PathBuf::from(&args[1]);
    if !originals_dir.is_dir() {
        bail!("{} is not a directory", originals_dir.display());
    }
    let output_dir = args.get(2).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let database_url = std::env::var("DATABASE_URL")
        .wrap_err("DATABASE_URL environment variable must be set")?;
    let db_pool = studio_db::create_pool(&database_url).await?;

    let event = booking::get_booking(&db_pool, event_id)
        .await?
        .ok_or_else(|| eyre!("Event {} not found", event_id))?;
    let selected = image::list_selected_image_urls(&db_pool, event_id).await?;
    info!(
        "{} selected photo(s) for '{}'",
        selected.len(),
        event.event_name
    );

    let (report, package) = package_delivery(
        &selected,
        &originals_dir,
        &output_dir,
        &event.event_name,
        Local::now().date_naive(),
    )?;

    for url in &report.unmatched {
        warn!("No original found for {}", url);
    }
    for url in &report.duplicates {
        warn!("Original already packaged for {}", url);
    }

    println!("{}", report.summary());
    println!(
        "Wrote {} file(s) to {}",
        package.entries,
        package.path.display()
    );

    Ok(())
}
