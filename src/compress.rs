//! Compresses a folder of photos into a ZIP of web-sized JPEGs.
//!
//! Usage: `compress <input-dir> [output-dir] [quality]`

use std::fs::File;
use std::path::PathBuf;

use color_eyre::eyre::{Result, WrapErr, bail};
use studio_core::compress::{CompressOptions, compress_folder, compressed_archive_name};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv::dotenv().ok();

    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.len() > 3 {
        bail!("usage: compress <input-dir> [output-dir] [quality]");
    }

    let input_dir = PathBuf::from(&args[0]);
    if !input_dir.is_dir() {
        bail!("{} is not a directory", input_dir.display());
    }
    let output_dir = args.get(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let quality = args
        .get(2)
        .map(|raw| raw.parse::<u8>())
        .transpose()
        .wrap_err("quality must be a number between 1 and 100")?;
    let options = CompressOptions::new(None, quality)?;

    let folder_name = input_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("photos");
    let archive_path = output_dir.join(compressed_archive_name(folder_name));
    let file = File::create(&archive_path)
        .wrap_err_with(|| format!("Failed to create {}", archive_path.display()))?;

    info!(
        "Compressing {} at quality {} (max width {})",
        input_dir.display(),
        options.quality,
        options.max_width
    );
    let summary = compress_folder(&input_dir, file, &options)?;

    for name in &summary.skipped {
        warn!("Skipped {}", name);
    }
    println!(
        "Compressed {} photo(s), skipped {} file(s) into {}",
        summary.compressed,
        summary.skipped.len(),
        archive_path.display()
    );

    Ok(())
}
