//! JPEG re-encoding with optional downscaling.

use std::collections::HashSet;
use std::fs;
use std::io::{Seek, Write};
use std::path::Path;

use eyre::{Result, WrapErr};
use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::{StudioError, StudioResult};
use crate::naming::{file_stem, is_compressible, safe_folder_name};

pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_QUALITY: u8 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressOptions {
    pub max_width: u32,
    pub quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl CompressOptions {
    pub fn new(max_width: Option<u32>, quality: Option<u8>) -> StudioResult<Self> {
        let options = Self {
            max_width: max_width.unwrap_or(DEFAULT_MAX_WIDTH),
            quality: quality.unwrap_or(DEFAULT_QUALITY),
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> StudioResult<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(StudioError::Validation(
                "Quality must be between 1 and 100".to_string(),
            ));
        }
        if self.max_width == 0 {
            return Err(StudioError::Validation(
                "Max width must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Dimensions after fitting `width` into `max_width`. Narrower images keep
/// their size.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled.max(1))
}

/// Decodes `bytes`, downscales to `options.max_width` and encodes a JPEG.
/// The output is named after the input stem with a `.jpg` extension.
pub fn compress_image(file_name: &str, bytes: &[u8], options: &CompressOptions) -> Result<CompressedImage> {
    let image = image::load_from_memory(bytes)
        .wrap_err_with(|| format!("Failed to decode {}", file_name))?;

    let (width, height) = target_dimensions(image.width(), image.height(), options.max_width);
    let image = if (width, height) != (image.width(), image.height()) {
        image.resize_exact(width, height, FilterType::Lanczos3)
    } else {
        image
    };

    let rgb = image.to_rgb8();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, options.quality)
        .write_image(rgb.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .wrap_err_with(|| format!("Failed to encode {}", file_name))?;

    debug!(
        "Compressed {} to {}x{} ({} -> {} bytes)",
        file_name,
        width,
        height,
        bytes.len(),
        encoded.len()
    );

    Ok(CompressedImage {
        file_name: format!("{}.jpg", file_stem(file_name)),
        bytes: encoded,
        width,
        height,
    })
}

/// Result of compressing a folder into an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderCompression {
    pub archive_name: String,
    pub compressed: usize,
    pub skipped: Vec<String>,
}

pub fn compressed_archive_name(folder_name: &str) -> String {
    format!("{}_compressed.zip", safe_folder_name(folder_name))
}

/// Compresses every decodable image directly inside `input_dir` into a
/// ZIP under `<safe>_compressed/`. Other files are skipped and reported.
pub fn compress_folder<W: Write + Seek>(
    input_dir: &Path,
    writer: W,
    options: &CompressOptions,
) -> Result<FolderCompression> {
    options.validate()?;

    let folder_name = input_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("photos");
    let safe = safe_folder_name(folder_name);

    let mut entries = fs::read_dir(input_dir)
        .wrap_err_with(|| format!("Failed to read {}", input_dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .wrap_err("Failed to list input folder")?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut zip = ZipWriter::new(writer);
    let zip_options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut summary = FolderCompression {
        archive_name: compressed_archive_name(folder_name),
        ..FolderCompression::default()
    };
    let mut written = HashSet::new();

    for entry in entries {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_compressible(&name) {
            summary.skipped.push(name);
            continue;
        }

        let bytes = fs::read(entry.path())
            .wrap_err_with(|| format!("Failed to read {}", entry.path().display()))?;
        let compressed = match compress_image(&name, &bytes, options) {
            Ok(compressed) => compressed,
            Err(err) => {
                warn!("Skipping {}: {:#}", name, err);
                summary.skipped.push(name);
                continue;
            }
        };

        if !written.insert(compressed.file_name.clone()) {
            warn!("Skipping {}: {} already in archive", name, compressed.file_name);
            summary.skipped.push(name);
            continue;
        }

        zip.start_file(format!("{}_compressed/{}", safe, compressed.file_name), zip_options)
            .wrap_err("Failed to start archive entry")?;
        zip.write_all(&compressed.bytes)
            .wrap_err("Failed to write archive entry")?;
        summary.compressed += 1;
    }

    zip.finish().wrap_err("Failed to finish archive")?;
    Ok(summary)
}
