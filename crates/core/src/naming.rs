//! Object-key and file-name conventions.
//!
//! Event photos live under `events/<slug>/`, compressed copies under
//! `events/<slug>-compressed/`, and website images under
//! `website/<category-id>/`.

use std::path::Path;

use uuid::Uuid;

/// Extensions treated as photos when scanning folders or accepting uploads.
pub const PHOTO_EXTENSIONS: [&str; 17] = [
    "jpg", "jpeg", "png", "gif", "webp", "avif", "bmp", "tiff", "tif", "heic", "heif", "raw",
    "cr2", "nef", "arw", "dng", "jfif",
];

/// Extensions the `image` decoder in this workspace can read.
pub const COMPRESSIBLE_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "jfif", "png", "gif", "webp", "bmp", "tiff", "tif",
];

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_photo_file(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| PHOTO_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_compressible(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| COMPRESSIBLE_EXTENSIONS.contains(&ext.as_str()))
}

/// Lowercases and collapses every run of characters outside `[a-z0-9]`
/// into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "event".to_string()
    } else {
        slug
    }
}

/// Lowercases and collapses every run of characters outside `[a-z0-9.]`
/// into a single `-`, trimmed of `-` at both ends. Used for website keys.
pub fn sanitize_file_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' {
            if pending_dash && !sanitized.is_empty() {
                sanitized.push('-');
            }
            pending_dash = false;
            sanitized.push(c);
        } else {
            pending_dash = true;
        }
    }

    if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

/// The last component of a client-supplied file name. Browsers send folder
/// uploads with their relative path, using either separator.
pub fn base_file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Replaces characters outside `[A-Za-z0-9_-]` with `_`; used for folder
/// and archive names.
pub fn safe_folder_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if safe.is_empty() {
        "photos".to_string()
    } else {
        safe
    }
}

/// The file name without its final extension.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// `events/<slug>/<file name>`. The file name is kept as uploaded so that
/// delivery can match the stored copy back to its local original.
pub fn event_image_key(event_name: &str, file_name: &str) -> String {
    format!("events/{}/{}", slugify(event_name), base_file_name(file_name))
}

pub fn compressed_image_key(event_name: &str, file_name: &str) -> String {
    format!(
        "events/{}-compressed/{}.jpg",
        slugify(event_name),
        file_stem(base_file_name(file_name))
    )
}

pub fn website_image_key(category_id: Uuid, timestamp_millis: i64, file_name: &str) -> String {
    format!(
        "website/{}/{}-{}",
        category_id,
        timestamp_millis,
        sanitize_file_name(file_name)
    )
}

pub fn category_cover_key(category_id: Uuid, timestamp_millis: i64, file_name: &str) -> String {
    match extension_of(file_name) {
        Some(ext) => format!(
            "website/categories/{}/cover-{}.{}",
            category_id, timestamp_millis, ext
        ),
        None => format!("website/categories/{}/cover-{}", category_id, timestamp_millis),
    }
}

/// Guesses a MIME type from the file extension.
pub fn content_type_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("jpg" | "jpeg" | "jfif") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => "application/octet-stream",
    }
}
