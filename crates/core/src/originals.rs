//! Matching client selections against locally kept originals.
//!
//! Selected images are known only by their remote URL, while the
//! full-resolution originals sit in a local folder. The two are joined on
//! file names using a few fallbacks, and the matched originals are packed
//! into an uncompressed ZIP for delivery.
//!
//! The join is a heuristic. When two local files reduce to the same key the
//! one registered last wins.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use eyre::{Result, WrapErr};
use tracing::{debug, warn};
use url::Url;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::StudioError;
use crate::naming::{is_photo_file, safe_folder_name};

pub const DEFAULT_DELIVERY_FOLDER: &str = "delivery_selected";

/// Last path segment of a remote URL, percent-decoded and with whitespace
/// normalised.
pub fn extract_filename(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .map(str::to_string),
        Err(_) => None,
    }
    .unwrap_or_else(|| {
        url.split(['?', '#'])
            .next()
            .unwrap_or(url)
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string()
    });

    let decoded = urlencoding::decode(&segment)
        .map(|d| d.into_owned())
        .unwrap_or(segment);
    normalize_whitespace(&decoded)
}

/// Maps every whitespace character (NBSP, narrow NBSP, tabs...) to a plain
/// space. Camera and OS tools insert these into generated names.
pub fn normalize_whitespace(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

/// Removes the final `.ext`, if any.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => &name[..idx],
        _ => name,
    }
}

/// Removes a leading `<digits>-` prefix added to names at upload time.
pub fn strip_timestamp_prefix(name: &str) -> Option<&str> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    name[digits..].strip_prefix('-')
}

fn basename_key(name: &str) -> String {
    strip_extension(name).to_lowercase()
}

/// A photo in the local originals folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalOriginal {
    pub name: String,
    pub path: PathBuf,
}

/// Lookup table from name keys to local originals.
#[derive(Debug, Default)]
pub struct OriginalsIndex {
    files: Vec<LocalOriginal>,
    keys: HashMap<String, usize>,
}

impl OriginalsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes the photos directly inside `dir`. Subfolders and non-photo
    /// files are ignored.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut entries = fs::read_dir(dir)
            .wrap_err_with(|| format!("Failed to read originals folder {}", dir.display()))?
            .collect::<std::io::Result<Vec<_>>>()
            .wrap_err("Failed to list originals folder")?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut index = Self::new();
        for entry in entries {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!("Skipping original with non UTF-8 name: {:?}", entry.path());
                continue;
            };
            if is_photo_file(&name) {
                index.insert(LocalOriginal {
                    name,
                    path: entry.path(),
                });
            }
        }

        debug!("Indexed {} originals from {}", index.len(), dir.display());
        Ok(index)
    }

    pub fn insert(&mut self, original: LocalOriginal) {
        let position = self.files.len();
        let name = normalize_whitespace(&original.name);

        let mut keys = vec![basename_key(&name), name.clone()];
        if let Some(stripped) = strip_timestamp_prefix(&name) {
            keys.push(basename_key(stripped));
            keys.push(stripped.to_string());
        }
        for key in keys {
            self.keys.insert(key, position);
        }

        self.files.push(original);
    }

    /// Finds the original for a remote file name: exact name first, then the
    /// lowercase basename, then the basename without a timestamp prefix.
    pub fn lookup(&self, remote_name: &str) -> Option<&LocalOriginal> {
        self.lookup_position(remote_name).map(|idx| &self.files[idx])
    }

    fn lookup_position(&self, remote_name: &str) -> Option<usize> {
        let name = normalize_whitespace(remote_name);
        let base = basename_key(&name);

        self.keys
            .get(&name)
            .or_else(|| self.keys.get(&base))
            .or_else(|| {
                strip_timestamp_prefix(&base).and_then(|stripped| self.keys.get(stripped))
            })
            .copied()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedOriginal {
    pub image_url: String,
    pub original: LocalOriginal,
}

/// Outcome of joining selections with the originals folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    pub selected: usize,
    pub matched: Vec<MatchedOriginal>,
    pub unmatched: Vec<String>,
    /// Selections resolving to an original already claimed by an earlier one.
    pub duplicates: Vec<String>,
}

impl MatchReport {
    pub fn summary(&self) -> String {
        format!("{} matched / {} selected", self.matched.len(), self.selected)
    }
}

pub fn match_selections<S: AsRef<str>>(image_urls: &[S], index: &OriginalsIndex) -> MatchReport {
    let mut report = MatchReport {
        selected: image_urls.len(),
        ..MatchReport::default()
    };
    let mut claimed = HashSet::new();

    for url in image_urls {
        let url = url.as_ref();
        match index.lookup_position(&extract_filename(url)) {
            Some(position) if claimed.insert(position) => {
                report.matched.push(MatchedOriginal {
                    image_url: url.to_string(),
                    original: index.files[position].clone(),
                });
            }
            Some(_) => report.duplicates.push(url.to_string()),
            None => report.unmatched.push(url.to_string()),
        }
    }

    report
}

/// `Delivery_<label>_<YYYY-MM-DD>.zip`
pub fn delivery_archive_name(label: &str, date: NaiveDate) -> String {
    format!(
        "Delivery_{}_{}.zip",
        safe_folder_name(label),
        date.format("%Y-%m-%d")
    )
}

/// Writes the matched originals into a STORE-only ZIP under `folder/`.
/// Returns the number of entries written.
pub fn write_delivery_archive<W: Write + Seek>(
    writer: W,
    folder: &str,
    matched: &[MatchedOriginal],
) -> Result<usize> {
    if matched.is_empty() {
        return Err(StudioError::Validation("No matched originals to download".to_string()).into());
    }

    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for item in matched {
        let bytes = fs::read(&item.original.path)
            .wrap_err_with(|| format!("Failed to read {}", item.original.path.display()))?;
        zip.start_file(format!("{}/{}", folder, item.original.name), options)
            .wrap_err("Failed to start archive entry")?;
        zip.write_all(&bytes)
            .wrap_err("Failed to write archive entry")?;
    }

    zip.finish().wrap_err("Failed to finish archive")?;
    Ok(matched.len())
}

/// Location and size of a written delivery archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPackage {
    pub path: PathBuf,
    pub entries: usize,
}

/// Matches `image_urls` against the originals in `originals_dir` and writes
/// the delivery archive into `output_dir`.
pub fn package_delivery<S: AsRef<str>>(
    image_urls: &[S],
    originals_dir: &Path,
    output_dir: &Path,
    fallback_label: &str,
    date: NaiveDate,
) -> Result<(MatchReport, DeliveryPackage)> {
    let index = OriginalsIndex::from_dir(originals_dir)?;
    let report = match_selections(image_urls, &index);

    let folder_name = originals_dir
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty());
    let folder = folder_name.unwrap_or(DEFAULT_DELIVERY_FOLDER);
    let label = folder_name.unwrap_or(fallback_label);

    if report.matched.is_empty() {
        return Err(StudioError::Validation("No matched originals to download".to_string()).into());
    }

    let path = output_dir.join(delivery_archive_name(label, date));
    let file = File::create(&path)
        .wrap_err_with(|| format!("Failed to create {}", path.display()))?;
    let entries = write_delivery_archive(file, folder, &report.matched)?;

    Ok((report, DeliveryPackage { path, entries }))
}
