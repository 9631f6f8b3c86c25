use std::fs;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use studio_core::originals::{
    LocalOriginal, OriginalsIndex, delivery_archive_name, extract_filename, match_selections,
    package_delivery, strip_extension, strip_timestamp_prefix, write_delivery_archive,
};
use tempfile::TempDir;
use zip::ZipArchive;

fn original(name: &str) -> LocalOriginal {
    LocalOriginal {
        name: name.to_string(),
        path: PathBuf::from("/originals").join(name),
    }
}

fn index_of(names: &[&str]) -> OriginalsIndex {
    let mut index = OriginalsIndex::new();
    for name in names {
        index.insert(original(name));
    }
    index
}

#[rstest]
#[case("https://cdn.example.com/events/wedding/My%20Photo.JPG", "My Photo.JPG")]
#[case("https://cdn.example.com/events/a/IMG_0001.jpg?token=abc", "IMG_0001.jpg")]
#[case("events/wedding/DSC%E2%80%AF0042.jpg", "DSC 0042.jpg")]
#[case("plain-name.png", "plain-name.png")]
fn test_extract_filename(#[case] url: &str, #[case] expected: &str) {
    assert_eq!(extract_filename(url), expected);
}

#[test]
fn test_extract_filename_normalizes_nbsp() {
    assert_eq!(
        extract_filename("https://cdn.example.com/a/Photo%C2%A01.jpg"),
        "Photo 1.jpg"
    );
}

#[rstest]
#[case("photo.jpg", "photo")]
#[case("archive.tar.gz", "archive.tar")]
#[case("noext", "noext")]
#[case("trailing.", "trailing.")]
fn test_strip_extension(#[case] name: &str, #[case] expected: &str) {
    assert_eq!(strip_extension(name), expected);
}

#[rstest]
#[case("12345-My Photo.jpg", Some("My Photo.jpg"))]
#[case("1700000000000-a.png", Some("a.png"))]
#[case("-a.png", None)]
#[case("123a-b.png", None)]
#[case("photo.jpg", None)]
fn test_strip_timestamp_prefix(#[case] name: &str, #[case] expected: Option<&str>) {
    assert_eq!(strip_timestamp_prefix(name), expected);
}

#[test]
fn test_basename_match_ignores_case_and_extension() {
    let index = index_of(&["My Photo.jpg"]);
    let url = "https://cdn.example.com/events/x/My%20Photo.JPG";

    let found = index
        .lookup(&extract_filename(url))
        .expect("expected a basename match");
    assert_eq!(found.name, "My Photo.jpg");
}

#[test]
fn test_prefixed_local_file_matches() {
    let index = index_of(&["12345-My Photo.jpg"]);
    let url = "https://cdn.example.com/events/x/My%20Photo.JPG";

    let found = index
        .lookup(&extract_filename(url))
        .expect("expected a prefix-stripped match");
    assert_eq!(found.name, "12345-My Photo.jpg");
}

#[test]
fn test_prefixed_remote_name_matches_plain_original() {
    let index = index_of(&["IMG_0042.CR2"]);

    let found = index
        .lookup("1700000000000-IMG_0042.jpg")
        .expect("expected a match through the stripped remote basename");
    assert_eq!(found.name, "IMG_0042.CR2");
}

#[test]
fn test_exact_name_wins_over_basename() {
    let index = index_of(&["shot.jpg", "shot.png"]);

    assert_eq!(index.lookup("shot.jpg").map(|o| o.name.as_str()), Some("shot.jpg"));
}

#[test]
fn test_key_collision_keeps_last_inserted() {
    let index = index_of(&["Shot.JPG", "shot.png"]);

    assert_eq!(index.lookup("shot.webp").map(|o| o.name.as_str()), Some("shot.png"));
}

#[test]
fn test_match_report_counts() {
    let index = index_of(&["a.jpg", "b.jpg"]);
    let urls = vec![
        "https://cdn.example.com/e/a.jpg".to_string(),
        "https://cdn.example.com/e/missing.jpg".to_string(),
        "https://cdn.example.com/e-compressed/b.jpg".to_string(),
        "https://cdn.example.com/e/B.png".to_string(),
    ];

    let report = match_selections(&urls, &index);

    assert_eq!(report.selected, 4);
    assert_eq!(report.matched.len(), 2);
    assert_eq!(report.unmatched, vec![urls[1].clone()]);
    assert_eq!(report.duplicates, vec![urls[3].clone()]);
    assert_eq!(report.summary(), "2 matched / 4 selected");
}

#[test]
fn test_archive_name() {
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    assert_eq!(
        delivery_archive_name("Asha Wedding", date),
        "Delivery_Asha_Wedding_2024-05-01.zip"
    );
}

#[test]
fn test_package_delivery_writes_only_matched_originals() {
    let originals = TempDir::new().unwrap();
    let dir = originals.path().join("Asha_Originals");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("My Photo.jpg"), b"original-1").unwrap();
    fs::write(dir.join("12345-Second.jpg"), b"original-2").unwrap();
    fs::write(dir.join("Unselected.jpg"), b"original-3").unwrap();
    fs::write(dir.join("notes.txt"), b"not a photo").unwrap();
    let output = TempDir::new().unwrap();
    let urls = [
        "https://cdn.example.com/events/asha/My%20Photo.JPG",
        "https://cdn.example.com/events/asha/Second.jpg",
        "https://cdn.example.com/events/asha/Lost.jpg",
    ];
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let (report, package) =
        package_delivery(&urls, &dir, output.path(), "Asha", date).expect("packaging failed");

    assert_eq!(report.matched.len(), 2);
    assert_eq!(package.entries, report.matched.len());
    assert_eq!(
        package.path,
        output.path().join("Delivery_Asha_Originals_2024-05-01.zip")
    );

    let mut archive = ZipArchive::new(fs::File::open(&package.path).unwrap()).unwrap();
    assert_eq!(archive.len(), report.matched.len());
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "Asha_Originals/12345-Second.jpg".to_string(),
            "Asha_Originals/My Photo.jpg".to_string(),
        ]
    );

    let mut entry = archive.by_name("Asha_Originals/My Photo.jpg").unwrap();
    assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
    let mut contents = Vec::new();
    entry.read_to_end(&mut contents).unwrap();
    assert_eq!(contents, b"original-1");
}

#[test]
fn test_package_delivery_without_matches_fails() {
    let originals = TempDir::new().unwrap();
    fs::write(originals.path().join("a.jpg"), b"a").unwrap();
    let output = TempDir::new().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let err = package_delivery(
        &["https://cdn.example.com/x/zzz.jpg"],
        originals.path(),
        output.path(),
        "Event",
        date,
    )
    .unwrap_err();

    assert!(err.to_string().contains("No matched originals to download"));
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}

#[test]
fn test_write_delivery_archive_in_memory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.jpg");
    fs::write(&path, b"bytes").unwrap();
    let mut index = OriginalsIndex::new();
    index.insert(LocalOriginal {
        name: "a.jpg".to_string(),
        path,
    });
    let report = match_selections(&["https://x.example.com/a.jpg"], &index);

    let mut buffer = Cursor::new(Vec::new());
    let written = write_delivery_archive(&mut buffer, "delivery_selected", &report.matched).unwrap();

    assert_eq!(written, 1);
    let archive = ZipArchive::new(Cursor::new(buffer.into_inner())).unwrap();
    assert_eq!(archive.len(), 1);
}
