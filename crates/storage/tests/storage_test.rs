use pretty_assertions::assert_eq;
use rstest::rstest;
use studio_storage::{MemoryStore, ObjectStore, S3Config, S3Store, decode_key, encode_key};

fn minio_config() -> S3Config {
    S3Config {
        endpoint: Some("http://minio:9000".to_string()),
        public_endpoint: Some("https://files.studio.example/".to_string()),
        region: "us-east-1".to_string(),
        bucket: "photos".to_string(),
        access_key: "minio".to_string(),
        secret_key: "minio-secret".to_string(),
    }
}

fn aws_config() -> S3Config {
    S3Config {
        endpoint: None,
        public_endpoint: None,
        region: "ap-south-1".to_string(),
        bucket: "studio-photos".to_string(),
        access_key: "AKIA".to_string(),
        secret_key: "secret".to_string(),
    }
}

#[test]
fn test_public_base_prefers_public_endpoint() {
    assert_eq!(
        minio_config().public_base(),
        "https://files.studio.example/photos"
    );

    let internal_only = S3Config {
        public_endpoint: None,
        ..minio_config()
    };
    assert_eq!(internal_only.public_base(), "http://minio:9000/photos");
}

#[test]
fn test_aws_public_url() {
    let store = S3Store::new(&aws_config()).unwrap();

    assert_eq!(
        store.public_url("events/wedding/a.jpg"),
        "https://studio-photos.s3.ap-south-1.amazonaws.com/events/wedding/a.jpg"
    );
}

#[rstest]
#[case("events/asha-wedding/DSC_001.jpg")]
#[case("website/categories/1/cover-17.png")]
#[case("events/odd name/My Photo.jpg")]
fn test_s3_key_round_trip(#[case] key: &str) {
    let store = S3Store::new(&minio_config()).unwrap();

    let url = store.public_url(key);
    assert!(url.starts_with("https://files.studio.example/photos/"));
    assert_eq!(store.key_from_url(&url).as_deref(), Some(key));
}

#[test]
fn test_s3_key_from_foreign_url() {
    let store = S3Store::new(&minio_config()).unwrap();

    assert_eq!(store.key_from_url("https://elsewhere.example/photos/a.jpg"), None);
    assert_eq!(store.key_from_url("https://files.studio.example/photos/"), None);
    assert_eq!(
        store
            .key_from_url("https://files.studio.example/photos/events/a.jpg?v=2")
            .as_deref(),
        Some("events/a.jpg")
    );
}

#[test]
fn test_key_encoding() {
    assert_eq!(encode_key("events/My Photo#1.jpg"), "events/My%20Photo%231.jpg");
    assert_eq!(decode_key("events/My%20Photo%231.jpg"), "events/My Photo#1.jpg");
}

#[tokio::test]
async fn test_memory_store_put_and_delete() {
    let store = MemoryStore::new("http://localhost/storage/");

    store
        .put("events/a/1.jpg", vec![1, 2, 3], "image/jpeg")
        .await
        .unwrap();
    let stored = store.get("events/a/1.jpg").await.unwrap();
    assert_eq!(stored.data, vec![1, 2, 3]);
    assert_eq!(stored.content_type, "image/jpeg");

    let url = store.public_url("events/a/1.jpg");
    assert_eq!(url, "http://localhost/storage/events/a/1.jpg");
    assert_eq!(store.key_from_url(&url).as_deref(), Some("events/a/1.jpg"));

    store.delete("events/a/1.jpg").await.unwrap();
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_memory_store_delete_is_idempotent() {
    let store = MemoryStore::default();

    store.delete("never/existed.jpg").await.unwrap();
    store.delete("never/existed.jpg").await.unwrap();
}

#[tokio::test]
async fn test_memory_store_failure_injection() {
    let store = MemoryStore::default();
    store.put("a.jpg", vec![0], "image/jpeg").await.unwrap();

    store.fail_puts(true);
    assert!(store.put("b.jpg", vec![0], "image/jpeg").await.is_err());

    store.fail_deletes(true);
    assert!(store.delete("a.jpg").await.is_err());
    assert!(store.contains("a.jpg").await);

    store.fail_deletes(false);
    store.delete("a.jpg").await.unwrap();
    assert_eq!(store.keys().await, Vec::<String>::new());
}
