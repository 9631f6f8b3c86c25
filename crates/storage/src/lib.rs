//! # Studio Storage
//!
//! Object storage for event photos and website images.
//!
//! Handlers only see the [`ObjectStore`] trait. [`S3Store`] talks to any
//! S3-compatible service (AWS, MinIO); [`MemoryStore`] keeps objects in
//! process and backs tests and local development.

use async_trait::async_trait;
use eyre::Result;

pub mod memory;
pub mod s3_store;

pub use memory::MemoryStore;
pub use s3_store::{S3Config, S3Store};

/// Storage operations used by the API.
///
/// Implementations must treat deleting a missing object as success so that
/// cleanup can be retried safely.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Removes the object at `key`.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Public URL served for `key`.
    fn public_url(&self, key: &str) -> String;

    /// Inverse of [`ObjectStore::public_url`]. Returns `None` for URLs that do
    /// not point into this store.
    fn key_from_url(&self, url: &str) -> Option<String>;
}

/// Percent-encodes each `/`-separated segment of an object key.
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Decodes a key taken from a URL path. Invalid escapes are kept verbatim.
pub fn decode_key(path: &str) -> String {
    urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
