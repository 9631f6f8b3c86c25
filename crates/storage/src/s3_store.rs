//! S3-compatible storage backed by `rust-s3`.

use async_trait::async_trait;
use eyre::{Result, WrapErr, eyre};
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::{debug, info};

use crate::{ObjectStore, decode_key, encode_key};

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Custom endpoint such as `http://minio:9000`. `None` means AWS.
    pub endpoint: Option<String>,
    /// Base URL used when building public links. Defaults to `endpoint`.
    pub public_endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

impl S3Config {
    fn is_aws(&self) -> bool {
        self.endpoint.is_none()
    }

    /// Prefix every public URL of this bucket starts with.
    pub fn public_base(&self) -> String {
        match self.public_endpoint.as_ref().or(self.endpoint.as_ref()) {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

pub struct S3Store {
    bucket: Box<Bucket>,
    public_base: String,
}

impl S3Store {
    /// Builds the client. No request is made until the first operation.
    pub fn new(config: &S3Config) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .wrap_err("Failed to create S3 credentials")?;

        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", config.region));
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint,
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .wrap_err_with(|| format!("Failed to open bucket '{}'", config.bucket))?;
        if !config.is_aws() {
            // MinIO and friends expect http://endpoint/bucket/key
            bucket.set_path_style();
        }

        let public_base = config.public_base();
        info!(
            "S3 storage ready for bucket '{}', public base {}",
            config.bucket, public_base
        );

        Ok(Self {
            bucket,
            public_base,
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .wrap_err_with(|| format!("Failed to upload '{}'", key))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(eyre!("Upload of '{}' rejected with status {}", key, status));
        }

        debug!("Uploaded '{}' ({} bytes)", key, data.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .wrap_err_with(|| format!("Failed to delete '{}'", key))?;

        let status = response.status_code();
        if !(200..300).contains(&status) && status != 404 {
            return Err(eyre!("Delete of '{}' rejected with status {}", key, status));
        }

        debug!("Deleted '{}'", key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, encode_key(key))
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/", self.public_base);
        let rest = url.strip_prefix(&prefix)?;
        // Drop any query string a CDN may have appended
        let path = rest.split(['?', '#']).next().unwrap_or(rest);
        if path.is_empty() {
            return None;
        }
        Some(decode_key(path))
    }
}
