//! Resume storage: object-store backend for uploaded resume PDFs.
//!
//! `AppState` holds an `Arc<dyn ResumeStore>`. The default backend is
//! `S3ResumeStore` (AWS S3 in production, MinIO locally).

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::config::Config;
use crate::errors::AppError;

/// Folder every resume object is stored under.
pub const RESUME_PREFIX: &str = "job_portal_resumes";

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Stores a PDF under `key` and returns the public URL it is served from.
    async fn put_pdf(&self, key: &str, body: Bytes) -> Result<String, AppError>;
}

/// Builds a unique object key for a resume uploaded at `millis`.
pub fn resume_key(millis: i64, nonce: uuid::Uuid) -> String {
    format!("{RESUME_PREFIX}/resume_{millis}_{}.pdf", nonce.simple())
}

pub struct S3ResumeStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
}

impl S3ResumeStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_url: String) -> Self {
        Self {
            client,
            bucket,
            public_url,
        }
    }

    /// Constructs an S3 client configured for MinIO (local) or AWS (production).
    pub async fn from_config(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "jobboard-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .load()
            .await;

        // MinIO only serves path-style addressing.
        let client_config = aws_sdk_s3::config::Builder::from(&s3_config)
            .force_path_style(true)
            .build();

        Self::new(
            aws_sdk_s3::Client::from_conf(client_config),
            config.s3_bucket.clone(),
            config.s3_public_url.clone(),
        )
    }

    pub fn object_url(&self, key: &str) -> String {
        object_url(&self.public_url, &self.bucket, key)
    }
}

#[async_trait]
impl ResumeStore for S3ResumeStore {
    async fn put_pdf(&self, key: &str, body: Bytes) -> Result<String, AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type("application/pdf")
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, key);
        Ok(self.object_url(key))
    }
}

fn object_url(public_url: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", public_url.trim_end_matches('/'), bucket, key)
}
