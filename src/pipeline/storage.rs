use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use thiserror::Error;

use super::event::ReportLocation;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Object storage request failed for s3://{bucket}/{key}: {reason}")]
    Request {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Failed to read object body for s3://{bucket}/{key}: {reason}")]
    Body {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Empty file body for s3://{bucket}/{key}")]
    EmptyBody { bucket: String, key: String },
}

/// Object storage abstraction (allows mocking for tests)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Full object body. An empty body is reported as `FetchError::EmptyBody`.
    async fn fetch(&self, location: &ReportLocation) -> Result<Vec<u8>, FetchError>;
}

/// S3-backed object store.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Client from the default AWS credential and region chain.
    pub async fn from_env() -> Self {
        let aws_config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&aws_config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn fetch(&self, location: &ReportLocation) -> Result<Vec<u8>, FetchError> {
        let output = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| FetchError::Body {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                reason: e.to_string(),
            })?
            .into_bytes();

        ensure_non_empty(location, bytes.to_vec())
    }
}

/// In-memory object store for tests. Records every requested location.
pub struct InMemoryObjectStore {
    objects: HashMap<(String, String), Vec<u8>>,
    requests: Mutex<Vec<ReportLocation>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_object(mut self, bucket: &str, key: &str, bytes: &[u8]) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), bytes.to_vec());
        self
    }

    pub fn requests(&self) -> Vec<ReportLocation> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn fetch(&self, location: &ReportLocation) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(location.clone());
        }
        let bytes = self
            .objects
            .get(&(location.bucket.clone(), location.key.clone()))
            .cloned()
            .ok_or_else(|| FetchError::Request {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                reason: "NoSuchKey".into(),
            })?;
        ensure_non_empty(location, bytes)
    }
}

pub(crate) fn ensure_non_empty(
    location: &ReportLocation,
    bytes: Vec<u8>,
) -> Result<Vec<u8>, FetchError> {
    if bytes.is_empty() {
        return Err(FetchError::EmptyBody {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
        });
    }
    Ok(bytes)
}
