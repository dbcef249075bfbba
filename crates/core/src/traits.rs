//! ObjectStore trait definition
//!
//! This trait defines the transport primitives the client is built on. It keeps
//! the client decoupled from the specific S3 SDK implementation and lets tests
//! substitute a mock.

use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

use crate::error::Result;

/// Per-call transport options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Retries after the first attempt; `None` keeps the session default
    pub retries: Option<u32>,
}

impl RequestOptions {
    pub fn with_retries(retries: u32) -> Self {
        Self {
            retries: Some(retries),
        }
    }

    /// Total attempts the transport should make, given the session default
    pub fn max_attempts(&self, default_retries: u32) -> u32 {
        self.retries.unwrap_or(default_retries).saturating_add(1)
    }
}

/// Payload of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadBody {
    /// In-memory bytes
    Bytes(Vec<u8>),
    /// Local file, streamed from disk at upload time
    File(PathBuf),
}

/// A single upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadInput {
    pub bucket: String,
    pub key: String,
    pub body: UploadBody,
    pub content_type: Option<String>,
}

impl UploadInput {
    pub fn bytes(bucket: impl Into<String>, key: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            body: UploadBody::Bytes(data),
            content_type: None,
        }
    }

    pub fn file(bucket: impl Into<String>, key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            body: UploadBody::File(path.into()),
            content_type: None,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutput {
    pub bucket: String,
    pub key: String,

    /// ETag without surrounding quotes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    /// Bytes sent
    pub size: u64,

    /// Whether the object was assembled from multiple parts
    pub multipart: bool,
}

/// Metadata returned by a HEAD request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    /// User-defined `x-amz-meta-*` entries
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub user_metadata: HashMap<String, String>,
}

impl ObjectMetadata {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            content_type: None,
            last_modified: None,
            etag: None,
            storage_class: None,
            version_id: None,
            user_metadata: HashMap::new(),
        }
    }

    /// Human-readable size
    pub fn size_human(&self) -> String {
        humansize::format_size(self.size, humansize::BINARY)
    }
}

/// One entry of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl ObjectInfo {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            etag: None,
            storage_class: None,
        }
    }

    /// Human-readable size
    pub fn size_human(&self) -> String {
        humansize::format_size(self.size, humansize::BINARY)
    }
}

/// One page of a prefix listing, in the order the store returned it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
    pub objects: Vec<ObjectInfo>,

    /// No further pages follow
    pub is_last_page: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_continuation_token: Option<String>,
}

/// Readable object body
pub type BodyReader = Pin<Box<dyn AsyncRead + Send>>;

/// A GET response whose body has not been read yet
pub struct ObjectBody {
    pub metadata: ObjectMetadata,
    pub body: BodyReader,
}

impl ObjectBody {
    /// Wrap an in-memory payload
    pub fn from_bytes(key: impl Into<String>, data: Vec<u8>) -> Self {
        let metadata = ObjectMetadata::new(key, data.len() as u64);
        Self {
            metadata,
            body: Box::pin(std::io::Cursor::new(data)),
        }
    }
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBody")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Transport primitives of an S3-compatible object store
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
/// Implementations must report absent objects as `Error::NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload one object, in parts when it exceeds the configured part size
    async fn put_object(&self, input: UploadInput, options: RequestOptions) -> Result<UploadOutput>;

    /// Start a GET and hand back the unread body
    async fn get_object(&self, bucket: &str, key: &str, options: RequestOptions)
        -> Result<ObjectBody>;

    /// Fetch object metadata without the body
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata>;

    /// Fetch one page of keys under `prefix`
    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage>;
}
