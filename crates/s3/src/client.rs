//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from osc-core.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::primitives::{ByteStream, Length};
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_smithy_types::retry::RetryConfig;

use osc_core::{
    Error, ListPage, ObjectBody, ObjectInfo, ObjectMetadata, ObjectStore, ObjectStoreClient,
    RequestOptions, Result, SessionConfig, UploadBody, UploadInput, UploadOutput,
};

use crate::error::map_sdk_error;
use crate::multipart::UploadPlan;

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    default_retries: u32,
    part_size: u64,
}

/// Build a connected high-level client from session settings
pub async fn connect(config: SessionConfig) -> Result<ObjectStoreClient<S3Client>> {
    let store = S3Client::new(&config).await?;
    ObjectStoreClient::new(store, config)
}

impl S3Client {
    /// Create a new S3 client from session settings
    ///
    /// No network traffic happens here; bad credentials or an unreachable
    /// endpoint surface on the first request.
    pub async fn new(session: &SessionConfig) -> Result<Self> {
        session.validate()?;

        let credentials = aws_credential_types::Credentials::new(
            session.access_key.clone(),
            session.secret_key.clone(),
            None, // session token
            None, // expiry
            "osc-static-credentials",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(session.region.clone()))
            .retry_config(
                RetryConfig::standard()
                    .with_max_attempts(session.default_retries.saturating_add(1)),
            );

        if let Some(endpoint) = session.endpoint_url()? {
            tracing::debug!(endpoint = %endpoint, "using custom endpoint");
            loader = loader.endpoint_url(endpoint);
        }

        let config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(session.force_path_style)
            .build();

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            default_retries: session.default_retries,
            part_size: session.part_size,
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    /// Per-request config carrying the attempt budget for `options`
    fn request_config(&self, options: RequestOptions) -> aws_sdk_s3::config::Builder {
        aws_sdk_s3::Config::builder().retry_config(
            RetryConfig::standard().with_max_attempts(options.max_attempts(self.default_retries)),
        )
    }

    /// Single `PutObject`; the payload is moved into the request body
    async fn put_single(
        &self,
        input: UploadInput,
        size: u64,
        options: RequestOptions,
    ) -> Result<UploadOutput> {
        let UploadInput {
            bucket,
            key,
            body,
            content_type,
        } = input;
        let target = format!("{bucket}/{key}");

        let body = match body {
            UploadBody::Bytes(data) => ByteStream::from(data),
            UploadBody::File(path) => ByteStream::from_path(&path)
                .await
                .map_err(|e| Error::local(&path, std::io::Error::other(e)))?,
        };

        let response = self
            .inner
            .put_object()
            .bucket(&bucket)
            .key(&key)
            .content_length(size as i64)
            .set_content_type(content_type)
            .body(body)
            .customize()
            .config_override(self.request_config(options))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &target))?;

        Ok(UploadOutput {
            bucket,
            key,
            etag: response.e_tag().map(trim_etag),
            version_id: response.version_id().map(str::to_string),
            size,
            multipart: false,
        })
    }

    async fn put_multipart(
        &self,
        input: &UploadInput,
        plan: UploadPlan,
        options: RequestOptions,
    ) -> Result<UploadOutput> {
        let target = format!("{}/{}", input.bucket, input.key);

        let created = self
            .inner
            .create_multipart_upload()
            .bucket(&input.bucket)
            .key(&input.key)
            .set_content_type(input.content_type.clone())
            .customize()
            .config_override(self.request_config(options))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &target))?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| Error::Network(format!("{target}: no upload ID returned")))?
            .to_string();

        tracing::debug!(
            target_object = %target,
            parts = plan.parts(),
            part_size = plan.part_size,
            "started multipart upload"
        );

        match self
            .upload_parts_and_complete(input, &upload_id, plan, options, &target)
            .await
        {
            Ok(output) => Ok(output),
            Err(e) => {
                if let Err(abort_err) = self
                    .inner
                    .abort_multipart_upload()
                    .bucket(&input.bucket)
                    .key(&input.key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    tracing::warn!(
                        target_object = %target,
                        upload_id = %upload_id,
                        error = %map_sdk_error(abort_err, &target),
                        "failed to abort multipart upload"
                    );
                }
                Err(e)
            }
        }
    }

    async fn upload_parts_and_complete(
        &self,
        input: &UploadInput,
        upload_id: &str,
        plan: UploadPlan,
        options: RequestOptions,
        target: &str,
    ) -> Result<UploadOutput> {
        let mut completed = Vec::with_capacity(plan.parts() as usize);

        for (part_number, start, end) in plan.ranges() {
            let body = match &input.body {
                UploadBody::Bytes(data) => {
                    ByteStream::from(data[start as usize..end as usize].to_vec())
                }
                UploadBody::File(path) => file_range(path, start, end).await?,
            };

            let response = self
                .inner
                .upload_part()
                .bucket(&input.bucket)
                .key(&input.key)
                .upload_id(upload_id)
                .part_number(part_number)
                .content_length((end - start) as i64)
                .body(body)
                .customize()
                .config_override(self.request_config(options))
                .send()
                .await
                .map_err(|e| map_sdk_error(e, target))?;

            tracing::debug!(target_object = %target, part_number, "uploaded part");

            completed.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .set_e_tag(response.e_tag().map(str::to_string))
                    .build(),
            );
        }

        let response = self
            .inner
            .complete_multipart_upload()
            .bucket(&input.bucket)
            .key(&input.key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed))
                    .build(),
            )
            .customize()
            .config_override(self.request_config(options))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, target))?;

        Ok(UploadOutput {
            bucket: input.bucket.clone(),
            key: input.key.clone(),
            etag: response.e_tag().map(trim_etag),
            version_id: response.version_id().map(str::to_string),
            size: plan.total_size,
            multipart: true,
        })
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_object(&self, input: UploadInput, options: RequestOptions) -> Result<UploadOutput> {
        let size = match &input.body {
            UploadBody::Bytes(data) => data.len() as u64,
            UploadBody::File(path) => tokio::fs::metadata(path)
                .await
                .map_err(|e| Error::local(path, e))?
                .len(),
        };

        let plan = UploadPlan::new(size, self.part_size);
        if plan.is_multipart() {
            return self.put_multipart(&input, plan, options).await;
        }

        self.put_single(input, size, options).await
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        options: RequestOptions,
    ) -> Result<ObjectBody> {
        let target = format!("{bucket}/{key}");

        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .customize()
            .config_override(self.request_config(options))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &target))?;

        let mut metadata = ObjectMetadata::new(key, response.content_length().unwrap_or(0).max(0) as u64);
        metadata.content_type = response.content_type().map(str::to_string);
        metadata.last_modified = response.last_modified().and_then(to_timestamp);
        metadata.etag = response.e_tag().map(trim_etag);
        metadata.storage_class = response.storage_class().map(|s| s.as_str().to_string());
        metadata.version_id = response.version_id().map(str::to_string);
        if let Some(user) = response.metadata() {
            metadata.user_metadata = user.clone();
        }

        Ok(ObjectBody {
            metadata,
            body: Box::pin(response.body.into_async_read()),
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        let target = format!("{bucket}/{key}");

        let response = self
            .inner
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &target))?;

        let mut metadata = ObjectMetadata::new(key, response.content_length().unwrap_or(0).max(0) as u64);
        metadata.content_type = response.content_type().map(str::to_string);
        metadata.last_modified = response.last_modified().and_then(to_timestamp);
        metadata.etag = response.e_tag().map(trim_etag);
        metadata.storage_class = response.storage_class().map(|s| s.as_str().to_string());
        metadata.version_id = response.version_id().map(str::to_string);
        if let Some(user) = response.metadata() {
            metadata.user_metadata = user.clone();
        }

        Ok(metadata)
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage> {
        let mut request = self.inner.list_objects_v2().bucket(bucket);

        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }

        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("{bucket}/{prefix}")))?;

        let objects = response
            .contents()
            .iter()
            .map(|object| {
                let mut info = ObjectInfo::new(
                    object.key().unwrap_or_default(),
                    object.size().unwrap_or(0).max(0) as u64,
                );
                info.last_modified = object.last_modified().and_then(to_timestamp);
                info.etag = object.e_tag().map(trim_etag);
                info.storage_class = object.storage_class().map(|s| s.as_str().to_string());
                info
            })
            .collect::<Vec<_>>();

        let is_last_page = !response.is_truncated().unwrap_or(false);

        tracing::debug!(
            bucket,
            prefix,
            count = objects.len(),
            is_last_page,
            "listed page"
        );

        Ok(ListPage {
            objects,
            is_last_page,
            next_continuation_token: response.next_continuation_token().map(str::to_string),
        })
    }
}

/// Stream the byte range `[start, end)` of a local file
async fn file_range(path: &Path, start: u64, end: u64) -> Result<ByteStream> {
    ByteStream::read_from()
        .path(path)
        .offset(start)
        .length(Length::Exact(end - start))
        .build()
        .await
        .map_err(|e| Error::local(path, std::io::Error::other(e)))
}

fn to_timestamp(value: &aws_smithy_types::DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::new(value.secs(), value.subsec_nanos() as i32).ok()
}

fn trim_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionConfig {
        SessionConfig::new("us-east-1", "access", "secret")
            .with_endpoint("localhost:9000")
            .with_force_path_style(true)
            .with_disable_tls(true)
    }

    #[test]
    fn test_trim_etag() {
        assert_eq!(trim_etag("\"abc123\""), "abc123");
        assert_eq!(trim_etag("abc123"), "abc123");
    }

    #[test]
    fn test_to_timestamp() {
        let value = aws_smithy_types::DateTime::from_secs(1_700_000_000);
        let ts = to_timestamp(&value).unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_new_client_does_not_contact_server() {
        let client = S3Client::new(&session()).await.unwrap();
        assert_eq!(client.default_retries, osc_core::session::DEFAULT_RETRIES);
        assert_eq!(client.part_size, osc_core::session::DEFAULT_PART_SIZE);
    }

    #[tokio::test]
    async fn test_new_client_rejects_invalid_session() {
        let bad = SessionConfig::new("us-east-1", "", "secret");
        assert!(matches!(
            S3Client::new(&bad).await,
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_request_config_attempts() {
        let client = S3Client::new(&session().with_default_retries(2))
            .await
            .unwrap();

        let config = client.request_config(RequestOptions::default()).build();
        assert_eq!(config.retry_config().map(|r| r.max_attempts()), Some(3));

        let config = client
            .request_config(RequestOptions::with_retries(0))
            .build();
        assert_eq!(config.retry_config().map(|r| r.max_attempts()), Some(1));
    }

    #[tokio::test]
    async fn test_missing_local_file_is_local_error() {
        let client = S3Client::new(&session()).await.unwrap();
        let input = UploadInput::file("bucket", "key", "/nonexistent/osc/file.bin");

        let err = client
            .put_object(input, RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LocalPath { .. }));
    }

    #[tokio::test]
    async fn test_single_put_sends_owned_payload() {
        // Nothing listens on a freshly released port
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let session = session().with_endpoint(format!("127.0.0.1:{port}"));
        let client = S3Client::new(&session).await.unwrap();

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("small.bin");
        std::fs::write(&path, b"file payload").unwrap();

        let inputs = [
            UploadInput::bytes("bucket", "bytes.bin", b"payload".to_vec()),
            UploadInput::file("bucket", "file.bin", &path),
        ];
        for input in inputs {
            let key = input.key.clone();
            let err = client
                .put_object(input, RequestOptions::with_retries(0))
                .await
                .unwrap_err();
            match err {
                Error::Network(message) => assert!(message.starts_with(&format!("bucket/{key}:"))),
                other => panic!("expected network error for {key}, got {other:?}"),
            }
        }
    }
}
