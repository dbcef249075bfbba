//! Object store client
//!
//! `ObjectStoreClient` binds one validated session to an `ObjectStore` backend
//! and exposes the convenience operations: directory and object uploads,
//! in-memory, file and path downloads, existence checks, metadata and prefix
//! listing. Every operation is a thin forwarding call; the only policy it adds
//! is turning the not-found signal into `false` in [`ObjectStoreClient::object_exists`].

use std::io;
use std::ops::ControlFlow;
use std::path::{Component, Path, PathBuf};

use futures::future::BoxFuture;
use futures::stream::{self, Stream, TryStreamExt};
use futures::FutureExt;
use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::path::join_key;
use crate::session::SessionConfig;
use crate::traits::{
    ListPage, ObjectBody, ObjectInfo, ObjectMetadata, ObjectStore, RequestOptions, UploadInput,
    UploadOutput,
};

/// Bytes downloaded into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutput {
    pub data: Vec<u8>,
    pub size: u64,
}

/// A local file queued for upload during a directory walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub key: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Outcome of a directory upload
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadSummary {
    pub uploaded: Vec<UploadOutput>,
    pub total_bytes: u64,
}

/// Client bound to one object store session
#[derive(Debug)]
pub struct ObjectStoreClient<S> {
    store: S,
    config: SessionConfig,
}

impl<S: ObjectStore> ObjectStoreClient<S> {
    /// Bind a backend to its session
    ///
    /// Fails with `Error::Config` when the session does not validate. No
    /// request is sent.
    pub fn new(store: S, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Session this client was built from
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Underlying backend
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Upload every file below `local_path` under `key_prefix`
    ///
    /// The whole tree is walked first; any listing or open failure aborts
    /// before a single object is sent. Uploads then run one by one in walk
    /// order and stop at the first transport error, leaving earlier objects in
    /// place.
    pub async fn upload_directory(
        &self,
        local_path: impl AsRef<Path>,
        bucket: &str,
        key_prefix: &str,
    ) -> Result<UploadSummary> {
        let local_path = local_path.as_ref();
        let batch = collect_directory(local_path, key_prefix).await?;

        tracing::debug!(
            dir = %local_path.display(),
            bucket,
            prefix = key_prefix,
            files = batch.len(),
            "uploading directory"
        );

        self.upload_batch(bucket, batch).await
    }

    /// Upload an already collected batch, stopping at the first failure
    pub async fn upload_batch(
        &self,
        bucket: &str,
        batch: Vec<PendingUpload>,
    ) -> Result<UploadSummary> {
        let mut summary = UploadSummary::default();

        for pending in batch {
            let input = UploadInput::file(bucket, &pending.key, &pending.path);
            let output = self.store.put_object(input, RequestOptions::default()).await?;
            tracing::trace!(key = %output.key, size = output.size, "uploaded");
            summary.total_bytes += output.size;
            summary.uploaded.push(output);
        }

        Ok(summary)
    }

    /// Upload an in-memory payload
    ///
    /// `retries` applies to this call only.
    pub async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        retries: u32,
    ) -> Result<UploadOutput> {
        self.upload_input(UploadInput::bytes(bucket, key, data), retries)
            .await
    }

    /// Stream a local file into an object
    pub async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: impl AsRef<Path>,
        retries: u32,
    ) -> Result<UploadOutput> {
        self.upload_input(UploadInput::file(bucket, key, path.as_ref()), retries)
            .await
    }

    /// Upload a caller-assembled request
    pub async fn upload_input(&self, input: UploadInput, retries: u32) -> Result<UploadOutput> {
        tracing::debug!(bucket = %input.bucket, key = %input.key, retries, "upload");
        self.store
            .put_object(input, RequestOptions::with_retries(retries))
            .await
    }

    /// Start a GET and return the unread body
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        self.store
            .get_object(bucket, key, RequestOptions::default())
            .await
    }

    /// Download a whole object into memory
    ///
    /// Only suitable for objects that fit comfortably in memory.
    pub async fn download_object(
        &self,
        bucket: &str,
        key: &str,
        retries: u32,
    ) -> Result<DownloadOutput> {
        let mut object = self
            .store
            .get_object(bucket, key, RequestOptions::with_retries(retries))
            .await?;

        let mut data = Vec::with_capacity(object.metadata.size.min(64 * 1024 * 1024) as usize);
        object
            .body
            .read_to_end(&mut data)
            .await
            .map_err(|e| Error::Network(format!("reading {bucket}/{key}: {e}")))?;

        let size = data.len() as u64;
        Ok(DownloadOutput { data, size })
    }

    /// Stream an object into a caller-owned file handle
    ///
    /// The handle is flushed but not closed. Returns the number of bytes written.
    pub async fn download_object_to_file(
        &self,
        file: &mut File,
        bucket: &str,
        key: &str,
        retries: u32,
    ) -> Result<u64> {
        let mut object = self
            .store
            .get_object(bucket, key, RequestOptions::with_retries(retries))
            .await?;

        let written = tokio::io::copy(&mut object.body, file)
            .await
            .map_err(|e| Error::Network(format!("downloading {bucket}/{key}: {e}")))?;
        file.flush().await?;

        tracing::debug!(bucket, key, bytes = written, "downloaded to file");
        Ok(written)
    }

    /// Download `key_prefix/object_name` to `local_dir/object_name`
    ///
    /// `local_dir` and its parents are created when missing; the target file is
    /// created or truncated before the transfer starts. `object_name` may hold
    /// `/`-separated segments but no `..`, `.` or root component.
    pub async fn download_object_to_path(
        &self,
        local_dir: impl AsRef<Path>,
        object_name: &str,
        bucket: &str,
        key_prefix: &str,
    ) -> Result<u64> {
        let local_dir = local_dir.as_ref();
        if object_name.is_empty() {
            return Err(Error::InvalidPath("Object name cannot be empty".into()));
        }
        if !Path::new(object_name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(Error::InvalidPath(format!(
                "Object name must stay inside the target directory: {object_name}"
            )));
        }

        let target = local_dir.join(object_name);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::local(parent, e))?;
        }

        let mut file = File::create(&target)
            .await
            .map_err(|e| Error::local(&target, e))?;

        let key = join_key(key_prefix, object_name);
        self.download_object_to_file(&mut file, bucket, &key, self.config.default_retries)
            .await
    }

    /// Page through keys under `prefix`
    ///
    /// `callback` sees each page and whether it is the last one; returning
    /// `ControlFlow::Break(())` stops paging early.
    pub async fn list_objects<F>(&self, bucket: &str, prefix: &str, mut callback: F) -> Result<()>
    where
        F: FnMut(&ListPage, bool) -> ControlFlow<()>,
    {
        let mut token = None;
        loop {
            let page = self.store.list_objects_page(bucket, prefix, token).await?;
            let last = page.is_last_page || page.next_continuation_token.is_none();

            tracing::trace!(bucket, prefix, objects = page.objects.len(), last, "list page");

            if callback(&page, last).is_break() || last {
                return Ok(());
            }
            token = page.next_continuation_token;
        }
    }

    /// Lazy listing of every key under `prefix`
    ///
    /// Pages are fetched as the stream is polled; dropping the stream stops
    /// paging.
    pub fn list_stream<'a>(
        &'a self,
        bucket: &'a str,
        prefix: &'a str,
    ) -> impl Stream<Item = Result<ObjectInfo>> + Send + 'a {
        enum Cursor {
            Start,
            Next(String),
            Done,
        }

        stream::try_unfold(Cursor::Start, move |cursor| async move {
            let token = match cursor {
                Cursor::Start => None,
                Cursor::Next(token) => Some(token),
                Cursor::Done => return Ok(None),
            };

            let page = self.store.list_objects_page(bucket, prefix, token).await?;
            let next = match page.next_continuation_token {
                Some(token) if !page.is_last_page => Cursor::Next(token),
                _ => Cursor::Done,
            };

            let objects = stream::iter(page.objects.into_iter().map(Ok::<_, Error>));
            Ok::<_, Error>(Some((objects, next)))
        })
        .try_flatten()
    }

    /// Whether `key` exists in `bucket`
    ///
    /// Only the not-found signal becomes `Ok(false)`; every other failure is
    /// returned unchanged.
    pub async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.object_metadata(bucket, key).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// HEAD the object
    pub async fn object_metadata(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        self.store.head_object(bucket, key).await
    }
}

/// Walk `dir` and queue every file under `key_prefix`
///
/// Entries are visited in file-name order. Each file is opened once to prove
/// it is readable and closed straight away, so at most one handle is open.
/// Names that are not UTF-8 and entries that are not regular files (after
/// following symlinks) fail the walk.
pub async fn collect_directory(dir: &Path, key_prefix: &str) -> Result<Vec<PendingUpload>> {
    let mut batch = Vec::new();
    walk(dir.to_path_buf(), key_prefix.to_string(), &mut batch).await?;
    Ok(batch)
}

fn walk<'a>(
    dir: PathBuf,
    prefix: String,
    batch: &'a mut Vec<PendingUpload>,
) -> BoxFuture<'a, Result<()>> {
    async move {
        let mut reader = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| Error::local(&dir, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| Error::local(&dir, e))?
        {
            entries.push(entry);
        }
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().into_string().map_err(|_| {
                Error::InvalidPath(format!(
                    "File name is not valid UTF-8: {}",
                    path.display()
                ))
            })?;
            let key = join_key(&prefix, &name);

            let mut file_type = entry.file_type().await.map_err(|e| Error::local(&path, e))?;
            if file_type.is_symlink() {
                file_type = tokio::fs::metadata(&path)
                    .await
                    .map_err(|e| Error::local(&path, e))?
                    .file_type();
            }

            if file_type.is_dir() {
                walk(path, key, batch).await?;
                continue;
            }

            // FIFOs and devices can block on open
            if !file_type.is_file() {
                return Err(Error::local(
                    &path,
                    io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
                ));
            }

            let file = File::open(&path).await.map_err(|e| Error::local(&path, e))?;
            let size = file
                .metadata()
                .await
                .map_err(|e| Error::local(&path, e))?
                .len();
            drop(file);

            batch.push(PendingUpload { key, path, size });
        }

        Ok(())
    }
    .boxed()
}
