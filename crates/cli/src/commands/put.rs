//! put command - Upload local files
//!
//! Uploads one file, or with `-r` a whole directory tree under a key prefix.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use osc_core::path::key_basename;
use osc_core::{RemotePath, UploadInput, join_key};

use super::{connect_profile, remote_arg, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload a file or directory
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file or directory
    pub source: PathBuf,

    /// Destination (profile/bucket/key, or profile/bucket/prefix/ for a file name)
    pub target: String,

    /// Upload a directory recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Retries after the first attempt (defaults to the profile setting)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Content type for a single file (guessed from the extension otherwise)
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: u64,
    size_human: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
    multipart: bool,
}

#[derive(Debug, Serialize)]
struct PutDirectoryOutput {
    status: &'static str,
    source: String,
    target: String,
    files: usize,
    total_bytes: u64,
    total_size_human: String,
}

/// Execute the put command
pub async fn execute(args: PutArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match remote_arg(&formatter, &args.target, false) {
        Ok(target) => target,
        Err(code) => return code,
    };

    let metadata = match tokio::fs::metadata(&args.source).await {
        Ok(metadata) => metadata,
        Err(e) => {
            formatter.error(&format!("Cannot read {}: {e}", args.source.display()));
            return ExitCode::NotFound;
        }
    };

    if metadata.is_dir() && !args.recursive {
        formatter.error("Source is a directory. Use -r/--recursive to upload directories.");
        return ExitCode::UsageError;
    }

    if !metadata.is_dir() && target.key.is_empty() && args.source.file_name().is_none() {
        formatter.error("Cannot derive an object key from the source path.");
        return ExitCode::UsageError;
    }

    if metadata.is_dir() {
        upload_directory(&args, &target, &formatter).await
    } else {
        upload_file(&args, &target, &formatter).await
    }
}

async fn upload_file(args: &PutArgs, target: &RemotePath, formatter: &Formatter) -> ExitCode {
    let client = match connect_profile(formatter, &target.profile).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    let key = destination_key(&args.source, target);
    let destination = RemotePath::new(&target.profile, &target.bucket, &key);
    let retries = args.retries.unwrap_or(client.config().default_retries);

    let mut input = UploadInput::file(&target.bucket, &key, &args.source);
    if let Some(content_type) = content_type_for(&args.source, args.content_type.as_deref()) {
        input = input.content_type(content_type);
    }

    let spinner = ProgressBar::spinner(
        formatter.config(),
        &format!("Uploading {}", args.source.display()),
    );
    let result = client.upload_input(input, retries).await;
    spinner.finish_and_clear();

    match result {
        Ok(output) => {
            let size_human = humansize::format_size(output.size, humansize::BINARY);
            if formatter.is_json() {
                formatter.json(&PutOutput {
                    status: "success",
                    source: args.source.display().to_string(),
                    target: destination.to_string(),
                    size_bytes: output.size,
                    size_human,
                    etag: output.etag,
                    multipart: output.multipart,
                });
            } else {
                formatter.success(&format!(
                    "{} -> {destination} ({size_human})",
                    args.source.display()
                ));
            }
            ExitCode::Success
        }
        Err(e) => report(
            formatter,
            &format!("Failed to upload {}", args.source.display()),
            &e,
        ),
    }
}

async fn upload_directory(args: &PutArgs, target: &RemotePath, formatter: &Formatter) -> ExitCode {
    if args.content_type.is_some() {
        formatter.warning("--content-type is ignored for directory uploads.");
    }
    if args.retries.is_some() {
        formatter.warning("--retries is ignored for directory uploads; the profile setting applies.");
    }

    let client = match connect_profile(formatter, &target.profile).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    let spinner = ProgressBar::spinner(
        formatter.config(),
        &format!("Uploading {}", args.source.display()),
    );
    let result = client
        .upload_directory(&args.source, &target.bucket, &target.key)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(summary) => {
            let total_size_human = humansize::format_size(summary.total_bytes, humansize::BINARY);
            if formatter.is_json() {
                formatter.json(&PutDirectoryOutput {
                    status: "success",
                    source: args.source.display().to_string(),
                    target: target.to_string(),
                    files: summary.uploaded.len(),
                    total_bytes: summary.total_bytes,
                    total_size_human,
                });
            } else {
                formatter.success(&format!(
                    "Uploaded {} file(s) ({total_size_human}) to {target}",
                    summary.uploaded.len()
                ));
            }
            ExitCode::Success
        }
        Err(e) => report(
            formatter,
            &format!("Failed to upload {}", args.source.display()),
            &e,
        ),
    }
}

/// Object key for a single-file upload
///
/// A bucket root or a key ending in `/` receives the source file name.
fn destination_key(source: &Path, target: &RemotePath) -> String {
    if !target.is_prefix() {
        return target.key.clone();
    }

    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    join_key(&target.key, key_basename(&file_name))
}

/// Explicit content type, or a guess from the file extension
fn content_type_for(source: &Path, explicit: Option<&str>) -> Option<String> {
    explicit.map(str::to_string).or_else(|| {
        mime_guess::from_path(source)
            .first()
            .map(|mime| mime.essence_str().to_string())
    })
}
