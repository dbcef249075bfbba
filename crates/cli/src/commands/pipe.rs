//! pipe command - Stream stdin to an object
//!
//! Reads stdin to the end and uploads it. Useful for piping output from other commands.

use clap::Args;
use serde::Serialize;
use tokio::io::AsyncReadExt;

use osc_core::UploadInput;

use super::{connect_profile, remote_arg, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Stream stdin to an object
#[derive(Args, Debug)]
pub struct PipeArgs {
    /// Destination path (profile/bucket/key)
    pub target: String,

    /// Content type for the uploaded object
    #[arg(long, default_value = "application/octet-stream")]
    pub content_type: String,

    /// Retries after the first attempt (defaults to the profile setting)
    #[arg(long)]
    pub retries: Option<u32>,
}

#[derive(Debug, Serialize)]
struct PipeOutput {
    status: &'static str,
    target: String,
    size_bytes: u64,
    size_human: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
}

/// Execute the pipe command
pub async fn execute(args: PipeArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match remote_arg(&formatter, &args.target, true) {
        Ok(target) => target,
        Err(code) => return code,
    };

    let client = match connect_profile(&formatter, &target.profile).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    let mut buffer = Vec::new();
    if let Err(e) = tokio::io::stdin().read_to_end(&mut buffer).await {
        formatter.error(&format!("Failed to read from stdin: {e}"));
        return ExitCode::GeneralError;
    }

    let retries = args.retries.unwrap_or(client.config().default_retries);
    let input =
        UploadInput::bytes(&target.bucket, &target.key, buffer).content_type(&args.content_type);

    match client.upload_input(input, retries).await {
        Ok(output) => {
            let size_human = humansize::format_size(output.size, humansize::BINARY);
            if formatter.is_json() {
                formatter.json(&PipeOutput {
                    status: "success",
                    target: target.to_string(),
                    size_bytes: output.size,
                    size_human,
                    etag: output.etag,
                });
            } else {
                formatter.success(&format!("Uploaded to {target} ({size_human})"));
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, &format!("Failed to upload to {target}"), &e),
    }
}
