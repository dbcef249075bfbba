//! get command - Download an object into a local directory
//!
//! The file keeps the last segment of the key as its name; missing local
//! directories are created.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use osc_core::path::{key_basename, key_parent};

use super::{connect_profile, remote_arg, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Download an object
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Object path (profile/bucket/key)
    pub source: String,

    /// Local directory to write into
    #[arg(default_value = ".")]
    pub target: PathBuf,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: u64,
    size_human: String,
}

/// Execute the get command
pub async fn execute(args: GetArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let source = match remote_arg(&formatter, &args.source, true) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let client = match connect_profile(&formatter, &source.profile).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    let object_name = key_basename(&source.key);
    let key_prefix = key_parent(&source.key);
    let local_path = args.target.join(object_name);

    let spinner = ProgressBar::spinner(formatter.config(), &format!("Downloading {source}"));
    let result = client
        .download_object_to_path(&args.target, object_name, &source.bucket, key_prefix)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(size) => {
            let size_human = humansize::format_size(size, humansize::BINARY);
            if formatter.is_json() {
                formatter.json(&GetOutput {
                    status: "success",
                    source: source.to_string(),
                    target: local_path.display().to_string(),
                    size_bytes: size,
                    size_human,
                });
            } else {
                formatter.success(&format!(
                    "{source} -> {} ({size_human})",
                    local_path.display()
                ));
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, &format!("Failed to download {source}"), &e),
    }
}
