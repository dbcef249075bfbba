//! cat command - Display object contents
//!
//! Downloads the whole object into memory and writes it to stdout unchanged.

use clap::Args;
use tokio::io::AsyncWriteExt;

use super::{connect_profile, remote_arg, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Display object contents
#[derive(Args, Debug)]
pub struct CatArgs {
    /// Object path (profile/bucket/key)
    pub path: String,

    /// Retries after the first attempt (defaults to the profile setting)
    #[arg(long)]
    pub retries: Option<u32>,
}

/// Execute the cat command
pub async fn execute(args: CatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match remote_arg(&formatter, &args.path, true) {
        Ok(path) => path,
        Err(code) => return code,
    };

    let client = match connect_profile(&formatter, &path.profile).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    let retries = args.retries.unwrap_or(client.config().default_retries);
    let output = match client.download_object(&path.bucket, &path.key, retries).await {
        Ok(output) => output,
        Err(e) => return report(&formatter, &format!("Failed to read {path}"), &e),
    };

    // Written directly to stdout, bypassing the formatter, to keep binary data intact
    let mut stdout = tokio::io::stdout();
    if let Err(e) = stdout.write_all(&output.data).await {
        formatter.error(&format!("Failed to write to stdout: {e}"));
        return ExitCode::GeneralError;
    }
    if let Err(e) = stdout.flush().await {
        formatter.error(&format!("Failed to write to stdout: {e}"));
        return ExitCode::GeneralError;
    }

    ExitCode::Success
}
