//! osc - object storage client
//!
//! A thin command-line interface for S3-compatible object storage services.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use osc_cli::commands::{self, Cli};
use osc_cli::exit_code::ExitCode;

/// Log filter used with `--debug`
const DEBUG_FILTER: &str = "osc_cli=debug,osc_core=debug,osc_s3=debug";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new(DEBUG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Logs go to stderr so `cat` output stays byte-exact
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = tokio::select! {
        code = commands::execute(cli) => code,
        _ = tokio::signal::ctrl_c() => ExitCode::Interrupted,
    };

    std::process::exit(exit_code.as_i32());
}
