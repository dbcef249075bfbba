//! CLI command definitions and execution
//!
//! Every command parses its arguments, resolves a profile into a connected
//! client, runs one client operation and reports through the `Formatter`.

use clap::{Parser, Subcommand};

use osc_core::{ConfigManager, ObjectStoreClient, ProfileManager, RemotePath, parse_remote_path};
use osc_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod cat;
mod completions;
mod exists;
mod get;
mod ls;
mod pipe;
mod profile;
mod put;
mod stat;

/// osc - object storage client
///
/// A thin command-line client for S3-compatible object storage services.
#[derive(Parser, Debug)]
#[command(name = "osc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage object store profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// Upload a file, or a directory with -r
    Put(put::PutArgs),

    /// Download an object into a local directory
    Get(get::GetArgs),

    /// Display object contents
    Cat(cat::CatArgs),

    /// Show object metadata
    Stat(stat::StatArgs),

    /// Check whether an object exists (exit 0 if present, 5 if absent)
    Exists(exists::ExistsArgs),

    /// List objects under a prefix
    Ls(ls::LsArgs),

    /// Stream stdin to an object
    Pipe(pipe::PipeArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let flags = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    let defaults = match ConfigManager::new().and_then(|manager| manager.load()) {
        Ok(config) => config.defaults,
        Err(e) => {
            tracing::debug!(error = %e, "using built-in output defaults");
            Default::default()
        }
    };
    let output_config = flags.resolve(&defaults);

    match cli.command {
        Commands::Profile(cmd) => profile::execute(cmd, output_config).await,
        Commands::Put(args) => put::execute(args, output_config).await,
        Commands::Get(args) => get::execute(args, output_config).await,
        Commands::Cat(args) => cat::execute(args, output_config).await,
        Commands::Stat(args) => stat::execute(args, output_config).await,
        Commands::Exists(args) => exists::execute(args, output_config).await,
        Commands::Ls(args) => ls::execute(args, output_config).await,
        Commands::Pipe(args) => pipe::execute(args, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Parse a `profile/bucket[/key]` argument
///
/// With `require_key`, a bucket-only path or a trailing `/` is rejected.
pub(crate) fn remote_arg(
    formatter: &Formatter,
    path: &str,
    require_key: bool,
) -> Result<RemotePath, ExitCode> {
    let remote = match parse_remote_path(path) {
        Ok(remote) => remote,
        Err(e) => {
            formatter.error(&e.to_string());
            return Err(ExitCode::UsageError);
        }
    };

    if require_key && remote.is_prefix() {
        formatter.error(&format!(
            "'{path}' does not name an object. Use format: profile/bucket/key"
        ));
        return Err(ExitCode::UsageError);
    }

    Ok(remote)
}

/// Load a profile and build a client for it
///
/// No request is sent; connection problems surface on the first operation.
pub(crate) async fn connect_profile(
    formatter: &Formatter,
    name: &str,
) -> Result<ObjectStoreClient<S3Client>, ExitCode> {
    let profile = match ProfileManager::new().and_then(|manager| manager.get(name)) {
        Ok(profile) => profile,
        Err(e) => return Err(report(formatter, "Failed to load profile", &e)),
    };

    tracing::debug!(profile = %profile.name, "connecting");

    osc_s3::connect(profile.session)
        .await
        .map_err(|e| report(formatter, "Failed to create client", &e))
}

/// Print an operation failure and pick the matching exit code
pub(crate) fn report(formatter: &Formatter, context: &str, err: &osc_core::Error) -> ExitCode {
    formatter.error(&format!("{context}: {err}"));
    ExitCode::from(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["osc", "--json", "-q", "stat", "p/b/k"]).unwrap();
        assert!(cli.json);
        assert!(cli.quiet);
        assert!(!cli.debug);
        assert!(matches!(cli.command, Commands::Stat(_)));
    }

    #[test]
    fn test_remote_arg_requires_key() {
        let formatter = Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        });

        assert!(remote_arg(&formatter, "p/bucket/key.txt", true).is_ok());
        assert_eq!(
            remote_arg(&formatter, "p/bucket", true).unwrap_err(),
            ExitCode::UsageError
        );
        assert_eq!(
            remote_arg(&formatter, "p/bucket/dir/", true).unwrap_err(),
            ExitCode::UsageError
        );
        assert!(remote_arg(&formatter, "p/bucket/dir/", false).is_ok());
        assert_eq!(
            remote_arg(&formatter, "/tmp/local", false).unwrap_err(),
            ExitCode::UsageError
        );
    }
}
