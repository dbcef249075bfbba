//! Profile management commands
//!
//! Profiles are named references to S3-compatible storage endpoints,
//! including connection details and credentials.

use clap::Subcommand;
use comfy_table::{Table, presets::NOTHING};
use serde::Serialize;

use osc_core::session::{DEFAULT_PART_SIZE, DEFAULT_REGION, DEFAULT_RETRIES};
use osc_core::{Profile, ProfileManager, SessionConfig};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Profile subcommands for managing storage service connections
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List all configured profiles
    List(ListArgs),

    /// Remove a profile
    Remove(RemoveArgs),
}

/// Arguments for the `profile set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "local", "s3", "minio")
    pub name: String,

    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,

    /// Custom endpoint (e.g., "localhost:9000", "https://s3.example.com")
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Region
    #[arg(long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Address buckets as a path segment instead of a subdomain
    #[arg(long)]
    pub path_style: bool,

    /// Use plain HTTP
    #[arg(long)]
    pub disable_tls: bool,

    /// Retries after the first attempt for operations without their own count
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// Multipart part size in bytes
    #[arg(long, default_value_t = DEFAULT_PART_SIZE)]
    pub part_size: u64,
}

/// Arguments for the `profile list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show full details
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `profile remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

/// JSON output for profile list
#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<ProfileInfo>,
}

/// Profile information for output (without credentials)
#[derive(Debug, Serialize)]
struct ProfileInfo {
    name: String,
    endpoint: String,
    region: String,
    path_style: bool,
    tls: bool,
    retries: u32,
    part_size: u64,
}

impl From<&Profile> for ProfileInfo {
    fn from(profile: &Profile) -> Self {
        let session = &profile.session;
        let endpoint = match session.endpoint_url() {
            Ok(Some(url)) => url,
            Ok(None) => "(aws default)".to_string(),
            Err(_) => session.endpoint.clone().unwrap_or_default(),
        };

        Self {
            name: profile.name.clone(),
            endpoint,
            region: session.region.clone(),
            path_style: session.force_path_style,
            tls: !session.disable_tls,
            retries: session.default_retries,
            part_size: session.part_size,
        }
    }
}

/// JSON output for profile set/remove operations
#[derive(Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Execute a profile subcommand
pub async fn execute(cmd: ProfileCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match ProfileManager::new() {
        Ok(manager) => manager,
        Err(e) => return report(&formatter, "Failed to open configuration", &e),
    };

    match cmd {
        ProfileCommands::Set(args) => execute_set(args, &manager, &formatter),
        ProfileCommands::List(args) => execute_list(args, &manager, &formatter),
        ProfileCommands::Remove(args) => execute_remove(args, &manager, &formatter),
    }
}

fn session_from_args(args: &SetArgs) -> SessionConfig {
    let mut session = SessionConfig::new(&args.region, &args.access_key, &args.secret_key)
        .with_force_path_style(args.path_style)
        .with_disable_tls(args.disable_tls)
        .with_default_retries(args.retries)
        .with_part_size(args.part_size);
    if let Some(endpoint) = &args.endpoint {
        session = session.with_endpoint(endpoint);
    }
    session
}

fn execute_set(args: SetArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let profile = Profile::new(&args.name, session_from_args(&args));

    match manager.set(profile) {
        Ok(()) => {
            let message = format!("Profile '{}' configured successfully", args.name);
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => report(formatter, "Failed to save profile", &e),
    }
}

fn execute_list(args: ListArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let profiles = match manager.list() {
        Ok(profiles) => profiles,
        Err(e) => return report(formatter, "Failed to list profiles", &e),
    };

    let infos: Vec<ProfileInfo> = profiles.iter().map(ProfileInfo::from).collect();

    if formatter.is_json() {
        formatter.json(&ProfileListOutput { profiles: infos });
    } else if infos.is_empty() {
        formatter.println("No profiles configured.");
    } else {
        formatter.println(&render_table(&infos, args.long).to_string());
    }
    ExitCode::Success
}

fn render_table(infos: &[ProfileInfo], long: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);

    if long {
        table.set_header(vec![
            "NAME", "ENDPOINT", "REGION", "PATH", "TLS", "RETRIES", "PART SIZE",
        ]);
        for info in infos {
            table.add_row(vec![
                info.name.clone(),
                info.endpoint.clone(),
                info.region.clone(),
                info.path_style.to_string(),
                info.tls.to_string(),
                info.retries.to_string(),
                humansize::format_size(info.part_size, humansize::BINARY),
            ]);
        }
    } else {
        table.set_header(vec!["NAME", "ENDPOINT"]);
        for info in infos {
            table.add_row(vec![info.name.clone(), info.endpoint.clone()]);
        }
    }

    table
}

fn execute_remove(args: RemoveArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            let message = format!("Profile '{}' removed successfully", args.name);
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => report(formatter, "Failed to remove profile", &e),
    }
}
