//! ls command - List objects under a prefix
//!
//! Pages are fetched lazily, so `--limit` stops the listing without reading
//! the remaining pages.

use clap::Args;
use futures::TryStreamExt;
use serde::Serialize;

use osc_core::ObjectInfo;

use super::{connect_profile, remote_arg, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List objects
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Remote prefix (profile/bucket[/prefix])
    pub path: String,

    /// Stop after this many objects
    #[arg(long)]
    pub limit: Option<usize>,

    /// Summarize output (show totals)
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    items: Vec<ObjectInfo>,
    truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: u64,
    total_size_human: String,
}

impl Summary {
    fn of(items: &[ObjectInfo]) -> Self {
        let total_size_bytes = items.iter().map(|item| item.size).sum();
        Self {
            total_objects: items.len(),
            total_size_bytes,
            total_size_human: humansize::format_size(total_size_bytes, humansize::BINARY),
        }
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match remote_arg(&formatter, &args.path, false) {
        Ok(path) => path,
        Err(code) => return code,
    };

    if args.limit == Some(0) {
        formatter.error("--limit must be greater than zero");
        return ExitCode::UsageError;
    }

    let client = match connect_profile(&formatter, &path.profile).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    let mut stream = std::pin::pin!(client.list_stream(&path.bucket, &path.key));
    let mut items = Vec::new();
    let mut truncated = false;

    loop {
        if args.limit.is_some_and(|limit| items.len() >= limit) {
            truncated = true;
            break;
        }

        match stream.try_next().await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => break,
            Err(e) => return report(&formatter, &format!("Failed to list {path}"), &e),
        }
    }

    if formatter.is_json() {
        let summary = args.summarize.then(|| Summary::of(&items));
        formatter.json(&LsOutput {
            items,
            truncated,
            summary,
        });
        return ExitCode::Success;
    }

    for item in &items {
        formatter.println(&human_line(&formatter, item));
    }
    if truncated {
        formatter.warning("Listing stopped at --limit; more objects may exist.");
    }
    if args.summarize {
        let summary = Summary::of(&items);
        formatter.println(&format!(
            "\nTotal: {} object(s), {}",
            summary.total_objects, summary.total_size_human
        ));
    }

    ExitCode::Success
}

fn human_line(formatter: &Formatter, item: &ObjectInfo) -> String {
    let date = item
        .last_modified
        .map(|ts| ts.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| " ".repeat(19));
    format!(
        "{} {:>10} {}",
        formatter.dim(&format!("[{date}]")),
        item.size_human(),
        item.key
    )
}
