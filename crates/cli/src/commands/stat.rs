//! stat command - Show object metadata
//!
//! Displays the metadata returned by a HEAD request.

use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;

use osc_core::ObjectMetadata;

use super::{connect_profile, remote_arg, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Show object metadata
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Object path (profile/bucket/key)
    pub path: String,
}

#[derive(Debug, Serialize)]
struct StatOutput {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
    size_bytes: u64,
    size_human: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, String>,
}

impl From<ObjectMetadata> for StatOutput {
    fn from(info: ObjectMetadata) -> Self {
        Self {
            size_human: info.size_human(),
            name: info.key,
            last_modified: info.last_modified.map(|ts| ts.to_string()),
            size_bytes: info.size,
            etag: info.etag,
            content_type: info.content_type,
            storage_class: info.storage_class,
            version_id: info.version_id,
            metadata: info.user_metadata.into_iter().collect(),
        }
    }
}

/// Execute the stat command
pub async fn execute(args: StatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match remote_arg(&formatter, &args.path, true) {
        Ok(path) => path,
        Err(code) => return code,
    };

    let client = match connect_profile(&formatter, &path.profile).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    match client.object_metadata(&path.bucket, &path.key).await {
        Ok(info) => {
            let output = StatOutput::from(info);
            if formatter.is_json() {
                formatter.json(&output);
            } else {
                for line in human_lines(&output) {
                    formatter.println(&line);
                }
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, &format!("Failed to stat {path}"), &e),
    }
}

fn human_lines(output: &StatOutput) -> Vec<String> {
    let mut lines = vec![format!("Name      : {}", output.name)];
    if let Some(modified) = &output.last_modified {
        lines.push(format!("Date      : {modified}"));
    }
    lines.push(format!(
        "Size      : {} ({} bytes)",
        output.size_human, output.size_bytes
    ));
    if let Some(etag) = &output.etag {
        lines.push(format!("ETag      : {etag}"));
    }
    if let Some(content_type) = &output.content_type {
        lines.push(format!("Type      : {content_type}"));
    }
    if let Some(class) = &output.storage_class {
        lines.push(format!("Class     : {class}"));
    }
    if let Some(version) = &output.version_id {
        lines.push(format!("Version   : {version}"));
    }
    for (key, value) in &output.metadata {
        lines.push(format!("Meta      : {key}={value}"));
    }
    lines
}
