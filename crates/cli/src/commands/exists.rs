//! exists command - Check whether an object exists
//!
//! Exits 0 when the object is present and 5 when it is absent, so scripts
//! can branch on the status alone. Any other failure keeps its own code.

use clap::Args;
use serde::Serialize;

use super::{connect_profile, remote_arg, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Check whether an object exists
#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Object path (profile/bucket/key)
    pub path: String,
}

#[derive(Debug, Serialize)]
struct ExistsOutput {
    path: String,
    exists: bool,
}

/// Execute the exists command
pub async fn execute(args: ExistsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match remote_arg(&formatter, &args.path, true) {
        Ok(path) => path,
        Err(code) => return code,
    };

    let client = match connect_profile(&formatter, &path.profile).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    match client.object_exists(&path.bucket, &path.key).await {
        Ok(exists) => {
            if formatter.is_json() {
                formatter.json(&ExistsOutput {
                    path: path.to_string(),
                    exists,
                });
            } else if exists {
                formatter.println(&format!("{path} exists"));
            } else {
                formatter.println(&format!("{path} does not exist"));
            }
            exit_code_for(exists)
        }
        Err(e) => report(&formatter, &format!("Failed to check {path}"), &e),
    }
}

fn exit_code_for(exists: bool) -> ExitCode {
    if exists {
        ExitCode::Success
    } else {
        ExitCode::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_for() {
        assert_eq!(exit_code_for(true), ExitCode::Success);
        assert_eq!(exit_code_for(false), ExitCode::NotFound);
    }

    #[test]
    fn test_exists_output_json() {
        let output = ExistsOutput {
            path: "local/bucket/a.txt".into(),
            exists: false,
        };
        insta::assert_json_snapshot!(output, @r#"
        {
          "path": "local/bucket/a.txt",
          "exists": false
        }
        "#);
    }
}
