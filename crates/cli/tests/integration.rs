//! Integration tests for the osc CLI
//!
//! Profile tests only touch a temporary config directory. Transfer tests
//! require a running S3-compatible server.
//!
//! Run with:
//! ```bash
//! docker run -d --name rustfs -p 9000:9000 \
//!     -e RUSTFS_ACCESS_KEY=accesskey \
//!     -e RUSTFS_SECRET_KEY=secretkey \
//!     rustfs/rustfs:1.0.0-alpha.81
//!
//! TEST_S3_ENDPOINT=http://localhost:9000 \
//! TEST_S3_ACCESS_KEY=accesskey \
//! TEST_S3_SECRET_KEY=secretkey \
//!     cargo test -p osc-cli --features integration
//! ```

#![cfg(feature = "integration")]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use osc_core::SessionConfig;
use tempfile::TempDir;

/// Get the path to the osc binary
fn osc_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_osc"))
}

/// Run osc with an isolated config directory
fn run_osc(args: &[&str], config_dir: &Path) -> Output {
    Command::new(osc_binary())
        .args(args)
        .env("OSC_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute osc command")
}

/// Run osc with `input` on stdin
fn run_osc_with_stdin(args: &[&str], config_dir: &Path, input: &[u8]) -> Output {
    let mut child = Command::new(osc_binary())
        .args(args)
        .env("OSC_CONFIG_DIR", config_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn osc command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input)
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for osc")
}

/// Get S3 test configuration from environment
fn get_test_config() -> Option<(String, String, String)> {
    let endpoint = std::env::var("TEST_S3_ENDPOINT").ok()?;
    let access_key = std::env::var("TEST_S3_ACCESS_KEY").ok()?;
    let secret_key = std::env::var("TEST_S3_SECRET_KEY").ok()?;
    Some((endpoint, access_key, secret_key))
}

/// Generate unique suffix for test resources
fn uuid_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{:x}", duration.as_nanos() % 0xFFFFFFFF)
}

/// Test helper: configure the `test` profile and create a fresh bucket
fn setup_with_bucket(name: &str) -> Option<(TempDir, String)> {
    let (endpoint, access_key, secret_key) = get_test_config()?;
    let config_dir = tempfile::tempdir().ok()?;
    let bucket = format!("osc-{}-{}", name, uuid_suffix());

    let output = run_osc(
        &[
            "profile",
            "set",
            "test",
            &access_key,
            &secret_key,
            "--endpoint",
            &endpoint,
            "--path-style",
        ],
        config_dir.path(),
    );
    if !output.status.success() {
        eprintln!(
            "Failed to set profile: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        return None;
    }

    let session = SessionConfig::new("us-east-1", access_key, secret_key)
        .with_endpoint(endpoint)
        .with_force_path_style(true);
    let runtime = tokio::runtime::Runtime::new().ok()?;
    let created = runtime.block_on(async {
        let client = osc_s3::S3Client::new(&session).await.ok()?;
        client.inner().create_bucket().bucket(&bucket).send().await.ok()
    });
    if created.is_none() {
        eprintln!("Failed to create bucket {bucket}");
        return None;
    }

    Some((config_dir, bucket))
}

mod profile_operations {
    use super::*;

    #[test]
    fn test_profile_set_list_remove() {
        let config_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let output = run_osc(
            &[
                "profile",
                "set",
                "local",
                "accesskey",
                "secretkey",
                "--endpoint",
                "localhost:9000",
                "--disable-tls",
                "--path-style",
            ],
            config_dir.path(),
        );
        assert!(
            output.status.success(),
            "Failed to set profile: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let output = run_osc(&["profile", "list", "--json"], config_dir.path());
        assert!(output.status.success());
        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Invalid JSON output");
        assert_eq!(json["profiles"][0]["name"], "local");
        assert_eq!(json["profiles"][0]["endpoint"], "http://localhost:9000");
        assert!(
            !String::from_utf8_lossy(&output.stdout).contains("secretkey"),
            "Secret key leaked into output"
        );

        let output = run_osc(&["profile", "remove", "local"], config_dir.path());
        assert!(output.status.success());

        let output = run_osc(&["profile", "remove", "local"], config_dir.path());
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_profile_set_rejects_bad_part_size() {
        let config_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let output = run_osc(
            &[
                "profile",
                "set",
                "local",
                "accesskey",
                "secretkey",
                "--part-size",
                "1024",
            ],
            config_dir.path(),
        );
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_unknown_profile_is_not_found() {
        let config_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let output = run_osc(&["stat", "missing/bucket/key.txt"], config_dir.path());
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_malformed_path_is_usage_error() {
        let config_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let output = run_osc(&["cat", "local/bucket"], config_dir.path());
        assert_eq!(output.status.code(), Some(2));
    }
}

mod object_operations {
    use super::*;

    #[test]
    fn test_put_cat_stat_exists() {
        let Some((config_dir, bucket)) = setup_with_bucket("objects") else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };
        let dir = config_dir.path();

        let local = tempfile::tempdir().expect("Failed to create temp dir");
        let file = local.path().join("hello.txt");
        std::fs::write(&file, b"hello world").expect("Failed to write file");

        let remote = format!("test/{bucket}/docs/");
        let output = run_osc(
            &["put", file.to_str().unwrap(), &remote, "--json"],
            dir,
        );
        assert!(
            output.status.success(),
            "put failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["target"], format!("test/{bucket}/docs/hello.txt"));
        assert_eq!(json["size_bytes"], 11);

        let object = format!("test/{bucket}/docs/hello.txt");
        let output = run_osc(&["cat", &object], dir);
        assert!(output.status.success());
        assert_eq!(output.stdout, b"hello world");

        let output = run_osc(&["stat", &object, "--json"], dir);
        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["size_bytes"], 11);
        assert_eq!(json["content_type"], "text/plain");

        let output = run_osc(&["exists", &object], dir);
        assert_eq!(output.status.code(), Some(0));

        let missing = format!("test/{bucket}/docs/missing.txt");
        let output = run_osc(&["exists", &missing], dir);
        assert_eq!(output.status.code(), Some(5));

        let output = run_osc(&["cat", &missing], dir);
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_put_directory_then_ls_and_get() {
        let Some((config_dir, bucket)) = setup_with_bucket("tree") else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };
        let dir = config_dir.path();

        let local = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(local.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(local.path().join("sub")).unwrap();
        std::fs::write(local.path().join("sub/b.txt"), b"bb").unwrap();

        let output = run_osc(
            &["put", local.path().to_str().unwrap(), &format!("test/{bucket}/p")],
            dir,
        );
        assert_eq!(output.status.code(), Some(2), "directory without -r must fail");

        let output = run_osc(
            &[
                "put",
                "-r",
                local.path().to_str().unwrap(),
                &format!("test/{bucket}/p"),
                "--json",
            ],
            dir,
        );
        assert!(
            output.status.success(),
            "put -r failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["files"], 2);
        assert_eq!(json["total_bytes"], 3);

        let output = run_osc(&["ls", &format!("test/{bucket}/p/"), "--json"], dir);
        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let keys: Vec<&str> = json["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["p/a.txt", "p/sub/b.txt"]);

        let output = run_osc(
            &["ls", &format!("test/{bucket}/p/"), "--limit", "1", "--json"],
            dir,
        );
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["items"].as_array().unwrap().len(), 1);
        assert_eq!(json["truncated"], true);

        let download = tempfile::tempdir().expect("Failed to create temp dir");
        let target = download.path().join("nested");
        let output = run_osc(
            &[
                "get",
                &format!("test/{bucket}/p/sub/b.txt"),
                target.to_str().unwrap(),
            ],
            dir,
        );
        assert!(output.status.success());
        assert_eq!(std::fs::read(target.join("b.txt")).unwrap(), b"bb");
    }

    #[test]
    fn test_pipe_stdin() {
        let Some((config_dir, bucket)) = setup_with_bucket("pipe") else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };
        let dir = config_dir.path();

        let object = format!("test/{bucket}/stream.bin");
        let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

        let output = run_osc_with_stdin(&["pipe", &object], dir, &payload);
        assert!(
            output.status.success(),
            "pipe failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let output = run_osc(&["cat", &object], dir);
        assert!(output.status.success());
        assert_eq!(output.stdout, payload);
    }
}
