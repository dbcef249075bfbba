//! Path parsing and object key helpers
//!
//! Remote paths have the format `profile/bucket[/key]`; local paths are passed
//! through as-is. Object keys always use `/` as separator, whatever the local
//! platform uses.

use crate::error::{Error, Result};
use crate::profile::is_valid_profile_name;

/// Separator used inside object keys
pub const KEY_SEPARATOR: char = '/';

/// Join a key prefix and a child name with exactly one `/`
///
/// An empty prefix yields the child unchanged, so keys never start with `/`
/// because of an empty prefix.
pub fn join_key(prefix: &str, child: &str) -> String {
    let base = prefix.trim_end_matches(KEY_SEPARATOR);
    let child = child.trim_start_matches(KEY_SEPARATOR);
    if base.is_empty() {
        child.to_string()
    } else {
        format!("{base}{KEY_SEPARATOR}{child}")
    }
}

/// Last segment of a key (`a/b/c.txt` -> `c.txt`)
pub fn key_basename(key: &str) -> &str {
    let key = key.trim_end_matches(KEY_SEPARATOR);
    key.rsplit(KEY_SEPARATOR).next().unwrap_or(key)
}

/// Everything before the last segment of a key (`a/b/c.txt` -> `a/b`)
pub fn key_parent(key: &str) -> &str {
    let key = key.trim_end_matches(KEY_SEPARATOR);
    match key.rfind(KEY_SEPARATOR) {
        Some(pos) => &key[..pos],
        None => "",
    }
}

/// A parsed remote path pointing to an object store location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    /// Profile name
    pub profile: String,
    /// Bucket name
    pub bucket: String,
    /// Object key or prefix (empty for bucket root)
    pub key: String,
}

impl RemotePath {
    pub fn new(
        profile: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            profile: profile.into(),
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Whether the key addresses a prefix rather than a single object
    pub fn is_prefix(&self) -> bool {
        self.key.is_empty() || self.key.ends_with(KEY_SEPARATOR)
    }

    /// Get the full path as a string (profile/bucket/key)
    pub fn to_full_path(&self) -> String {
        if self.key.is_empty() {
            format!("{}/{}", self.profile, self.bucket)
        } else {
            format!("{}/{}/{}", self.profile, self.bucket, self.key)
        }
    }

    /// Join a child path component onto the key
    pub fn join(&self, child: &str) -> Self {
        Self {
            profile: self.profile.clone(),
            bucket: self.bucket.clone(),
            key: join_key(&self.key, child),
        }
    }
}

impl std::fmt::Display for RemotePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_full_path())
    }
}

/// Parsed path that can be either local or remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPath {
    /// Local filesystem path
    Local(std::path::PathBuf),
    /// Remote object store path
    Remote(RemotePath),
}

impl ParsedPath {
    pub fn is_remote(&self) -> bool {
        matches!(self, ParsedPath::Remote(_))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ParsedPath::Local(_))
    }

    pub fn as_remote(&self) -> Option<&RemotePath> {
        match self {
            ParsedPath::Remote(p) => Some(p),
            ParsedPath::Local(_) => None,
        }
    }

    pub fn as_local(&self) -> Option<&std::path::PathBuf> {
        match self {
            ParsedPath::Local(p) => Some(p),
            ParsedPath::Remote(_) => None,
        }
    }
}

/// Parse a path string into a ParsedPath
///
/// Remote paths have the format: profile/bucket[/key]
/// Local paths are anything that:
/// - Starts with / (absolute path)
/// - Starts with ./ or ../ (relative path)
/// - Is a single component containing a dot or backslash
/// - Or doesn't match the profile/bucket pattern
pub fn parse_path(path: &str) -> Result<ParsedPath> {
    if path.is_empty() {
        return Err(Error::InvalidPath("Path cannot be empty".into()));
    }

    if path.starts_with('/') {
        return Ok(ParsedPath::Local(std::path::PathBuf::from(path)));
    }

    if path == "." || path == ".." || path.starts_with("./") || path.starts_with("../") {
        return Ok(ParsedPath::Local(std::path::PathBuf::from(path)));
    }

    #[cfg(windows)]
    if path.len() >= 2 && path.chars().nth(1) == Some(':') {
        return Ok(ParsedPath::Local(std::path::PathBuf::from(path)));
    }

    let parts: Vec<&str> = path.splitn(3, '/').collect();

    match parts.as_slice() {
        [single] => {
            if single.contains('.') || single.contains('\\') {
                Ok(ParsedPath::Local(std::path::PathBuf::from(path)))
            } else {
                Err(Error::InvalidPath(format!(
                    "Path '{path}' is incomplete. Use format: profile/bucket[/key]"
                )))
            }
        }
        [profile, bucket] | [profile, bucket, _] => {
            if !is_valid_profile_name(profile) {
                return Ok(ParsedPath::Local(std::path::PathBuf::from(path)));
            }

            if bucket.is_empty() {
                return Err(Error::InvalidPath("Bucket name cannot be empty".into()));
            }

            let key = parts.get(2).copied().unwrap_or_default();
            Ok(ParsedPath::Remote(RemotePath::new(*profile, *bucket, key)))
        }
        _ => Err(Error::InvalidPath(format!("Invalid path format: {path}"))),
    }
}

/// Parse a path that must be remote
pub fn parse_remote_path(path: &str) -> Result<RemotePath> {
    match parse_path(path)? {
        ParsedPath::Remote(remote) => Ok(remote),
        ParsedPath::Local(_) => Err(Error::InvalidPath(format!(
            "'{path}' is not a remote path. Use format: profile/bucket[/key]"
        ))),
    }
}
