//! Error types for osc-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for osc-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for osc-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid session or configuration file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid path format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Profile not found
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Local filesystem failure tied to a specific path
    #[error("IO error at {}: {source}", .path.display())]
    LocalPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport error reported by the object store
    #[error("Network error: {0}")]
    Network(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Wrap an IO error with the local path it occurred on
    pub fn local(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::LocalPath {
            path: path.into(),
            source,
        }
    }

    /// Whether this is the not-found signal from the object store
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) => 2,                          // UsageError
            Error::Config(_) | Error::InvalidUrl(_) => 2,        // UsageError
            Error::Network(_) => 3,                              // NetworkError
            Error::Auth(_) => 4,                                 // AuthError
            Error::NotFound(_) | Error::ProfileNotFound(_) => 5, // NotFound
            _ => 1,                                              // GeneralError
        }
    }
}
