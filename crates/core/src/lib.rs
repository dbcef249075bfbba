//! osc-core: Core library for the osc object-storage client
//!
//! This crate provides the core functionality for osc, including:
//! - Session configuration and validation
//! - Profile and configuration file management
//! - Remote path parsing and object key helpers
//! - The ObjectStore trait for transport primitives
//! - ObjectStoreClient, the convenience operations built on that trait
//!
//! This crate is independent of any specific S3 SDK, which keeps the client
//! operations testable against a mocked store.

pub mod client;
pub mod config;
pub mod error;
pub mod path;
pub mod profile;
pub mod session;
pub mod traits;

pub use client::{DownloadOutput, ObjectStoreClient, PendingUpload, UploadSummary};
pub use config::{Config, ConfigManager};
pub use error::{Error, Result};
pub use path::{join_key, parse_path, parse_remote_path, ParsedPath, RemotePath};
pub use profile::{Profile, ProfileManager};
pub use session::SessionConfig;
pub use traits::{
    BodyReader, ListPage, ObjectBody, ObjectInfo, ObjectMetadata, ObjectStore, RequestOptions,
    UploadBody, UploadInput, UploadOutput,
};
