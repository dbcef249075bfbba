//! osc-s3: S3 SDK adapter for the osc object-storage client
//!
//! This crate provides the implementation of the ObjectStore trait
//! using the aws-sdk-s3 crate. It is the only crate that directly
//! depends on the AWS SDK.

pub mod client;
mod error;
pub mod multipart;

pub use client::{S3Client, connect};
