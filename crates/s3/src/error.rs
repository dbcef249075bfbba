//! Mapping of SDK failures onto `osc_core::Error`
//!
//! The store reports an absent key either as `NotFound` (HEAD, which has no
//! body to carry a code) or `NoSuchKey` (GET). Both become `Error::NotFound`;
//! every other failure keeps the SDK's full error context in its message.

use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use osc_core::Error;

/// Error codes the store uses for a missing object
const NOT_FOUND_CODES: &[&str] = &["NotFound", "NoSuchKey"];

/// Error codes that mean the credentials were rejected
const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
];

/// How a failed request should surface to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureKind {
    NotFound,
    Auth,
    Transport,
}

/// Classify a failure from its error code and HTTP status
pub(crate) fn classify(code: Option<&str>, status: Option<u16>) -> FailureKind {
    match code {
        Some(code) if NOT_FOUND_CODES.contains(&code) => FailureKind::NotFound,
        Some(code) if AUTH_CODES.contains(&code) => FailureKind::Auth,
        Some(_) => match status {
            Some(401 | 403) => FailureKind::Auth,
            _ => FailureKind::Transport,
        },
        None => match status {
            Some(404) => FailureKind::NotFound,
            Some(401 | 403) => FailureKind::Auth,
            _ => FailureKind::Transport,
        },
    }
}

/// Convert an SDK error for the object at `target` (`bucket/key`)
pub(crate) fn map_sdk_error<E>(err: SdkError<E, HttpResponse>, target: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|response| response.status().as_u16());
    let kind = classify(err.code(), status);
    let message = format!("{target}: {}", DisplayErrorContext(&err));

    tracing::debug!(target_object = target, ?status, code = ?err.code(), ?kind, "request failed");

    match kind {
        FailureKind::NotFound => Error::NotFound(target.to_string()),
        FailureKind::Auth => Error::Auth(message),
        FailureKind::Transport => Error::Network(message),
    }
}
