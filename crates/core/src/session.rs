//! Session configuration
//!
//! A `SessionConfig` carries everything needed to address an object store:
//! endpoint, region, static credentials and addressing flags. It is built once,
//! validated, and then owned by the client for its whole lifetime.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default number of retries after the first attempt
pub const DEFAULT_RETRIES: u32 = 3;

/// Default multipart part size: 5 MiB
pub const DEFAULT_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Minimum part size: 5 MiB (S3 requirement)
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum part size: 5 GiB
pub const MAX_PART_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Connection settings for an S3-compatible object store
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Custom endpoint for S3-compatible stores (None for AWS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Region
    #[serde(default = "default_region")]
    pub region: String,

    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,

    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    #[serde(default)]
    pub force_path_style: bool,

    /// Talk plain HTTP instead of HTTPS
    #[serde(default)]
    pub disable_tls: bool,

    /// Retries applied when a call does not override them
    #[serde(default = "default_retries")]
    pub default_retries: u32,

    /// Payloads above this size are uploaded in parts
    #[serde(default = "default_part_size")]
    pub part_size: u64,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

fn default_part_size() -> u64 {
    DEFAULT_PART_SIZE
}

impl SessionConfig {
    /// Create a session for the given region and static credentials
    pub fn new(
        region: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: None,
            region: region.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            force_path_style: false,
            disable_tls: false,
            default_retries: DEFAULT_RETRIES,
            part_size: DEFAULT_PART_SIZE,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_force_path_style(mut self, enabled: bool) -> Self {
        self.force_path_style = enabled;
        self
    }

    pub fn with_disable_tls(mut self, disabled: bool) -> Self {
        self.disable_tls = disabled;
        self
    }

    pub fn with_default_retries(mut self, retries: u32) -> Self {
        self.default_retries = retries;
        self
    }

    pub fn with_part_size(mut self, size: u64) -> Self {
        self.part_size = size;
        self
    }

    /// Check the settings without touching the network
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(Error::Config("Region cannot be empty".into()));
        }

        if !self
            .region
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(Error::Config(format!("Invalid region: '{}'", self.region)));
        }

        if self.access_key.is_empty() {
            return Err(Error::Config("Access key cannot be empty".into()));
        }

        if self.secret_key.is_empty() {
            return Err(Error::Config("Secret key cannot be empty".into()));
        }

        if !(MIN_PART_SIZE..=MAX_PART_SIZE).contains(&self.part_size) {
            return Err(Error::Config(format!(
                "Part size {} is outside {MIN_PART_SIZE}..={MAX_PART_SIZE}",
                self.part_size
            )));
        }

        self.endpoint_url()?;
        Ok(())
    }

    /// Resolve the endpoint URL the transport should use
    ///
    /// Endpoints without a scheme get `http://` when TLS is disabled and
    /// `https://` otherwise. Without a custom endpoint, `None` lets the SDK pick
    /// the regional AWS endpoint, except when TLS is disabled, in which case
    /// that endpoint is spelled out over plain HTTP.
    pub fn endpoint_url(&self) -> Result<Option<String>> {
        let scheme = if self.disable_tls { "http" } else { "https" };

        let endpoint = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        match endpoint {
            Some(endpoint) => {
                let candidate = if endpoint.contains("://") {
                    endpoint.to_string()
                } else {
                    format!("{scheme}://{endpoint}")
                };

                let url = url::Url::parse(&candidate)?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(Error::Config(format!(
                        "Unsupported endpoint scheme: {}",
                        url.scheme()
                    )));
                }
                if url.host_str().is_none() {
                    return Err(Error::Config(format!("Endpoint has no host: {candidate}")));
                }

                Ok(Some(candidate.trim_end_matches('/').to_string()))
            }
            None if self.disable_tls => Ok(Some(format!("http://s3.{}.amazonaws.com", self.region))),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("force_path_style", &self.force_path_style)
            .field("disable_tls", &self.disable_tls)
            .field("default_retries", &self.default_retries)
            .field("part_size", &self.part_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionConfig {
        SessionConfig::new("us-east-1", "access", "secret")
    }

    #[test]
    fn test_session_defaults() {
        let config = session();
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint.is_none());
        assert!(!config.force_path_style);
        assert!(!config.disable_tls);
        assert_eq!(config.default_retries, DEFAULT_RETRIES);
        assert_eq!(config.part_size, DEFAULT_PART_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut config = session();
        config.region = String::new();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = SessionConfig::new("us-east-1", "", "secret");
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = SessionConfig::new("us-east-1", "access", "");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_region() {
        let config = SessionConfig::new("us east/1", "access", "secret");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_part_size() {
        let config = session().with_part_size(1024);
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = session().with_part_size(MAX_PART_SIZE + 1);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_endpoint_with_scheme_is_kept() {
        let config = session().with_endpoint("http://localhost:9000/");
        assert_eq!(
            config.endpoint_url().unwrap().as_deref(),
            Some("http://localhost:9000")
        );
    }

    #[test]
    fn test_endpoint_without_scheme_follows_tls_flag() {
        let config = session().with_endpoint("localhost:9000");
        assert_eq!(
            config.endpoint_url().unwrap().as_deref(),
            Some("https://localhost:9000")
        );

        let config = config.with_disable_tls(true);
        assert_eq!(
            config.endpoint_url().unwrap().as_deref(),
            Some("http://localhost:9000")
        );
    }

    #[test]
    fn test_no_endpoint() {
        assert_eq!(session().endpoint_url().unwrap(), None);

        let config = SessionConfig::new("eu-west-1", "a", "b").with_disable_tls(true);
        assert_eq!(
            config.endpoint_url().unwrap().as_deref(),
            Some("http://s3.eu-west-1.amazonaws.com")
        );
    }

    #[test]
    fn test_endpoint_bad_scheme() {
        let config = session().with_endpoint("ftp://files.example.com");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_endpoint_is_ignored() {
        let config = session().with_endpoint("   ");
        assert_eq!(config.endpoint_url().unwrap(), None);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", SessionConfig::new("us-east-1", "AKIA", "topsecret"));
        assert!(rendered.contains("AKIA"));
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("<redacted>"));
    }
}
