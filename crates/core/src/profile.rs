//! Profile management
//!
//! Profiles are named session configurations stored in the config file, so
//! commands can refer to an object store by a short name.

use serde::{Deserialize, Serialize};

use crate::config::ConfigManager;
use crate::error::{Error, Result};
use crate::session::SessionConfig;

/// A named object store session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique name for this profile
    pub name: String,

    /// Connection settings
    #[serde(flatten)]
    pub session: SessionConfig,
}

impl Profile {
    pub fn new(name: impl Into<String>, session: SessionConfig) -> Self {
        Self {
            name: name.into(),
            session,
        }
    }
}

/// Manager for profile operations
pub struct ProfileManager {
    config_manager: ConfigManager,
}

impl ProfileManager {
    /// Create a new ProfileManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new ProfileManager using the default config location
    pub fn new() -> Result<Self> {
        let config_manager = ConfigManager::new()?;
        Ok(Self { config_manager })
    }

    /// List all configured profiles
    pub fn list(&self) -> Result<Vec<Profile>> {
        let config = self.config_manager.load()?;
        Ok(config.profiles)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Result<Profile> {
        let config = self.config_manager.load()?;
        config
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// Add or replace a profile
    ///
    /// The session is validated before anything is written.
    pub fn set(&self, profile: Profile) -> Result<()> {
        if !is_valid_profile_name(&profile.name) {
            return Err(Error::Config(format!(
                "Invalid profile name '{}': use letters, digits, '-' or '_'",
                profile.name
            )));
        }
        profile.session.validate()?;

        let mut config = self.config_manager.load()?;
        config.profiles.retain(|p| p.name != profile.name);
        config.profiles.push(profile);

        self.config_manager.save(&config)
    }

    /// Remove a profile
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.profiles.len();

        config.profiles.retain(|p| p.name != name);

        if config.profiles.len() == original_len {
            return Err(Error::ProfileNotFound(name.to_string()));
        }

        self.config_manager.save(&config)
    }

    /// Check if a profile exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.profiles.iter().any(|p| p.name == name))
    }
}

/// Check if a string is a valid profile name
pub fn is_valid_profile_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_profile_manager() -> (ProfileManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_manager = ConfigManager::with_path(config_path);
        (ProfileManager::with_config_manager(config_manager), temp_dir)
    }

    fn profile(name: &str, endpoint: &str) -> Profile {
        Profile::new(
            name,
            SessionConfig::new("us-east-1", "access", "secret").with_endpoint(endpoint),
        )
    }

    #[test]
    fn test_profile_manager_set_and_get() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(profile("minio", "http://localhost:9000")).unwrap();

        let retrieved = manager.get("minio").unwrap();
        assert_eq!(retrieved.name, "minio");
        assert_eq!(
            retrieved.session.endpoint.as_deref(),
            Some("http://localhost:9000")
        );
    }

    #[test]
    fn test_profile_manager_list() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(profile("a", "http://a:9000")).unwrap();
        manager.set(profile("b", "http://b:9000")).unwrap();

        assert_eq!(manager.list().unwrap().len(), 2);
    }

    #[test]
    fn test_profile_manager_remove() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(profile("test", "http://localhost:9000")).unwrap();
        assert!(manager.exists("test").unwrap());

        manager.remove("test").unwrap();
        assert!(!manager.exists("test").unwrap());
    }

    #[test]
    fn test_profile_manager_remove_not_found() {
        let (manager, _temp_dir) = temp_profile_manager();

        let result = manager.remove("nonexistent");
        assert!(matches!(result, Err(Error::ProfileNotFound(_))));
    }

    #[test]
    fn test_profile_manager_get_not_found() {
        let (manager, _temp_dir) = temp_profile_manager();

        let result = manager.get("nonexistent");
        assert!(matches!(result, Err(Error::ProfileNotFound(_))));
    }

    #[test]
    fn test_profile_update_existing() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(profile("test", "http://old:9000")).unwrap();
        manager.set(profile("test", "http://new:9000")).unwrap();

        let profiles = manager.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(
            profiles[0].session.endpoint.as_deref(),
            Some("http://new:9000")
        );
    }

    #[test]
    fn test_set_rejects_invalid_session() {
        let (manager, _temp_dir) = temp_profile_manager();

        let bad = Profile::new("bad", SessionConfig::new("us-east-1", "", "secret"));
        assert!(matches!(manager.set(bad), Err(Error::Config(_))));
        assert!(!manager.exists("bad").unwrap());
    }

    #[test]
    fn test_set_rejects_invalid_name() {
        let (manager, _temp_dir) = temp_profile_manager();

        let bad = profile("my/profile", "http://localhost:9000");
        assert!(matches!(manager.set(bad), Err(Error::Config(_))));
    }

    #[test]
    fn test_valid_profile_names() {
        assert!(is_valid_profile_name("minio"));
        assert!(is_valid_profile_name("prod_eu-1"));
        assert!(!is_valid_profile_name(""));
        assert!(!is_valid_profile_name("a.b"));
    }
}
