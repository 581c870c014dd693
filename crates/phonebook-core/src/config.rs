use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Key the JSON contact list is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Apply the extended rule set (email, password, security question,
    /// split name, full birthdate) when validating CREATE.
    #[serde(default)]
    pub extended_create: bool,
    /// Demonstration endpoint that receives each created or updated contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Upper bound on one webhook delivery, in seconds.
    #[serde(default = "default_webhook_timeout_secs")]
    pub webhook_timeout_secs: u64,
}

fn default_version() -> u32 {
    1
}

fn default_webhook_timeout_secs() -> u64 {
    3
}

fn default_storage_key() -> String {
    paths::DEFAULT_STORAGE_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            storage_key: default_storage_key(),
            extended_create: false,
            webhook_url: None,
            webhook_timeout_secs: default_webhook_timeout_secs(),
        }
    }
}

impl Config {
    /// Load `.phonebook/config.yaml`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        match crate::io::read_optional(&path)? {
            Some(data) => Ok(serde_yaml::from_str(&data)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Write the default config unless one exists. Returns true if written.
    pub fn init_default(root: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(&Self::default())?;
        crate::io::write_if_missing(&paths::config_path(root), data.as_bytes())
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Err(e) = paths::validate_key(&self.storage_key) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: e.to_string(),
            });
        }

        if let Some(url) = &self.webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("webhook_url '{url}' is not an http(s) URL; it will be skipped"),
                });
            }
        }

        warnings
    }

    /// The webhook URL if one is configured with an http(s) scheme.
    pub fn usable_webhook(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
    }

    pub fn webhook_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.webhook_timeout_secs.max(1))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage_key, "phoneBook");
    }

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            extended_create: true,
            webhook_url: Some("https://example.test/hook".into()),
            ..Config::default()
        };
        config.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), config);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".phonebook")).unwrap();
        std::fs::write(
            dir.path().join(".phonebook/config.yaml"),
            "extended_create: true\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.extended_create);
        assert_eq!(config.storage_key, "phoneBook");
        assert_eq!(config.webhook_timeout(), std::time::Duration::from_secs(3));
    }

    #[test]
    fn validate_flags_bad_key_and_url() {
        let config = Config {
            storage_key: "../x".into(),
            webhook_url: Some("ftp://nope".into()),
            ..Config::default()
        };
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].level, WarnLevel::Error);
        assert!(config.usable_webhook().is_none());
    }

    #[test]
    fn init_default_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        assert!(Config::init_default(dir.path()).unwrap());
        let custom = Config {
            extended_create: true,
            ..Config::default()
        };
        custom.save(dir.path()).unwrap();
        assert!(!Config::init_default(dir.path()).unwrap());
        assert!(Config::load(dir.path()).unwrap().extended_create);
    }

    #[test]
    fn default_config_is_clean() {
        assert!(Config::default().validate().is_empty());
    }
}
