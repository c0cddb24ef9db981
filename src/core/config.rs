use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable holding the provisioning key used to list keys.
pub const PROVISIONING_KEY_ENV: &str = "OPENROUTER_PROVISIONING_KEY";

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/keys";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_sort")]
    pub sort: String,
}

fn default_format() -> String {
    "text".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}
fn default_sort() -> String {
    "name".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            color: default_color(),
            sort: default_sort(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Overridden by `OPENROUTER_PROVISIONING_KEY` when that is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub include_disabled: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_timeout_secs() -> u64 {
    15
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            provisioning_key: None,
            timeout_secs: default_timeout_secs(),
            include_disabled: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub provider: ProviderSettings,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("keywatch").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Provisioning key from the environment, else from the config file.
    /// Empty values count as unset.
    pub fn provisioning_key(&self) -> Option<String> {
        self.provisioning_key_from(std::env::var(PROVISIONING_KEY_ENV).ok())
    }

    /// Same as [`provisioning_key`](Self::provisioning_key) with the
    /// environment value supplied by the caller.
    pub fn provisioning_key_from(&self, from_env: Option<String>) -> Option<String> {
        resolve_secret(from_env, self.provider.provisioning_key.as_deref())
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["text", "json"].contains(&self.settings.default_format.as_str()) {
            issues.push(format!(
                "Invalid default_format: '{}' (must be 'text' or 'json')",
                self.settings.default_format
            ));
        }
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        if !["name", "usage", "ratio", "expiry"].contains(&self.settings.sort.as_str()) {
            issues.push(format!(
                "Invalid sort: '{}' (must be name|usage|ratio|expiry)",
                self.settings.sort
            ));
        }
        if !self.provider.endpoint.starts_with("https://") {
            issues.push(format!(
                "Provider endpoint must use HTTPS, got: '{}'",
                self.provider.endpoint
            ));
        }
        if self.provider.timeout_secs == 0 {
            issues.push("Provider timeout_secs must be greater than 0".to_string());
        }
        issues
    }
}

fn resolve_secret(from_env: Option<String>, from_file: Option<&str>) -> Option<String> {
    from_env
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            from_file
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.default_format, "text");
        assert_eq!(settings.color, "auto");
        assert_eq!(settings.sort, "name");
    }

    #[test]
    fn default_provider_points_at_openrouter() {
        let provider = ProviderSettings::default();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert!(provider.provisioning_key.is_none());
        assert!(!provider.include_disabled);
    }

    #[test]
    fn validate_catches_invalid_format() {
        let mut config = AppConfig::default();
        config.settings.default_format = "xml".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("default_format")));
    }

    #[test]
    fn validate_catches_invalid_color() {
        let mut config = AppConfig::default();
        config.settings.color = "blue".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("color")));
    }

    #[test]
    fn validate_catches_invalid_sort() {
        let mut config = AppConfig::default();
        config.settings.sort = "random".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("sort")));
    }

    #[test]
    fn validate_catches_plain_http_endpoint() {
        let mut config = AppConfig::default();
        config.provider.endpoint = "http://openrouter.ai/api/v1/keys".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("HTTPS")));
    }

    #[test]
    fn validate_catches_zero_timeout() {
        let mut config = AppConfig::default();
        config.provider.timeout_secs = 0;
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("timeout_secs")));
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[settings]
default_format = "json"
color = "always"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.settings.default_format, "json");
        assert_eq!(config.settings.color, "always");
        assert_eq!(config.settings.sort, "name");
        assert_eq!(config.provider.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn parse_provider_toml() {
        let toml = r#"
[provider]
provisioning_key = "sk-or-v1-prov"
timeout_secs = 30
include_disabled = true
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.provider.provisioning_key.as_deref(), Some("sk-or-v1-prov"));
        assert_eq!(config.provider.timeout_secs, 30);
        assert!(config.provider.include_disabled);
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.settings.default_format, "text");
        assert_eq!(config.settings.color, "auto");
        assert_eq!(config.provider.timeout_secs, 15);
    }

    #[test]
    fn resolve_secret_prefers_env() {
        let secret = resolve_secret(Some("from-env".into()), Some("from-file"));
        assert_eq!(secret.as_deref(), Some("from-env"));
    }

    #[test]
    fn resolve_secret_skips_empty_values() {
        assert_eq!(
            resolve_secret(Some("  ".into()), Some("from-file")).as_deref(),
            Some("from-file")
        );
        assert!(resolve_secret(None, Some("")).is_none());
        assert!(resolve_secret(None, None).is_none());
    }

    #[test]
    fn provisioning_key_from_falls_back_to_file() {
        let mut config = AppConfig::default();
        config.provider.provisioning_key = Some("from-file".to_string());
        assert_eq!(config.provisioning_key_from(None).as_deref(), Some("from-file"));
        assert_eq!(
            config.provisioning_key_from(Some("from-env".into())).as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn config_path_uses_xdg_when_set() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_xdg_config");
        let path = AppConfig::config_path();
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(path, PathBuf::from("/tmp/test_xdg_config/keywatch/config.toml"));
    }
}
