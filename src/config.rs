//! Configuration loading for the `aerogen` CLI.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.aerogen/config.toml` (user)
//! 3. `/etc/aerogen/config.toml` (system)
//!
//! With no file present the defaults apply.
//!
//! The credential is loaded separately:
//! 1. `~/.aerogen/secrets.toml` (user, must be 0600)
//! 2. `/etc/aerogen/secrets.toml` (system, must be 0600)
//! 3. `GEMINI_API_KEY`, then `API_KEY` from the environment

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gateway::{API_KEY_ENV_VARS, AerogenBuilder};
use crate::guard::QuotaPolicy;
use crate::providers::gemini::{DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use crate::types::AspectRatio;
use crate::{AerogenError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub imagery: ImageryConfig,
    #[serde(default)]
    pub quota: QuotaPolicy,
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

/// Gemini endpoint and model selection.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// Per-request timeout in seconds (default: 60).
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            image_model: default_image_model(),
            text_model: default_text_model(),
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_timeout() -> u64 {
    60
}

/// Image generation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageryConfig {
    /// Pause between sequential fetches in milliseconds (default: 500).
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    /// Optional cap on cached images (default: unbounded).
    #[serde(default)]
    pub max_cached_images: Option<u64>,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            aspect_ratio: AspectRatio::default(),
            max_cached_images: None,
        }
    }
}

fn default_pacing_ms() -> u64 {
    500
}

/// Preference store location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesConfig {
    /// Defaults to `~/.aerogen/preferences.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Secrets configuration (API key).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub gemini: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl Config {
    /// Load configuration from the standard locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AerogenError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            AerogenError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path. `None` means "use defaults".
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(AerogenError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".aerogen").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/aerogen/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Apply this configuration to a gateway builder.
    pub fn apply(&self, builder: AerogenBuilder) -> AerogenBuilder {
        let mut builder = builder
            .base_url(&self.provider.base_url)
            .image_model(&self.provider.image_model)
            .text_model(&self.provider.text_model)
            .timeout(Duration::from_secs(self.provider.request_timeout_secs))
            .aspect_ratio(self.imagery.aspect_ratio)
            .pacing(Duration::from_millis(self.imagery.pacing_ms))
            .quota_policy(self.quota.clone());
        if let Some(max) = self.imagery.max_cached_images {
            builder = builder.cache(crate::CacheConfig::new().max_entries(max));
        }
        builder
    }

    /// Preference file location: configured path, else the default.
    pub fn preferences_path(&self) -> Option<PathBuf> {
        self.preferences
            .path
            .clone()
            .or_else(crate::preferences::PreferenceStore::default_path)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (the key may come from the
    /// environment instead).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".aerogen").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/aerogen/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AerogenError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            AerogenError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    pub fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            AerogenError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(AerogenError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// The Gemini key, falling back to the environment.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    /// Like [`api_key`](Self::api_key) with a custom variable lookup.
    pub fn api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.gemini
            .as_ref()
            .map(|s| s.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .filter_map(|name| lookup(*name))
                    .find(|v| !v.trim().is_empty())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.provider.image_model, "gemini-2.5-flash-image");
        assert_eq!(config.provider.text_model, "gemini-2.5-flash");
        assert_eq!(config.provider.request_timeout_secs, 60);
        assert_eq!(config.imagery.pacing_ms, 500);
        assert_eq!(config.imagery.aspect_ratio, AspectRatio::Widescreen);
        assert_eq!(config.quota, QuotaPolicy::default());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
            [provider]
            request_timeout_secs = 15

            [imagery]
            pacing_ms = 1000
            aspect_ratio = "4:3"

            [quota]
            markers = ["quota", "billing"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.provider.request_timeout_secs, 15);
        assert_eq!(config.provider.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.imagery.pacing_ms, 1000);
        assert_eq!(config.imagery.aspect_ratio, AspectRatio::Standard);
        assert_eq!(config.quota.markers, vec!["quota", "billing"]);
        // unspecified policy fields keep their defaults
        assert_eq!(config.quota.status_codes, vec![429, 403]);
    }

    #[test]
    fn explicit_missing_path_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/aerogen.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[imagery]\npacing_ms = 250\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.imagery.pacing_ms, 250);
    }

    #[test]
    fn secrets_file_wins_over_env() {
        let secrets: Secrets = toml::from_str("[gemini]\napi_key = \"from-file\"\n").unwrap();
        let key = secrets.api_key_with(|_| Some("from-env".into()));
        assert_eq!(key.as_deref(), Some("from-file"));
    }

    #[test]
    fn secrets_fall_back_to_env() {
        let secrets = Secrets::default();
        let key = secrets.api_key_with(|name| (name == "API_KEY").then(|| "legacy".to_string()));
        assert_eq!(key.as_deref(), Some("legacy"));
        assert!(Secrets::default().api_key_with(|_| None).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn insecure_secrets_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        fs::write(&path, "[gemini]\napi_key = \"k\"\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(Secrets::check_permissions(&path).is_err());

        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        assert!(Secrets::check_permissions(&path).is_ok());
    }
}
