//! Configuration file and settings resolution.
//!
//! Settings come from, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. An optional TOML config file
//! 3. Environment variables and command-line flags (see [`Overrides`])

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dashscope::DashScopeConfig;
use crate::error::ConfigError;

/// Default messages file, relative to the working directory.
pub const DEFAULT_MESSAGES_PATH: &str = "messages.json";

/// Root of the TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Path to the messages file.
    #[serde(default)]
    pub messages: Option<PathBuf>,

    /// Provider settings.
    #[serde(default)]
    pub provider: ProviderSection,
}

/// `[provider]` table.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSection {
    /// API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model identifier.
    #[serde(default)]
    pub model: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ProviderSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSection")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Values that take precedence over the config file.
///
/// The CLI fills these from flags, falling back to environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Messages file path.
    pub messages: Option<PathBuf>,
    /// API key.
    pub api_key: Option<String>,
    /// Base URL.
    pub base_url: Option<String>,
    /// Model identifier.
    pub model: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Messages file path.
    pub messages: PathBuf,
    /// Provider configuration.
    pub provider: DashScopeConfig,
}

impl Settings {
    /// Merge defaults, the config file and overrides.
    #[must_use]
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Self {
        let FileConfig { messages, provider } = file;

        let mut config = DashScopeConfig::default();
        if let Some(url) = overrides.base_url.or(provider.base_url) {
            config = config.with_base_url(url);
        }
        if let Some(model) = overrides.model.or(provider.model) {
            config = config.with_model(model);
        }
        if let Some(secs) = overrides.timeout_secs.or(provider.timeout_secs) {
            config = config.with_timeout(secs);
        }
        config.api_key = overrides.api_key.or(provider.api_key).unwrap_or_default();

        Self {
            messages: overrides
                .messages
                .or(messages)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MESSAGES_PATH)),
            provider: config,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(FileConfig::default(), Overrides::default())
    }
}

/// Parse a config file from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::TomlParse`] if `content` is not valid for the schema.
pub fn parse_config(content: &str, path: &Path) -> Result<FileConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::TomlParse {
        path: path.to_owned(),
        source,
    })
}

/// Load a config file from `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::TomlParse`] if it does not parse.
pub async fn load_config_from(path: impl AsRef<Path>) -> Result<FileConfig, ConfigError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
    let config = parse_config(&content, path)?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.messages, PathBuf::from("messages.json"));
        assert_eq!(settings.provider.model, "qwen-vl-max");
        assert_eq!(settings.provider.base_url, DashScopeConfig::DEFAULT_BASE_URL);
        assert!(settings.provider.api_key.is_empty());
        assert_eq!(settings.provider.timeout_secs, None);
    }

    #[test]
    fn file_values_apply() {
        let file = parse_config(
            r#"
            messages = "clips/cam1.json"

            [provider]
            api_key = "sk-file"
            model = "qwen-vl-plus"
            timeout_secs = 45
            "#,
            Path::new("askvl.toml"),
        )
        .unwrap();

        let settings = Settings::resolve(file, Overrides::default());
        assert_eq!(settings.messages, PathBuf::from("clips/cam1.json"));
        assert_eq!(settings.provider.api_key, "sk-file");
        assert_eq!(settings.provider.model, "qwen-vl-plus");
        assert_eq!(settings.provider.timeout_secs, Some(45));
        assert_eq!(settings.provider.base_url, DashScopeConfig::DEFAULT_BASE_URL);
    }

    #[test]
    fn overrides_beat_file() {
        let file = FileConfig {
            messages: Some(PathBuf::from("a.json")),
            provider: ProviderSection {
                api_key: Some("sk-file".into()),
                base_url: Some("http://file/v1".into()),
                model: Some("file-model".into()),
                timeout_secs: Some(10),
            },
        };
        let overrides = Overrides {
            messages: Some(PathBuf::from("b.json")),
            api_key: Some("sk-flag".into()),
            base_url: Some("http://flag/v1/".into()),
            model: None,
            timeout_secs: None,
        };

        let settings = Settings::resolve(file, overrides);
        assert_eq!(settings.messages, PathBuf::from("b.json"));
        assert_eq!(settings.provider.api_key, "sk-flag");
        assert_eq!(settings.provider.base_url, "http://flag/v1");
        assert_eq!(settings.provider.model, "file-model");
        assert_eq!(settings.provider.timeout_secs, Some(10));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_config("[provider]\nkey = \"x\"\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn section_debug_hides_key() {
        let section = ProviderSection {
            api_key: Some("sk-secret".into()),
            ..Default::default()
        };
        assert!(!format!("{section:?}").contains("sk-secret"));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = load_config_from("no/such/askvl.toml").await.unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
