#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Configuration for the MLS locator toolchain.
//!
//! The defaults live in `config/default.toml`, embedded at compile time.
//! A user file can override any subset of keys, and a handful of
//! environment variables override the file:
//!
//! | Variable | Key |
//! |---|---|
//! | `MLS_LOCATOR_API_URL` | `api.base_url` |
//! | `MLS_LOCATOR_FONT_DIR` | `report.font_dir` |
//! | `MLS_LOCATOR_OUTPUT_DIR` | `report.output_dir` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Embedded default configuration.
pub const DEFAULT_TOML: &str = include_str!("../config/default.toml");

/// Environment variable naming a user config file.
pub const CONFIG_PATH_ENV: &str = "MLS_LOCATOR_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has wrongly-typed keys.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is syntactically valid but unusable.
    #[error("Invalid value for {key}: {message}")]
    Invalid {
        key: &'static str,
        message: String,
    },
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend, without the `/api` prefix.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Pacing of the sequential reload requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    pub mandal_delay_ms: u64,
    pub sample_delay_ms: u64,
    /// How many codes all-districts mode resolves.
    pub sample_size: usize,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            mandal_delay_ms: 100,
            sample_delay_ms: 50,
            sample_size: 30,
        }
    }
}

impl LoadingConfig {
    /// No pacing at all. Used by tests and by callers talking to a local
    /// fixture server.
    #[must_use]
    pub const fn unpaced(sample_size: usize) -> Self {
        Self {
            mandal_delay_ms: 0,
            sample_delay_ms: 0,
            sample_size,
        }
    }

    #[must_use]
    pub const fn mandal_delay(&self) -> Duration {
        Duration::from_millis(self.mandal_delay_ms)
    }

    #[must_use]
    pub const fn sample_delay(&self) -> Duration {
        Duration::from_millis(self.sample_delay_ms)
    }
}

/// Report rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory holding the TrueType font family used for PDFs.
    pub font_dir: PathBuf,
    /// Family name; files are expected as `<family>-Regular.ttf`,
    /// `<family>-Bold.ttf`, `<family>-Italic.ttf`, `<family>-BoldItalic.ttf`.
    pub font_family: String,
    /// Row cap for multi-point report tables.
    pub max_rows: usize,
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            font_dir: PathBuf::from("./fonts"),
            font_family: "LiberationSans".to_string(),
            max_rows: 50,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Interactive session settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a notification stays visible.
    pub notification_ms: u64,
    /// User name shown when the identity endpoint is unavailable.
    pub fallback_user: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            notification_ms: 4000,
            fallback_user: "guest".to_string(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub const fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}

/// Complete toolchain configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub api: ApiConfig,
    pub loading: LoadingConfig,
    pub report: ReportConfig,
    pub session: SessionConfig,
}

impl LocatorConfig {
    /// Parses a TOML document. Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the TOML is malformed or a value is
    /// unusable.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `path`, or from `MLS_LOCATOR_CONFIG` when
    /// `path` is `None`, or the embedded defaults when neither is set.
    /// Environment overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let path = path.map(Path::to_path_buf).or(env_path);

        let mut config = match path {
            Some(path) => {
                log::debug!("Loading config from {}", path.display());
                let text = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Io { path, source })?;
                Self::from_toml_str(&text)?
            }
            None => Self::from_toml_str(DEFAULT_TOML)?,
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("MLS_LOCATOR_API_URL").filter(|v| !v.is_empty()) {
            log::debug!("api.base_url overridden from environment: {url}");
            self.api.base_url = url;
        }
        if let Some(dir) = lookup("MLS_LOCATOR_FONT_DIR").filter(|v| !v.is_empty()) {
            self.report.font_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("MLS_LOCATOR_OUTPUT_DIR").filter(|v| !v.is_empty()) {
            self.report.output_dir = PathBuf::from(dir);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "api.base_url",
                message: "must not be empty".to_string(),
            });
        }
        if self.report.max_rows == 0 {
            return Err(ConfigError::Invalid {
                key: "report.max_rows",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_match_builtin() {
        let parsed = LocatorConfig::from_toml_str(DEFAULT_TOML).unwrap();
        assert_eq!(parsed, LocatorConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = LocatorConfig::from_toml_str(
            r#"
            [api]
            base_url = "http://mls.example:8080"

            [loading]
            sample_size = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://mls.example:8080");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.loading.sample_size, 5);
        assert_eq!(config.loading.mandal_delay_ms, 100);
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn env_overrides_win() {
        let mut config = LocatorConfig::default();
        config.apply_env_overrides(|key| match key {
            "MLS_LOCATOR_API_URL" => Some("http://override:9000".to_string()),
            "MLS_LOCATOR_FONT_DIR" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "http://override:9000");
        assert_eq!(config.report.font_dir, PathBuf::from("./fonts"));
    }

    #[test]
    fn rejects_zero_row_cap() {
        let err = LocatorConfig::from_toml_str("[report]\nmax_rows = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "report.max_rows",
                ..
            }
        ));
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(matches!(
            LocatorConfig::from_toml_str("[loading]\nsample_size = \"many\"\n"),
            Err(ConfigError::Toml(_))
        ));
    }
}
