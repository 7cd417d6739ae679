//! Validator configuration.
//!
//! ```rust,ignore
//! // JSONVET_LOCALE=ja JSONVET_RESOURCE_DIR=./i18n
//! let validator = Validator::from_config(&ValidatorConfig::from_env());
//! ```

use crate::bundle::{Locale, LABEL_BUNDLE, MESSAGE_BUNDLE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable for the default locale.
pub const ENV_LOCALE: &str = "JSONVET_LOCALE";
/// Environment variable for the resource directory.
pub const ENV_RESOURCE_DIR: &str = "JSONVET_RESOURCE_DIR";
/// Environment variable for the message bundle name.
pub const ENV_MESSAGE_BUNDLE: &str = "JSONVET_MESSAGE_BUNDLE";
/// Environment variable for the label bundle name.
pub const ENV_LABEL_BUNDLE: &str = "JSONVET_LABEL_BUNDLE";

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How a [`Validator`](crate::Validator) finds its resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Locale used when a call names none; the host locale when unset
    pub locale: Option<Locale>,
    /// Bundle holding message templates
    pub message_bundle: String,
    /// Bundle holding field labels
    pub label_bundle: String,
    /// Directory of `<bundle>.toml` / `<bundle>_<lang>.toml` files
    pub resource_dir: Option<PathBuf>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            locale: None,
            message_bundle: MESSAGE_BUNDLE.to_string(),
            label_bundle: LABEL_BUNDLE.to_string(),
            resource_dir: None,
        }
    }
}

impl ValidatorConfig {
    /// Defaults overridden by `JSONVET_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `JSONVET_*`
    /// keys. Empty values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(locale) = get(ENV_LOCALE) {
            config.locale = Some(Locale::new(locale));
        }
        if let Some(dir) = get(ENV_RESOURCE_DIR) {
            config.resource_dir = Some(PathBuf::from(dir));
        }
        if let Some(name) = get(ENV_MESSAGE_BUNDLE) {
            config.message_bundle = name;
        }
        if let Some(name) = get(ENV_LABEL_BUNDLE) {
            config.label_bundle = name;
        }
        config
    }

    /// Parse a TOML configuration.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: impl Into<Locale>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set the resource directory.
    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = Some(dir.into());
        self
    }
}
