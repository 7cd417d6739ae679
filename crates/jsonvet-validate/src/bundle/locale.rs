//! Locale tags and host locale detection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variables consulted for the host locale, in priority order.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// A locale tag such as `ja`, `en-US` or `ja_JP.UTF-8`.
///
/// Only the language subtag takes part in resource lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Create a locale from a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The full tag as given.
    pub fn tag(&self) -> &str {
        &self.0
    }

    /// Lowercase primary language subtag (`ja_JP.UTF-8` → `ja`).
    pub fn language(&self) -> String {
        self.0
            .split(['_', '-', '.', '@'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    /// Locale of the host environment, read from `LC_ALL`, `LC_MESSAGES` and `LANG`.
    ///
    /// `C` and `POSIX` carry no language and are skipped.
    pub fn system() -> Option<Self> {
        LOCALE_VARS.iter().find_map(|var| {
            std::env::var(var)
                .ok()
                .and_then(|value| Self::parse_env(&value))
        })
    }

    fn parse_env(value: &str) -> Option<Self> {
        let locale = Self::new(value.trim());
        match locale.language().as_str() {
            "" | "c" | "posix" => None,
            _ => Some(locale),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}
