//! Storage backends for message and label strings.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Flat key → string table for one bundle and language.
pub type ResourceTable = HashMap<String, String>;

const BUILTIN_MESSAGES: &str = include_str!("../../resources/messages.toml");
const BUILTIN_MESSAGES_JA: &str = include_str!("../../resources/messages_ja.toml");

/// Error raised while loading a resource table.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource file exists but could not be read.
    #[error("failed to read resource file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resource file is not valid TOML.
    #[error("failed to parse resource {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    /// A value in the resource file is neither a string nor a table.
    #[error("resource {origin} has non-string value for `{key}`")]
    NotAString { origin: String, key: String },
}

/// Source of resource tables, keyed by bundle name and optional language.
///
/// `language == None` asks for the default table that every locale falls
/// back to.
pub trait ResourceProvider: Send + Sync + fmt::Debug {
    /// Load the table for `bundle` in `language`.
    ///
    /// A table that does not exist is empty, not an error.
    fn load(&self, bundle: &str, language: Option<&str>) -> Result<ResourceTable, ResourceError>;
}

impl<P: ResourceProvider + ?Sized> ResourceProvider for Arc<P> {
    fn load(&self, bundle: &str, language: Option<&str>) -> Result<ResourceTable, ResourceError> {
        (**self).load(bundle, language)
    }
}

/// Parse a TOML document into a flat table.
///
/// Nested tables are flattened with `.`, so `[Range.limit] minimum = ".."`
/// and `"Range.limit.minimum" = ".."` produce the same key.
pub fn parse_table(source: &str, origin: &str) -> Result<ResourceTable, ResourceError> {
    let document: toml::Table = source.parse().map_err(|source| ResourceError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    let mut table = ResourceTable::new();
    flatten(&document, "", origin, &mut table)?;
    Ok(table)
}

fn flatten(
    document: &toml::Table,
    prefix: &str,
    origin: &str,
    out: &mut ResourceTable,
) -> Result<(), ResourceError> {
    for (key, value) in document {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::String(s) => {
                out.insert(full_key, s.clone());
            }
            toml::Value::Table(nested) => flatten(nested, &full_key, origin, out)?,
            _ => {
                return Err(ResourceError::NotAString {
                    origin: origin.to_string(),
                    key: full_key,
                })
            }
        }
    }
    Ok(())
}

/// Message templates shipped with the crate.
///
/// Serves the `messages` bundle in English (default table) and Japanese.
/// Every other bundle, labels included, is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinResources;

impl BuiltinResources {
    /// Bundle name the built-in templates are served under.
    pub const MESSAGES: &'static str = "messages";
}

impl ResourceProvider for BuiltinResources {
    fn load(&self, bundle: &str, language: Option<&str>) -> Result<ResourceTable, ResourceError> {
        if bundle != Self::MESSAGES {
            return Ok(ResourceTable::new());
        }
        match language {
            None => parse_table(BUILTIN_MESSAGES, "builtin:messages.toml"),
            Some("ja") => parse_table(BUILTIN_MESSAGES_JA, "builtin:messages_ja.toml"),
            Some(_) => Ok(ResourceTable::new()),
        }
    }
}

/// In-memory tables, assembled with builder calls.
///
/// ```rust,ignore
/// let labels = StaticResources::new()
///     .with("labels", None, "UserName", "User name")
///     .with("labels", Some("ja"), "UserName", "ユーザー名");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticResources {
    tables: HashMap<(String, Option<String>), ResourceTable>,
}

impl StaticResources {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one entry.
    pub fn with(
        mut self,
        bundle: impl Into<String>,
        language: Option<&str>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.insert(bundle, language, key, value);
        self
    }

    /// Add one entry in place.
    pub fn insert(
        &mut self,
        bundle: impl Into<String>,
        language: Option<&str>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.tables
            .entry((bundle.into(), language.map(str::to_string)))
            .or_default()
            .insert(key.into(), value.into());
    }
}

impl ResourceProvider for StaticResources {
    fn load(&self, bundle: &str, language: Option<&str>) -> Result<ResourceTable, ResourceError> {
        Ok(self
            .tables
            .get(&(bundle.to_string(), language.map(str::to_string)))
            .cloned()
            .unwrap_or_default())
    }
}

/// TOML files in a directory: `<bundle>.toml` for the default table and
/// `<bundle>_<language>.toml` per language.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    /// Serve resources from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the files are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `bundle` in `language`.
    pub fn file_for(&self, bundle: &str, language: Option<&str>) -> PathBuf {
        match language {
            Some(lang) if !lang.is_empty() => self.root.join(format!("{bundle}_{lang}.toml")),
            _ => self.root.join(format!("{bundle}.toml")),
        }
    }
}

impl ResourceProvider for DirectoryResources {
    fn load(&self, bundle: &str, language: Option<&str>) -> Result<ResourceTable, ResourceError> {
        let path = self.file_for(bundle, language);
        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::trace!(path = %path.display(), "resource file not present");
                return Ok(ResourceTable::new());
            }
            Err(source) => return Err(ResourceError::Io { path, source }),
        };
        parse_table(&source, &path.display().to_string())
    }
}

/// Several providers layered in order; earlier providers win per key.
#[derive(Debug, Clone, Default)]
pub struct ChainedResources {
    providers: Vec<Arc<dyn ResourceProvider>>,
}

impl ChainedResources {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider with lower priority than those already added.
    pub fn with(mut self, provider: impl ResourceProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// `true` when the chain has no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ResourceProvider for ChainedResources {
    fn load(&self, bundle: &str, language: Option<&str>) -> Result<ResourceTable, ResourceError> {
        let mut merged = ResourceTable::new();
        for provider in self.providers.iter().rev() {
            match provider.load(bundle, language) {
                Ok(table) => merged.extend(table),
                Err(e) => {
                    tracing::warn!(bundle, ?language, error = %e, "resource provider failed");
                }
            }
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_messages_cover_every_rule_key() {
        let table = BuiltinResources.load("messages", None).unwrap();
        for key in [
            "Required.required",
            "NotNull.null",
            "NotEmpty.string",
            "NotEmpty.list",
            "NotEmpty.map",
            "Minimum.format",
            "Minimum.limit",
            "Maximum.format",
            "Maximum.limit",
            "Range.format",
            "Range.limit.minimum",
            "Range.limit.maximum",
            "Pattern.format",
            "Pattern.match",
        ] {
            assert!(table.contains_key(key), "missing builtin message {key}");
        }
    }

    #[test]
    fn builtin_japanese_table_loads() {
        let table = BuiltinResources.load("messages", Some("ja")).unwrap();
        assert!(table.contains_key("Required.required"));
        assert!(BuiltinResources
            .load("messages", Some("fr"))
            .unwrap()
            .is_empty());
        assert!(BuiltinResources.load("labels", None).unwrap().is_empty());
    }

    #[test]
    fn nested_tables_flatten_with_dots() {
        let table = parse_table(
            "\"Range.limit.minimum\" = \"a\"\n[Pattern]\nmatch = \"b\"\n",
            "test",
        )
        .unwrap();
        assert_eq!(table["Range.limit.minimum"], "a");
        assert_eq!(table["Pattern.match"], "b");
    }

    #[test]
    fn non_string_values_are_rejected() {
        let err = parse_table("count = 3", "test").unwrap_err();
        assert!(matches!(err, ResourceError::NotAString { ref key, .. } if key == "count"));
    }

    #[test]
    fn static_resources_are_keyed_by_language() {
        let provider = StaticResources::new()
            .with("labels", None, "UserName", "User name")
            .with("labels", Some("ja"), "UserName", "ユーザー名");

        assert_eq!(provider.load("labels", None).unwrap()["UserName"], "User name");
        assert_eq!(
            provider.load("labels", Some("ja")).unwrap()["UserName"],
            "ユーザー名"
        );
        assert!(provider.load("labels", Some("de")).unwrap().is_empty());
    }

    #[test]
    fn directory_resources_read_language_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("labels.toml"), "UserName = \"User name\"\n").unwrap();
        std::fs::write(dir.path().join("labels_ja.toml"), "UserName = \"ユーザー名\"\n").unwrap();

        let provider = DirectoryResources::new(dir.path());
        assert_eq!(provider.load("labels", None).unwrap()["UserName"], "User name");
        assert_eq!(
            provider.load("labels", Some("ja")).unwrap()["UserName"],
            "ユーザー名"
        );
        assert!(provider.load("labels", Some("fr")).unwrap().is_empty());
    }

    #[test]
    fn chained_resources_prefer_earlier_providers() {
        let chain = ChainedResources::new()
            .with(StaticResources::new().with("messages", None, "Required.required", "custom"))
            .with(BuiltinResources);

        let table = chain.load("messages", None).unwrap();
        assert_eq!(table["Required.required"], "custom");
        assert!(table.contains_key("Pattern.match"));
    }
}
