//! Localized string lookup for validation messages and field labels.
//!
//! A [`ResourceBundle`] resolves a key for a locale by consulting the
//! table for the locale's language first and the default table second.
//! Tables are loaded lazily from a [`ResourceProvider`] and cached per
//! language for the lifetime of the bundle.
//!
//! ## Example
//!
//! ```rust,ignore
//! use jsonvet_validate::bundle::*;
//!
//! let messages = MessageBundle::new(BuiltinResources);
//! let text = messages.get("Required.required", Some(&Locale::new("ja")));
//! ```

mod locale;
mod provider;

pub use locale::Locale;
pub use provider::{
    parse_table, BuiltinResources, ChainedResources, DirectoryResources, ResourceError,
    ResourceProvider, ResourceTable, StaticResources,
};

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};

/// Default bundle name for validation message templates.
pub const MESSAGE_BUNDLE: &str = "messages";

/// Default bundle name for field labels.
pub const LABEL_BUNDLE: &str = "labels";

/// A named set of localized strings backed by a provider.
pub struct ResourceBundle {
    name: String,
    provider: Arc<dyn ResourceProvider>,
    default_locale: Option<Locale>,
    tables: RwLock<HashMap<Option<String>, Arc<ResourceTable>>>,
}

impl ResourceBundle {
    /// Create a bundle named `name` reading from `provider`.
    ///
    /// The process default locale is taken from the host environment.
    pub fn new(name: impl Into<String>, provider: impl ResourceProvider + 'static) -> Self {
        Self::from_shared(name, Arc::new(provider))
    }

    /// Create a bundle over an already shared provider.
    pub fn from_shared(name: impl Into<String>, provider: Arc<dyn ResourceProvider>) -> Self {
        Self {
            name: name.into(),
            provider,
            default_locale: Locale::system(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Use `locale` when a lookup names no locale.
    ///
    /// `None` means lookups without a locale use the default table only.
    pub fn with_default_locale(mut self, locale: Option<Locale>) -> Self {
        self.default_locale = locale;
        self
    }

    /// Bundle name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locale used when a lookup names none.
    pub fn default_locale(&self) -> Option<&Locale> {
        self.default_locale.as_ref()
    }

    /// Resolve `key` for `locale`, falling back to the default table.
    ///
    /// Returns `None` when no table has the key; callers decide what to
    /// show instead.
    pub fn get(&self, key: &str, locale: Option<&Locale>) -> Option<String> {
        let language = locale
            .or(self.default_locale.as_ref())
            .map(Locale::language)
            .filter(|lang| !lang.is_empty());

        if let Some(language) = language {
            if let Some(value) = self.table(Some(language)).get(key) {
                return Some(value.clone());
            }
        }
        self.table(None).get(key).cloned()
    }

    /// Languages whose tables are cached so far (`None` is the default table).
    pub fn loaded(&self) -> Vec<Option<String>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut loaded: Vec<_> = tables.keys().cloned().collect();
        loaded.sort();
        loaded
    }

    fn table(&self, language: Option<String>) -> Arc<ResourceTable> {
        {
            let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(table) = tables.get(&language) {
                return Arc::clone(table);
            }
        }

        // Loaded without holding the lock; a concurrent loader may win the insert.
        let table = match self.provider.load(&self.name, language.as_deref()) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(
                    bundle = %self.name,
                    language = ?language,
                    error = %e,
                    "failed to load resource table, using an empty one"
                );
                ResourceTable::new()
            }
        };
        tracing::trace!(bundle = %self.name, language = ?language, entries = table.len(), "loaded resource table");

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(tables.entry(language).or_insert_with(|| Arc::new(table)))
    }
}

impl fmt::Debug for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBundle")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("default_locale", &self.default_locale)
            .field("loaded", &self.loaded())
            .finish()
    }
}

/// Bundle of validation message templates.
#[derive(Debug)]
pub struct MessageBundle(ResourceBundle);

impl MessageBundle {
    /// Message bundle named [`MESSAGE_BUNDLE`].
    pub fn new(provider: impl ResourceProvider + 'static) -> Self {
        Self(ResourceBundle::new(MESSAGE_BUNDLE, provider))
    }

    /// Wrap an existing bundle.
    pub fn from_bundle(bundle: ResourceBundle) -> Self {
        Self(bundle)
    }
}

impl Default for MessageBundle {
    fn default() -> Self {
        Self::new(BuiltinResources)
    }
}

impl Deref for MessageBundle {
    type Target = ResourceBundle;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Bundle of human-facing field names.
#[derive(Debug)]
pub struct LabelBundle(ResourceBundle);

impl LabelBundle {
    /// Label bundle named [`LABEL_BUNDLE`].
    pub fn new(provider: impl ResourceProvider + 'static) -> Self {
        Self(ResourceBundle::new(LABEL_BUNDLE, provider))
    }

    /// Wrap an existing bundle.
    pub fn from_bundle(bundle: ResourceBundle) -> Self {
        Self(bundle)
    }
}

impl Default for LabelBundle {
    fn default() -> Self {
        Self::new(BuiltinResources)
    }
}

impl Deref for LabelBundle {
    type Target = ResourceBundle;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
