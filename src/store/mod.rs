//! Configuration store
//!
//! `ConfigStore` owns the namespace caches together with the preference and
//! secret stores behind them. All reads and writes of initiator
//! configuration go through it; `synchronize` reconciles the caches with
//! preferences.
//!
//! The store holds no lock. Callers that share one across threads must
//! serialize access themselves.

mod auth;
mod discovery;
mod initiator;
mod sync;
mod targets;

use crate::cache::{ConfigCache, Namespace};
use crate::prefs::PreferenceStore;
use crate::secrets::SecretStore;
use serde::Deserialize;

/// How removals of keys that do not exist affect the modified flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalMode {
    /// Always mark the namespace modified, even when nothing was removed
    #[default]
    Compat,

    /// Mark the namespace modified only when an entry was removed
    Strict,
}

/// Cached initiator configuration backed by preference and secret stores
pub struct ConfigStore<P, S> {
    cache: ConfigCache,
    prefs: P,
    secrets: S,
    removal: RemovalMode,
}

impl<P: PreferenceStore, S: SecretStore> ConfigStore<P, S> {
    /// Create a store with empty caches. Nothing is read until the first
    /// `synchronize`.
    pub fn new(prefs: P, secrets: S) -> Self {
        Self {
            cache: ConfigCache::new(),
            prefs,
            secrets,
            removal: RemovalMode::default(),
        }
    }

    pub fn with_removal_mode(mut self, removal: RemovalMode) -> Self {
        self.removal = removal;
        self
    }

    pub fn removal_mode(&self) -> RemovalMode {
        self.removal
    }

    /// Whether a namespace has local changes not yet written to preferences
    pub fn is_modified(&self, namespace: Namespace) -> bool {
        self.cache.is_modified(namespace)
    }

    /// Whether a namespace has been loaded or created
    pub fn is_loaded(&self, namespace: Namespace) -> bool {
        self.cache.is_present(namespace)
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    pub fn secrets(&self) -> &S {
        &self.secrets
    }

    /// Whether a removal that found `removed` should mark its namespace
    fn removal_marks(&self, removed: bool) -> bool {
        removed || self.removal == RemovalMode::Compat
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::prefs::MemoryPreferenceStore;
    use crate::secrets::MemorySecretStore;

    pub type TestStore = ConfigStore<MemoryPreferenceStore, MemorySecretStore>;

    pub const TARGET: &str = "iqn.2020-01.com.example:target0";
    pub const PORTAL: &str = "10.0.0.1:3260";

    pub fn store() -> TestStore {
        ConfigStore::new(MemoryPreferenceStore::new(), MemorySecretStore::new())
    }

    /// A second store over the same preferences and secrets
    pub fn sibling(store: &TestStore) -> TestStore {
        ConfigStore::new(store.prefs().handle(), store.secrets().clone())
    }
}
