//! Cache reconciliation
//!
//! Modified namespaces overwrite what preferences hold; unmodified ones are
//! reloaded so they pick up changes made by other processes. There is no
//! merging: the last writer of a namespace wins.

use super::ConfigStore;
use crate::cache::{Namespace, NamespaceCache};
use crate::model::NodeCodec;
use crate::prefs::{PreferenceStore, PrefsResult};
use crate::secrets::SecretStore;

/// Stage the cached value of a namespace; an absent cache removes the key
fn flush<T: NodeCodec, P: PreferenceStore>(
    cache: &NamespaceCache<T>,
    prefs: &mut P,
    namespace: Namespace,
) -> PrefsResult<()> {
    log::debug!("Writing {} to preferences", namespace);
    prefs.set_value(namespace.key(), cache.peek().map(T::to_node))
}

/// Replace the cached value of a namespace with a fresh copy from
/// preferences. On a read error the current cache is kept.
fn reload<T: NodeCodec, P: PreferenceStore>(
    cache: &mut NamespaceCache<T>,
    prefs: &P,
    namespace: Namespace,
) {
    match prefs.copy_value(namespace.key()) {
        Ok(Some(node)) => {
            let value = T::from_node(&node);
            if value.is_none() {
                log::warn!("Ignoring malformed preference value for {}", namespace);
            } else {
                log::debug!("Reloaded {} from preferences", namespace);
            }
            cache.replace(value);
        }
        Ok(None) => cache.replace(None),
        Err(e) => {
            log::warn!("Failed to reload {}, keeping cached copy: {}", namespace, e);
        }
    }
}

impl<P: PreferenceStore, S: SecretStore> ConfigStore<P, S> {
    fn flush_namespace(&mut self, namespace: Namespace) -> PrefsResult<()> {
        match namespace {
            Namespace::Targets => flush(&self.cache.targets, &mut self.prefs, namespace),
            Namespace::Discovery => flush(&self.cache.discovery, &mut self.prefs, namespace),
            Namespace::Initiator => flush(&self.cache.initiator, &mut self.prefs, namespace),
        }
    }

    fn reload_namespace(&mut self, namespace: Namespace) {
        match namespace {
            Namespace::Targets => reload(&mut self.cache.targets, &self.prefs, namespace),
            Namespace::Discovery => reload(&mut self.cache.discovery, &self.prefs, namespace),
            Namespace::Initiator => reload(&mut self.cache.initiator, &self.prefs, namespace),
        }
    }

    /// Reconcile the caches with preferences.
    ///
    /// Modified namespaces are written and committed in one batch. The
    /// others are then reloaded, and all modified flags are cleared. If a
    /// write or the commit fails the error is returned with the flags left
    /// set; writes staged before the failure are not undone.
    pub fn synchronize(&mut self) -> PrefsResult<()> {
        let modified: Vec<Namespace> = Namespace::SYNC_ORDER
            .into_iter()
            .filter(|ns| self.cache.is_modified(*ns))
            .collect();

        for namespace in &modified {
            self.flush_namespace(*namespace)?;
        }
        self.prefs.synchronize()?;

        for namespace in Namespace::SYNC_ORDER {
            if !modified.contains(&namespace) {
                self.reload_namespace(namespace);
            }
        }

        self.cache.clear_modified();
        log::debug!("Synchronized preferences ({} namespace(s) written)", modified.len());
        Ok(())
    }
}
