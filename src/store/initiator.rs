//! Initiator identity accessors

use super::ConfigStore;
use crate::cache::InitiatorRecord;
use crate::prefs::PreferenceStore;
use crate::secrets::SecretStore;

impl<P: PreferenceStore, S: SecretStore> ConfigStore<P, S> {
    /// Initiator record, materialized with a blank name and alias when
    /// `create` is set. Materializing does not mark the namespace modified.
    pub fn initiator(&mut self, create: bool) -> Option<&InitiatorRecord> {
        self.cache.initiator.get(create).map(|record| &*record)
    }

    /// Qualified name of the initiator, `None` until the namespace is loaded
    pub fn initiator_name(&self) -> Option<String> {
        self.cache.initiator.peek().map(|record| record.name.clone())
    }

    pub fn set_initiator_name(&mut self, name: &str) {
        if let Some(record) = self.cache.initiator.get(true) {
            record.name = name.to_string();
        }
        self.cache.initiator.mark_modified();
    }

    /// Alias of the initiator, `None` until the namespace is loaded
    pub fn initiator_alias(&self) -> Option<String> {
        self.cache.initiator.peek().map(|record| record.alias.clone())
    }

    pub fn set_initiator_alias(&mut self, alias: &str) {
        if let Some(record) = self.cache.initiator.get(true) {
            record.alias = alias.to_string();
        }
        self.cache.initiator.mark_modified();
    }
}
