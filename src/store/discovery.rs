//! SendTargets discovery overlay
//!
//! Discovery records are merged key by key into one persistent mapping, so
//! the overlay holds the union of everything discovered so far.

use super::ConfigStore;
use crate::model::{DiscoveryRecord, NodeCodec};
use crate::node::Node;
use crate::prefs::PreferenceStore;
use crate::secrets::SecretStore;

impl<P: PreferenceStore, S: SecretStore> ConfigStore<P, S> {
    /// Merge a discovery record into the overlay. Top-level keys already
    /// present are replaced by the record's values.
    pub fn add_discovery_record(&mut self, record: &DiscoveryRecord) {
        let Node::Dict(entries) = record.to_node() else {
            return;
        };

        if let Some(overlay) = self.cache.discovery.get(true) {
            overlay.extend(entries);
        }
        self.cache.discovery.mark_modified();
    }

    /// Decoded copy of the overlay, `None` if there is none
    pub fn copy_discovery_record(&self) -> Option<DiscoveryRecord> {
        let overlay = self.cache.discovery.peek()?;
        DiscoveryRecord::from_node(&overlay.to_node())
    }

    /// Drop the overlay entirely
    pub fn clear_discovery_record(&mut self) {
        self.cache.discovery.replace(None);
        self.cache.discovery.mark_modified();
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::store;
    use crate::cache::Namespace;
    use crate::model::{DiscoveryRecord, Portal};

    fn record(entries: &[(&str, &str)]) -> DiscoveryRecord {
        let mut record = DiscoveryRecord::new();
        for (target, address) in entries {
            record.add_portal(target, "1", Portal::new(*address));
        }
        record
    }

    #[test]
    fn test_merge_overwrites_on_collision() {
        let mut store = store();
        store.add_discovery_record(&record(&[("a", "10.0.0.1"), ("b", "10.0.0.2")]));
        store.add_discovery_record(&record(&[("b", "10.0.0.3"), ("c", "10.0.0.4")]));

        let merged = store.copy_discovery_record().unwrap();
        assert_eq!(merged.target_names(), vec!["a", "b", "c"]);
        assert_eq!(merged.portals("a")[0].address, "10.0.0.1");
        assert_eq!(merged.portals("b").len(), 1);
        assert_eq!(merged.portals("b")[0].address, "10.0.0.3");
        assert_eq!(merged.portals("c")[0].address, "10.0.0.4");
        assert!(store.is_modified(Namespace::Discovery));
    }

    #[test]
    fn test_copy_without_overlay() {
        let store = store();
        assert!(store.copy_discovery_record().is_none());
    }

    #[test]
    fn test_clear_discards_overlay() {
        let mut store = store();
        store.add_discovery_record(&record(&[("a", "10.0.0.1")]));
        store.synchronize().unwrap();
        assert!(!store.is_modified(Namespace::Discovery));

        store.clear_discovery_record();
        assert!(store.copy_discovery_record().is_none());
        assert!(store.is_modified(Namespace::Discovery));
    }
}
