//! Target and portal accessors
//!
//! Navigation is Targets -> target -> Portals -> portal. Lookups that pass
//! `create` build any missing level on the way down and mark the targets
//! namespace modified when they insert something.

use super::ConfigStore;
use crate::cache::{tree, PortalMap, PortalRecord, TargetNodes, TargetRecord};
use crate::model::{ConnectionConfig, NodeCodec, Portal, SessionConfig, Target};
use crate::prefs::PreferenceStore;
use crate::secrets::SecretStore;

fn target_in<'a>(
    nodes: &'a mut Option<TargetNodes>,
    modified: &mut bool,
    name: &str,
    create: bool,
) -> Option<&'a mut TargetRecord> {
    let nodes = tree::resolve_slot(nodes, create, TargetNodes::new).0?;
    let (record, created) = tree::resolve(nodes, name, create, TargetRecord::default);
    *modified |= created;
    record
}

fn portals_in<'a>(
    nodes: &'a mut Option<TargetNodes>,
    modified: &mut bool,
    name: &str,
    create: bool,
) -> Option<&'a mut PortalMap> {
    let record = target_in(nodes, modified, name, create)?;
    let (portals, created) = tree::resolve_slot(&mut record.portals, create, PortalMap::new);
    *modified |= created;
    portals
}

fn portal_in<'a>(
    nodes: &'a mut Option<TargetNodes>,
    modified: &mut bool,
    name: &str,
    address: &str,
    create: bool,
) -> Option<&'a mut PortalRecord> {
    let portals = portals_in(nodes, modified, name, create)?;
    let (portal, created) = tree::resolve(portals, address, create, PortalRecord::default);
    *modified |= created;
    portal
}

/// Sorted keys, or `None` for an empty mapping
fn sorted_keys<V>(map: &std::collections::BTreeMap<String, V>) -> Option<Vec<String>> {
    if map.is_empty() {
        return None;
    }
    Some(map.keys().cloned().collect())
}

impl<P: PreferenceStore, S: SecretStore> ConfigStore<P, S> {
    pub(super) fn target_entry(&mut self, name: &str, create: bool) -> Option<&mut TargetRecord> {
        let (nodes, modified) = self.cache.targets.parts_mut();
        target_in(nodes, modified, name, create)
    }

    fn portals_entry(&mut self, target: &str, create: bool) -> Option<&mut PortalMap> {
        let (nodes, modified) = self.cache.targets.parts_mut();
        portals_in(nodes, modified, target, create)
    }

    fn portal_entry(
        &mut self,
        target: &str,
        address: &str,
        create: bool,
    ) -> Option<&mut PortalRecord> {
        let (nodes, modified) = self.cache.targets.parts_mut();
        portal_in(nodes, modified, target, address, create)
    }

    pub(super) fn find_target(&self, name: &str) -> Option<&TargetRecord> {
        self.cache.targets.peek()?.get(name)
    }

    fn find_portal(&self, target: &str, address: &str) -> Option<&PortalRecord> {
        self.find_target(target)?.portals.as_ref()?.get(address)
    }

    /// Root of the targets namespace. Materializing it does not mark the
    /// namespace modified.
    pub fn targets(&mut self, create: bool) -> Option<&TargetNodes> {
        self.cache.targets.get(create).map(|nodes| &*nodes)
    }

    /// Record for a target, created empty when missing and `create` is set
    pub fn target(&mut self, name: &str, create: bool) -> Option<&TargetRecord> {
        self.target_entry(name, create).map(|record| &*record)
    }

    /// Portal mapping of a target, created empty when missing and `create`
    /// is set
    pub fn portals(&mut self, target: &str, create: bool) -> Option<&PortalMap> {
        self.portals_entry(target, create).map(|portals| &*portals)
    }

    /// Record for a portal, created with placeholder leaves when missing and
    /// `create` is set
    pub fn portal(&mut self, target: &str, address: &str, create: bool) -> Option<&PortalRecord> {
        self.portal_entry(target, address, create)
            .map(|record| &*record)
    }

    /// Remove a target and everything under it
    pub fn remove_target(&mut self, name: &str) {
        let Some(nodes) = self.cache.targets.get(false) else {
            return;
        };
        let removed = nodes.remove(name).is_some();

        if self.removal_marks(removed) {
            self.cache.targets.mark_modified();
        }
        log::debug!("Remove target {} (present: {})", name, removed);
    }

    /// Remove one portal of a target
    pub fn remove_portal(&mut self, target: &str, address: &str) {
        let removed = match self.portals_entry(target, false) {
            Some(portals) => portals.remove(address).is_some(),
            None => return,
        };

        if self.removal_marks(removed) {
            self.cache.targets.mark_modified();
        }
        log::debug!("Remove portal {} of {} (present: {})", address, target, removed);
    }

    pub fn session_config(&self, target: &str) -> Option<SessionConfig> {
        self.find_target(target)?
            .session_config
            .as_ref()
            .and_then(SessionConfig::from_node)
    }

    pub fn set_session_config(&mut self, target: &str, config: &SessionConfig) {
        let node = config.to_node();
        if let Some(record) = self.target_entry(target, true) {
            record.session_config = Some(node);
        }
        self.cache.targets.mark_modified();
    }

    pub fn connection_config(&self, target: &str, address: &str) -> Option<ConnectionConfig> {
        ConnectionConfig::from_node(&self.find_portal(target, address)?.connection_config)
    }

    pub fn set_connection_config(&mut self, target: &str, address: &str, config: &ConnectionConfig) {
        let node = config.to_node();
        if let Some(record) = self.portal_entry(target, address, true) {
            record.connection_config = node;
        }
        self.cache.targets.mark_modified();
    }

    /// Address data of a portal
    pub fn portal_data(&self, target: &str, address: &str) -> Option<Portal> {
        Portal::from_node(&self.find_portal(target, address)?.portal_data)
    }

    /// Store a portal for a target, keyed by its address
    pub fn set_portal(&mut self, target: &str, portal: &Portal) {
        let node = portal.to_node();
        if let Some(record) = self.portal_entry(target, &portal.address, true) {
            record.portal_data = node;
        }
        self.cache.targets.mark_modified();
    }

    /// Domain data of a target
    pub fn target_data(&self, name: &str) -> Option<Target> {
        self.find_target(name)?
            .target_data
            .as_ref()
            .and_then(Target::from_node)
    }

    /// Store a target, keyed by its qualified name
    pub fn set_target(&mut self, target: &Target) {
        let node = target.to_node();
        if let Some(record) = self.target_entry(&target.name, true) {
            record.target_data = Some(node);
        }
        self.cache.targets.mark_modified();
    }

    /// Qualified names of all configured targets, `None` if there are none
    pub fn target_names(&self) -> Option<Vec<String>> {
        sorted_keys(self.cache.targets.peek()?)
    }

    /// Addresses of all portals of a target, `None` if there are none
    pub fn portal_addresses(&self, target: &str) -> Option<Vec<String>> {
        sorted_keys(self.find_target(target)?.portals.as_ref()?)
    }

    pub fn contains_target(&self, name: &str) -> bool {
        self.find_target(name).is_some()
    }

    pub fn contains_portal(&self, target: &str, address: &str) -> bool {
        self.find_portal(target, address).is_some()
    }
}
