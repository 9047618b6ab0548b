//! SendTargets discovery results
//!
//! A record maps each discovered target name to its portal groups, and each
//! portal group tag to the portals in that group keyed by address. The
//! encoding keeps this nesting so that merging records into the persistent
//! overlay replaces whole targets.

use super::{NodeCodec, Portal};
use crate::node::{Dict, Node};
use std::collections::BTreeMap;

/// Portals of one portal group, keyed by address
pub type PortalGroup = BTreeMap<String, Portal>;

/// Result set of one or more discovery sessions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryRecord {
    targets: BTreeMap<String, BTreeMap<String, PortalGroup>>,
}

impl DiscoveryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a target with no portals yet
    pub fn add_target(&mut self, target: &str) {
        self.targets.entry(target.to_string()).or_default();
    }

    /// Record a portal for a target within a portal group
    pub fn add_portal(&mut self, target: &str, portal_group_tag: &str, portal: Portal) {
        self.targets
            .entry(target.to_string())
            .or_default()
            .entry(portal_group_tag.to_string())
            .or_default()
            .insert(portal.address.clone(), portal);
    }

    /// Discovered target names in sorted order
    pub fn target_names(&self) -> Vec<String> {
        self.targets.keys().cloned().collect()
    }

    /// Portal groups for a target
    pub fn portal_groups(&self, target: &str) -> Option<&BTreeMap<String, PortalGroup>> {
        self.targets.get(target)
    }

    /// All portals for a target across its groups
    pub fn portals(&self, target: &str) -> Vec<&Portal> {
        self.targets
            .get(target)
            .map(|groups| groups.values().flat_map(|g| g.values()).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl NodeCodec for DiscoveryRecord {
    fn to_node(&self) -> Node {
        self.targets
            .iter()
            .map(|(target, groups)| {
                let groups: Node = groups
                    .iter()
                    .map(|(tag, portals)| {
                        let portals: Node = portals
                            .iter()
                            .map(|(address, portal)| (address.clone(), portal.to_node()))
                            .collect();
                        (tag.clone(), portals)
                    })
                    .collect();
                (target.clone(), groups)
            })
            .collect()
    }

    /// Entries that do not have the expected nesting are skipped.
    fn from_node(node: &Node) -> Option<Self> {
        let mut record = Self::new();

        for (target, groups) in node.as_dict()? {
            record.add_target(target);
            let Some(groups) = groups.as_dict() else {
                continue;
            };

            for (tag, portals) in groups {
                for portal in portals.as_dict().into_iter().flat_map(Dict::values) {
                    if let Some(portal) = Portal::from_node(portal) {
                        record.add_portal(target, tag, portal);
                    }
                }
            }
        }

        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_nests_by_target_and_group() {
        let mut record = DiscoveryRecord::new();
        record.add_portal("iqn.a", "1", Portal::new("10.0.0.1"));
        record.add_portal("iqn.a", "1", Portal::new("10.0.0.2"));
        record.add_target("iqn.b");

        let node = record.to_node();
        let group = node.get("iqn.a").and_then(|t| t.get("1")).unwrap();
        assert_eq!(group.as_dict().unwrap().len(), 2);
        assert!(node.get("iqn.b").unwrap().is_empty());

        assert_eq!(DiscoveryRecord::from_node(&node), Some(record));
    }

    #[test]
    fn test_portals_flattens_groups() {
        let mut record = DiscoveryRecord::new();
        record.add_portal("iqn.a", "1", Portal::new("10.0.0.1"));
        record.add_portal("iqn.a", "2", Portal::new("10.0.1.1"));

        assert_eq!(record.portals("iqn.a").len(), 2);
        assert!(record.portals("iqn.missing").is_empty());
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let node: Node = [
            ("iqn.a", Node::from("not a mapping")),
            (
                "iqn.b",
                [("1", [("x", Node::empty())].into_iter().collect::<Node>())]
                    .into_iter()
                    .collect(),
            ),
        ]
        .into_iter()
        .collect();

        let record = DiscoveryRecord::from_node(&node).unwrap();
        assert_eq!(record.target_names(), vec!["iqn.a", "iqn.b"]);
        assert!(record.portals("iqn.b").is_empty());
        assert!(DiscoveryRecord::from_node(&Node::empty()).is_none());
    }
}
