//! Typed records held in the namespace caches
//!
//! These mirror the on-disk layout of the "Target Nodes" and
//! "Initiator Node" preference keys. Keys this crate does not know about
//! are carried through untouched.

use crate::model::{AuthMethod, NodeCodec};
use crate::node::{Dict, Node};
use std::collections::BTreeMap;

pub const KEY_TARGET_DATA: &str = "Target Data";
pub const KEY_SESSION_CONFIG: &str = "Session Configuration";
pub const KEY_PORTALS: &str = "Portals";
pub const KEY_PORTAL_DATA: &str = "Portal Data";
pub const KEY_CONNECTION_CONFIG: &str = "Connection Configuration";
pub const KEY_AUTHENTICATION: &str = "Authentication";
pub const KEY_INITIATOR_NAME: &str = "Name";
pub const KEY_INITIATOR_ALIAS: &str = "Alias";

/// All configured targets, keyed by qualified name
pub type TargetNodes = BTreeMap<String, TargetRecord>;

/// Portals of one target, keyed by address
pub type PortalMap = BTreeMap<String, PortalRecord>;

/// Configuration stored for one target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetRecord {
    /// Encoded `Target`
    pub target_data: Option<Node>,

    /// Encoded `SessionConfig`
    pub session_config: Option<Node>,

    /// Authentication tag exactly as stored
    pub authentication: Option<String>,

    /// Portals, absent until the first portal lookup that creates
    pub portals: Option<PortalMap>,

    /// Unrecognized keys
    pub other: Dict,
}

/// Configuration stored for one portal of a target
///
/// A fresh portal carries empty placeholders for all three leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalRecord {
    /// Encoded `Portal`
    pub portal_data: Node,

    /// Encoded `ConnectionConfig`
    pub connection_config: Node,

    /// Authentication tag exactly as stored
    pub authentication: Option<String>,

    /// Unrecognized keys
    pub other: Dict,
}

/// Identity of the local initiator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitiatorRecord {
    /// Qualified name, empty until configured
    pub name: String,

    /// Alias, empty until configured
    pub alias: String,

    /// Authentication tag exactly as stored
    pub authentication: Option<String>,

    /// Unrecognized keys
    pub other: Dict,
}

impl TargetRecord {
    /// Known authentication method, `None` for a missing or unknown tag
    pub fn auth_method(&self) -> Option<AuthMethod> {
        self.authentication.as_deref().and_then(AuthMethod::parse)
    }
}

impl InitiatorRecord {
    /// Known authentication method, `None` for a missing or unknown tag
    pub fn auth_method(&self) -> Option<AuthMethod> {
        self.authentication.as_deref().and_then(AuthMethod::parse)
    }
}

/// Keys of `dict` outside `known`
fn unknown_keys(dict: &Dict, known: &[&str]) -> Dict {
    dict.iter()
        .filter(|(k, _)| !known.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Scalar authentication tag of `dict`. A non-scalar value is not a tag and
/// is kept in `other` instead.
fn take_auth_tag(dict: &Dict, other: &mut Dict) -> Option<String> {
    let node = dict.get(KEY_AUTHENTICATION)?;
    match node.as_str() {
        Some(tag) => Some(tag.to_string()),
        None => {
            other.insert(KEY_AUTHENTICATION.to_string(), node.clone());
            None
        }
    }
}

impl NodeCodec for TargetRecord {
    fn to_node(&self) -> Node {
        let mut dict = self.other.clone();
        if let Some(ref data) = self.target_data {
            dict.insert(KEY_TARGET_DATA.to_string(), data.clone());
        }
        if let Some(ref config) = self.session_config {
            dict.insert(KEY_SESSION_CONFIG.to_string(), config.clone());
        }
        if let Some(ref tag) = self.authentication {
            dict.insert(KEY_AUTHENTICATION.to_string(), Node::from(tag.as_str()));
        }
        if let Some(ref portals) = self.portals {
            dict.insert(KEY_PORTALS.to_string(), portals.to_node());
        }
        Node::Dict(dict)
    }

    fn from_node(node: &Node) -> Option<Self> {
        let dict = node.as_dict()?;
        let mut other = unknown_keys(
            dict,
            &[
                KEY_TARGET_DATA,
                KEY_SESSION_CONFIG,
                KEY_AUTHENTICATION,
                KEY_PORTALS,
            ],
        );
        let authentication = take_auth_tag(dict, &mut other);

        Some(Self {
            target_data: dict.get(KEY_TARGET_DATA).cloned(),
            session_config: dict.get(KEY_SESSION_CONFIG).cloned(),
            authentication,
            portals: dict.get(KEY_PORTALS).and_then(PortalMap::from_node),
            other,
        })
    }
}

impl NodeCodec for PortalRecord {
    fn to_node(&self) -> Node {
        let mut dict = self.other.clone();
        dict.insert(KEY_PORTAL_DATA.to_string(), self.portal_data.clone());
        dict.insert(
            KEY_CONNECTION_CONFIG.to_string(),
            self.connection_config.clone(),
        );
        match self.authentication {
            Some(ref tag) => {
                dict.insert(KEY_AUTHENTICATION.to_string(), Node::from(tag.as_str()));
            }
            None => {
                dict.entry(KEY_AUTHENTICATION.to_string())
                    .or_insert_with(Node::empty);
            }
        }
        Node::Dict(dict)
    }

    fn from_node(node: &Node) -> Option<Self> {
        let dict = node.as_dict()?;
        let mut other = unknown_keys(
            dict,
            &[KEY_PORTAL_DATA, KEY_CONNECTION_CONFIG, KEY_AUTHENTICATION],
        );
        let authentication = take_auth_tag(dict, &mut other);

        Some(Self {
            portal_data: dict.get(KEY_PORTAL_DATA).cloned().unwrap_or_default(),
            connection_config: dict.get(KEY_CONNECTION_CONFIG).cloned().unwrap_or_default(),
            authentication,
            other,
        })
    }
}

impl NodeCodec for InitiatorRecord {
    fn to_node(&self) -> Node {
        let mut dict = self.other.clone();
        dict.insert(KEY_INITIATOR_NAME.to_string(), Node::from(self.name.as_str()));
        dict.insert(KEY_INITIATOR_ALIAS.to_string(), Node::from(self.alias.as_str()));
        if let Some(ref tag) = self.authentication {
            dict.insert(KEY_AUTHENTICATION.to_string(), Node::from(tag.as_str()));
        }
        Node::Dict(dict)
    }

    fn from_node(node: &Node) -> Option<Self> {
        let dict = node.as_dict()?;
        let mut other = unknown_keys(
            dict,
            &[KEY_INITIATOR_NAME, KEY_INITIATOR_ALIAS, KEY_AUTHENTICATION],
        );
        let authentication = take_auth_tag(dict, &mut other);

        Some(Self {
            name: node.get_str(KEY_INITIATOR_NAME).unwrap_or("").to_string(),
            alias: node.get_str(KEY_INITIATOR_ALIAS).unwrap_or("").to_string(),
            authentication,
            other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_portal_has_placeholder_leaves() {
        let node = PortalRecord::default().to_node();
        let dict = node.as_dict().unwrap();

        assert_eq!(dict.len(), 3);
        for key in [KEY_AUTHENTICATION, KEY_CONNECTION_CONFIG, KEY_PORTAL_DATA] {
            assert_eq!(dict.get(key), Some(&Node::empty()));
        }
    }

    #[test]
    fn test_fresh_target_has_no_keys() {
        assert_eq!(TargetRecord::default().to_node(), Node::dict());
    }

    #[test]
    fn test_target_record_keeps_unknown_keys() {
        let json = r#"{
            "Target Data": {"Name": "iqn.a"},
            "Authentication": "CHAP",
            "Portals": {"10.0.0.1": {"Portal Data": "", "Connection Configuration": "", "Authentication": ""}},
            "Vendor Extension": "x"
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let record = TargetRecord::from_node(&node).unwrap();

        assert_eq!(record.auth_method(), Some(AuthMethod::Chap));
        assert_eq!(record.portals.as_ref().unwrap().len(), 1);
        assert_eq!(record.other.get("Vendor Extension"), Some(&Node::from("x")));
        assert_eq!(record.to_node(), node);
    }

    #[test]
    fn test_initiator_defaults_for_missing_fields() {
        let record = InitiatorRecord::from_node(&Node::dict()).unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.alias, "");
        assert!(record.authentication.is_none());

        let node = record.to_node();
        assert_eq!(node.get_str("Name"), Some(""));
        assert_eq!(node.get_str("Alias"), Some(""));
        assert!(node.get("Authentication").is_none());
    }

    #[test]
    fn test_scalar_is_not_a_record() {
        assert!(TargetRecord::from_node(&Node::from("x")).is_none());
        assert!(InitiatorRecord::from_node(&Node::empty()).is_none());
    }

    #[test]
    fn test_unknown_auth_tag_and_portal_keys_survive_rewrite() {
        let json = r#"{
            "Authentication": "SRP",
            "Portals": {"10.0.0.1": {
                "Portal Data": "",
                "Connection Configuration": "",
                "Authentication": "",
                "Vendor": "x"
            }}
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let record = TargetRecord::from_node(&node).unwrap();

        assert_eq!(record.authentication.as_deref(), Some("SRP"));
        assert!(record.auth_method().is_none());
        let portal = &record.portals.as_ref().unwrap()["10.0.0.1"];
        assert_eq!(portal.other.get("Vendor"), Some(&Node::from("x")));
        assert_eq!(record.to_node(), node);
    }

    #[test]
    fn test_non_scalar_auth_kept_as_unknown_key() {
        let json = r#"{"Name": "iqn.host", "Alias": "", "Authentication": {"Method": "CHAP"}}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let record = InitiatorRecord::from_node(&node).unwrap();

        assert!(record.authentication.is_none());
        assert!(record.other.contains_key("Authentication"));
        assert_eq!(record.to_node(), node);
    }
}
