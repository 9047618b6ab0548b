//! Session and connection parameters
//!
//! Numeric parameters are stored as decimal strings; values outside the
//! ranges RFC 3720 allows are rejected on decode.

use super::{parse_field, NodeCodec};
use crate::node::Node;
use std::fmt;

const KEY_ERROR_RECOVERY_LEVEL: &str = "Error Recovery Level";
const KEY_MAX_CONNECTIONS: &str = "Maximum Connections";
const KEY_TPGT: &str = "Target Portal Group Tag";

const KEY_HEADER_DIGEST: &str = "Header Digest";
const KEY_DATA_DIGEST: &str = "Data Digest";

/// Highest ErrorRecoveryLevel defined by RFC 3720
const MAX_ERROR_RECOVERY_LEVEL: u8 = 2;

/// Per-target session parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub error_recovery_level: u8,
    pub max_connections: u32,
    pub target_portal_group_tag: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            error_recovery_level: 0,
            max_connections: 1,
            target_portal_group_tag: 0,
        }
    }
}

impl NodeCodec for SessionConfig {
    fn to_node(&self) -> Node {
        [
            (
                KEY_ERROR_RECOVERY_LEVEL,
                Node::from(self.error_recovery_level.to_string()),
            ),
            (KEY_MAX_CONNECTIONS, Node::from(self.max_connections.to_string())),
            (KEY_TPGT, Node::from(self.target_portal_group_tag.to_string())),
        ]
        .into_iter()
        .collect()
    }

    fn from_node(node: &Node) -> Option<Self> {
        let defaults = Self::default();
        let error_recovery_level = parse_field(node, KEY_ERROR_RECOVERY_LEVEL)?;
        let max_connections = parse_field(node, KEY_MAX_CONNECTIONS)?;

        if error_recovery_level > MAX_ERROR_RECOVERY_LEVEL || max_connections == 0 {
            return None;
        }

        Some(Self {
            error_recovery_level,
            max_connections,
            target_portal_group_tag: parse_field(node, KEY_TPGT)
                .unwrap_or(defaults.target_portal_group_tag),
        })
    }
}

/// Digest applied to PDU headers or data segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Digest {
    #[default]
    None,
    Crc32c,
}

impl Digest {
    pub fn as_str(&self) -> &'static str {
        match self {
            Digest::None => "None",
            Digest::Crc32c => "CRC32C",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "None" => Some(Digest::None),
            "CRC32C" => Some(Digest::Crc32c),
            _ => None,
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-portal connection parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionConfig {
    pub header_digest: Digest,
    pub data_digest: Digest,
}

impl NodeCodec for ConnectionConfig {
    fn to_node(&self) -> Node {
        [
            (KEY_HEADER_DIGEST, Node::from(self.header_digest.as_str())),
            (KEY_DATA_DIGEST, Node::from(self.data_digest.as_str())),
        ]
        .into_iter()
        .collect()
    }

    fn from_node(node: &Node) -> Option<Self> {
        Some(Self {
            header_digest: Digest::parse(node.get_str(KEY_HEADER_DIGEST)?)?,
            data_digest: Digest::parse(node.get_str(KEY_DATA_DIGEST)?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_defaults_survive_encoding() {
        let config = SessionConfig::default();
        let node = config.to_node();
        assert_eq!(node.get_str("Maximum Connections"), Some("1"));
        assert_eq!(SessionConfig::from_node(&node), Some(config));
    }

    #[test]
    fn test_session_out_of_range_rejected() {
        let node: Node = [
            ("Error Recovery Level", Node::from("3")),
            ("Maximum Connections", Node::from("1")),
        ]
        .into_iter()
        .collect();
        assert!(SessionConfig::from_node(&node).is_none());

        let node: Node = [
            ("Error Recovery Level", Node::from("0")),
            ("Maximum Connections", Node::from("0")),
        ]
        .into_iter()
        .collect();
        assert!(SessionConfig::from_node(&node).is_none());
    }

    #[test]
    fn test_session_missing_tpgt_defaults() {
        let node: Node = [
            ("Error Recovery Level", Node::from("1")),
            ("Maximum Connections", Node::from("4")),
        ]
        .into_iter()
        .collect();
        let config = SessionConfig::from_node(&node).unwrap();
        assert_eq!(config.error_recovery_level, 1);
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.target_portal_group_tag, 0);
    }

    #[test]
    fn test_connection_digest_values() {
        let config = ConnectionConfig {
            header_digest: Digest::Crc32c,
            data_digest: Digest::None,
        };
        let node = config.to_node();
        assert_eq!(node.get_str("Header Digest"), Some("CRC32C"));
        assert_eq!(ConnectionConfig::from_node(&node), Some(config));
        assert!(ConnectionConfig::from_node(&Node::empty()).is_none());
    }
}
