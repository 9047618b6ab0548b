//! Network portals

use super::NodeCodec;
use crate::node::Node;

/// Well-known iSCSI port
pub const DEFAULT_PORT: &str = "3260";

const KEY_ADDRESS: &str = "Address";
const KEY_PORT: &str = "Port";
const KEY_HOST_INTERFACE: &str = "Host Interface";

/// Address through which a target is reachable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portal {
    /// Host name or IP address; also the portal's key under its target
    pub address: String,

    /// TCP port
    pub port: String,

    /// Local interface to bind, empty for the default route
    pub host_interface: String,
}

impl Portal {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: DEFAULT_PORT.to_string(),
            host_interface: String::new(),
        }
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    pub fn with_host_interface(mut self, interface: impl Into<String>) -> Self {
        self.host_interface = interface.into();
        self
    }
}

impl NodeCodec for Portal {
    fn to_node(&self) -> Node {
        [
            (KEY_ADDRESS, Node::from(self.address.as_str())),
            (KEY_PORT, Node::from(self.port.as_str())),
            (KEY_HOST_INTERFACE, Node::from(self.host_interface.as_str())),
        ]
        .into_iter()
        .collect()
    }

    fn from_node(node: &Node) -> Option<Self> {
        let address = node.get_str(KEY_ADDRESS).filter(|a| !a.is_empty())?;
        let port = node
            .get_str(KEY_PORT)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PORT);

        Some(Self {
            address: address.to_string(),
            port: port.to_string(),
            host_interface: node.get_str(KEY_HOST_INTERFACE).unwrap_or("").to_string(),
        })
    }
}
