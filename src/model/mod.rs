//! Domain objects and their node codecs
//!
//! These are the values callers hand to the configuration store. Each one
//! converts to and from the generic `Node` shape stored in preferences.

mod auth;
mod discovery;
mod portal;
mod session;
mod target;

pub use auth::{Auth, AuthMethod, ChapSecret};
pub use discovery::{DiscoveryRecord, PortalGroup};
pub use portal::{Portal, DEFAULT_PORT};
pub use session::{ConnectionConfig, Digest, SessionConfig};
pub use target::Target;

use crate::node::Node;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Conversion between a typed value and its preference node
pub trait NodeCodec: Sized {
    /// Encode into a freshly built node
    fn to_node(&self) -> Node;

    /// Decode from a node, returning `None` if the shape does not match
    fn from_node(node: &Node) -> Option<Self>;
}

impl NodeCodec for Node {
    fn to_node(&self) -> Node {
        self.clone()
    }

    fn from_node(node: &Node) -> Option<Self> {
        Some(node.clone())
    }
}

/// Keyed collections encode as a mapping. Entries that do not decode are
/// dropped rather than failing the whole collection.
impl<T: NodeCodec> NodeCodec for BTreeMap<String, T> {
    fn to_node(&self) -> Node {
        self.iter().map(|(k, v)| (k.clone(), v.to_node())).collect()
    }

    fn from_node(node: &Node) -> Option<Self> {
        let map = node
            .as_dict()?
            .iter()
            .filter_map(|(k, v)| match T::from_node(v) {
                Some(value) => Some((k.clone(), value)),
                None => {
                    log::debug!("Skipping undecodable entry {:?}", k);
                    None
                }
            })
            .collect();
        Some(map)
    }
}

/// Parse a scalar child of a mapping node
fn parse_field<T: FromStr>(node: &Node, key: &str) -> Option<T> {
    node.get_str(key).and_then(|s| s.trim().parse().ok())
}
