//! Generic nested value tree
//!
//! Every preference key holds a `Node`: either a string scalar or a
//! string-keyed mapping of further nodes. Typed records and domain objects
//! are converted to and from this shape at the persistence boundary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String-keyed mapping of nodes
pub type Dict = BTreeMap<String, Node>;

/// A scalar string or a mapping of nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Value(String),
    Dict(Dict),
}

impl Node {
    /// Empty scalar, used as a placeholder for leaves not yet written
    pub fn empty() -> Self {
        Node::Value(String::new())
    }

    /// Empty mapping
    pub fn dict() -> Self {
        Node::Dict(Dict::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Value(s) => Some(s),
            Node::Dict(_) => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Node::Dict(d) => Some(d),
            Node::Value(_) => None,
        }
    }

    /// Look up a child of a mapping node
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_dict().and_then(|d| d.get(key))
    }

    /// Look up a scalar child of a mapping node
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_str)
    }

    /// True for an empty scalar or an empty mapping
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Value(s) => s.is_empty(),
            Node::Dict(d) => d.is_empty(),
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::empty()
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Value(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Value(s)
    }
}

impl From<Dict> for Node {
    fn from(d: Dict) -> Self {
        Node::Dict(d)
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Node {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        Node::Dict(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
