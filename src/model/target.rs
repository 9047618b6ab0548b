//! Target identity

use super::NodeCodec;
use crate::node::Node;

const KEY_NAME: &str = "Name";
const KEY_ALIAS: &str = "Alias";

/// A remote iSCSI target node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Qualified name (IQN or EUI)
    pub name: String,

    /// Optional human-readable alias
    pub alias: Option<String>,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl NodeCodec for Target {
    fn to_node(&self) -> Node {
        let mut dict = crate::node::Dict::new();
        dict.insert(KEY_NAME.to_string(), Node::from(self.name.as_str()));
        if let Some(ref alias) = self.alias {
            dict.insert(KEY_ALIAS.to_string(), Node::from(alias.as_str()));
        }
        Node::Dict(dict)
    }

    fn from_node(node: &Node) -> Option<Self> {
        let name = node.get_str(KEY_NAME)?;
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            alias: node
                .get_str(KEY_ALIAS)
                .filter(|a| !a.is_empty())
                .map(String::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_is_optional() {
        let target = Target::new("iqn.2020-01.com.example:target0");
        let node = target.to_node();
        assert!(node.get("Alias").is_none());
        assert_eq!(Target::from_node(&node), Some(target));
    }

    #[test]
    fn test_empty_name_rejected() {
        let node: Node = [("Name", Node::empty())].into_iter().collect();
        assert!(Target::from_node(&node).is_none());
        assert!(Target::from_node(&Node::empty()).is_none());
    }
}
