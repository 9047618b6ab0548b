//! In-memory configuration cache
//!
//! Three independent namespaces, each either absent (never loaded) or a
//! materialized value, paired with a flag recording local modification.

pub mod records;
pub mod tree;

pub use records::{InitiatorRecord, PortalMap, PortalRecord, TargetNodes, TargetRecord};

use crate::node::Dict;
use std::fmt;

/// One independently cached and synchronized configuration domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Targets,
    Discovery,
    Initiator,
}

impl Namespace {
    /// Order in which namespaces are flushed and reloaded
    pub const SYNC_ORDER: [Namespace; 3] =
        [Namespace::Targets, Namespace::Initiator, Namespace::Discovery];

    /// Preference key holding this namespace
    pub fn key(&self) -> &'static str {
        match self {
            Namespace::Targets => "Target Nodes",
            Namespace::Discovery => "SendTargets Discovery",
            Namespace::Initiator => "Initiator Node",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Cached value of one namespace plus its modified flag
#[derive(Debug, Default)]
pub struct NamespaceCache<T> {
    value: Option<T>,
    modified: bool,
}

impl<T> NamespaceCache<T> {
    /// Cached value, materializing an empty one when `create` is set.
    /// Materializing does not mark the namespace modified.
    pub fn get(&mut self, create: bool) -> Option<&mut T>
    where
        T: Default,
    {
        tree::resolve_slot(&mut self.value, create, T::default).0
    }

    /// Cached value without materializing
    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    pub(crate) fn clear_modified(&mut self) {
        self.modified = false;
    }

    /// Replace the cached value wholesale without touching the flag
    pub(crate) fn replace(&mut self, value: Option<T>) {
        self.value = value;
    }

    /// Split borrow of the value slot and the flag
    pub(crate) fn parts_mut(&mut self) -> (&mut Option<T>, &mut bool) {
        (&mut self.value, &mut self.modified)
    }
}

/// The three namespace caches
#[derive(Debug, Default)]
pub struct ConfigCache {
    pub targets: NamespaceCache<TargetNodes>,
    pub discovery: NamespaceCache<Dict>,
    pub initiator: NamespaceCache<InitiatorRecord>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_modified(&self, namespace: Namespace) -> bool {
        match namespace {
            Namespace::Targets => self.targets.is_modified(),
            Namespace::Discovery => self.discovery.is_modified(),
            Namespace::Initiator => self.initiator.is_modified(),
        }
    }

    pub fn is_present(&self, namespace: Namespace) -> bool {
        match namespace {
            Namespace::Targets => self.targets.is_present(),
            Namespace::Discovery => self.discovery.is_present(),
            Namespace::Initiator => self.initiator.is_present(),
        }
    }

    pub(crate) fn clear_modified(&mut self) {
        self.targets.clear_modified();
        self.discovery.clear_modified();
        self.initiator.clear_modified();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_does_not_mark_modified() {
        let mut cache = ConfigCache::new();
        assert!(cache.targets.get(false).is_none());
        assert!(!cache.is_present(Namespace::Targets));

        assert!(cache.targets.get(true).unwrap().is_empty());
        assert!(cache.is_present(Namespace::Targets));
        assert!(!cache.is_modified(Namespace::Targets));
    }

    #[test]
    fn test_materialized_initiator_is_blank() {
        let mut cache = ConfigCache::new();
        let initiator = cache.initiator.get(true).unwrap();
        assert_eq!(initiator.name, "");
        assert_eq!(initiator.alias, "");
    }

    #[test]
    fn test_clear_modified_resets_all() {
        let mut cache = ConfigCache::new();
        cache.targets.mark_modified();
        cache.discovery.mark_modified();
        cache.initiator.mark_modified();

        cache.clear_modified();
        for namespace in Namespace::SYNC_ORDER {
            assert!(!cache.is_modified(namespace));
        }
    }

    #[test]
    fn test_namespace_keys() {
        assert_eq!(Namespace::Targets.key(), "Target Nodes");
        assert_eq!(Namespace::Discovery.key(), "SendTargets Discovery");
        assert_eq!(Namespace::Initiator.key(), "Initiator Node");
    }
}
