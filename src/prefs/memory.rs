//! In-memory preference store
//!
//! Handles created with `handle()` share committed state, which lets tests
//! play the part of a second process writing the same preferences.

use super::{apply_staged, Document, PreferenceStore, PrefsError, PrefsResult, Staged};
use crate::node::Node;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared in-memory preference store
#[derive(Default)]
pub struct MemoryPreferenceStore {
    committed: Arc<Mutex<Document>>,
    staged: Staged,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Another handle onto the same committed state, with its own staging
    pub fn handle(&self) -> Self {
        Self {
            committed: Arc::clone(&self.committed),
            staged: Staged::new(),
        }
    }

    fn committed(&self) -> PrefsResult<MutexGuard<'_, Document>> {
        self.committed
            .lock()
            .map_err(|_| PrefsError::Backend("preference lock poisoned".to_string()))
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn copy_value(&self, key: &str) -> PrefsResult<Option<Node>> {
        if let Some(staged) = self.staged.get(key) {
            return Ok(staged.clone());
        }

        Ok(self.committed()?.get(key).cloned())
    }

    fn set_value(&mut self, key: &str, value: Option<Node>) -> PrefsResult<()> {
        self.staged.insert(key.to_string(), value);
        Ok(())
    }

    fn synchronize(&mut self) -> PrefsResult<()> {
        let mut committed = self
            .committed
            .lock()
            .map_err(|_| PrefsError::Backend("preference lock poisoned".to_string()))?;
        apply_staged(&mut committed, std::mem::take(&mut self.staged));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_share_committed_state() {
        let mut first = MemoryPreferenceStore::new();
        let second = first.handle();

        first.set_value("key", Some(Node::from("v"))).unwrap();
        assert_eq!(second.copy_value("key").unwrap(), None);

        first.synchronize().unwrap();
        assert_eq!(second.copy_value("key").unwrap(), Some(Node::from("v")));
    }
}
