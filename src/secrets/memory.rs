//! In-memory secret store

use super::{SecretError, SecretResult, SecretStore};
use crate::model::ChapSecret;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Process-local secret store; clones share entries
#[derive(Clone, Default)]
pub struct MemorySecretStore {
    entries: Arc<Mutex<HashMap<String, ChapSecret>>>,
    writes: Arc<AtomicUsize>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set_chap_secret` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(node))
            .unwrap_or(false)
    }
}

impl SecretStore for MemorySecretStore {
    fn chap_secret(&self, node: &str) -> SecretResult<ChapSecret> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| SecretError::Backend("secret lock poisoned".to_string()))?;

        entries
            .get(node)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(node.to_string()))
    }

    fn set_chap_secret(&self, node: &str, secret: &ChapSecret) -> SecretResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SecretError::Backend("secret lock poisoned".to_string()))?;

        entries.insert(node.to_string(), secret.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
