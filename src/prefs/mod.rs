//! Preference store backends
//!
//! A preference store persists named `Node` values for one application
//! scope. Writes are staged and only become durable on `synchronize`.

pub mod file;
pub mod memory;

use crate::node::Node;
use std::collections::BTreeMap;
use thiserror::Error;

/// Preference store errors
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for preference operations
pub type PrefsResult<T> = Result<T, PrefsError>;

/// Committed contents of a preference scope
pub type Document = BTreeMap<String, Node>;

/// Staged writes; `None` removes the key on commit
type Staged = BTreeMap<String, Option<Node>>;

/// Preference store trait - named values for one application scope
pub trait PreferenceStore: Send {
    /// Copy the value stored under `key`.
    /// Staged writes of this instance are visible before they are committed.
    fn copy_value(&self, key: &str) -> PrefsResult<Option<Node>>;

    /// Stage a value for `key`, replacing whatever is stored there.
    /// `None` stages a removal.
    fn set_value(&mut self, key: &str, value: Option<Node>) -> PrefsResult<()>;

    /// Commit staged writes and make them visible to other instances.
    fn synchronize(&mut self) -> PrefsResult<()>;
}

/// Apply staged writes to a document
fn apply_staged(document: &mut Document, staged: Staged) {
    for (key, value) in staged {
        match value {
            Some(value) => {
                document.insert(key, value);
            }
            None => {
                document.remove(&key);
            }
        }
    }
}

// Re-export implementations
pub use file::FilePreferenceStore;
pub use memory::MemoryPreferenceStore;
