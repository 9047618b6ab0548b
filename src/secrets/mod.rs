//! CHAP secret storage
//!
//! Shared secrets never go into preferences. They are kept in a secure
//! store keyed by the qualified name of the node that owns them.

pub mod keychain;
pub mod memory;

use crate::model::ChapSecret;
use thiserror::Error;

/// Service tag identifying every CHAP entry written by this crate
pub const CHAP_SERVICE_NAME: &str = "iSCSI CHAP";

/// Secret store errors
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("no CHAP secret stored for {0}")]
    NotFound(String),

    #[error("node name must not be empty")]
    EmptyNodeName,

    #[error("malformed secret entry: {0}")]
    Malformed(String),

    #[error("secret store error: {0}")]
    Backend(String),
}

/// Result type for secret operations
pub type SecretResult<T> = Result<T, SecretError>;

/// Secret store trait - CHAP credentials keyed by node name
pub trait SecretStore: Send {
    /// Fetch the CHAP credentials stored for `node`.
    fn chap_secret(&self, node: &str) -> SecretResult<ChapSecret>;

    /// Store CHAP credentials for `node`, creating or replacing the entry.
    fn set_chap_secret(&self, node: &str, secret: &ChapSecret) -> SecretResult<()>;
}

impl<T: SecretStore + ?Sized> SecretStore for Box<T> {
    fn chap_secret(&self, node: &str) -> SecretResult<ChapSecret> {
        (**self).chap_secret(node)
    }

    fn set_chap_secret(&self, node: &str, secret: &ChapSecret) -> SecretResult<()> {
        (**self).set_chap_secret(node, secret)
    }
}

// Re-export implementations
pub use keychain::KeyringSecretStore;
pub use memory::MemorySecretStore;
