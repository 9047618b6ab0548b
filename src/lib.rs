//! Persistent configuration for an iSCSI initiator
//!
//! This crate keeps the initiator's view of targets, portals, its own
//! identity, and SendTargets discovery results in a key-value preference
//! store, with CHAP secrets kept apart in a secret store. Reads and writes
//! go through an in-memory cache of three namespaces that `synchronize`
//! reconciles with the preference store.

pub mod cache;
pub mod config;
pub mod model;
pub mod node;
pub mod prefs;
pub mod secrets;
pub mod store;

pub use cache::Namespace;
pub use config::{Config, ConfigError};
pub use model::{
    Auth, AuthMethod, ChapSecret, ConnectionConfig, Digest, DiscoveryRecord, Portal,
    SessionConfig, Target,
};
pub use node::Node;
pub use prefs::{PreferenceStore, PrefsError};
pub use secrets::{SecretError, SecretStore};
pub use store::{ConfigStore, RemovalMode};
