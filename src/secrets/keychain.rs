//! OS keyring secret store
//!
//! Each node gets one keyring entry under the CHAP service tag. The entry's
//! account is the node's qualified name, not the CHAP user; the password
//! holds both the CHAP user and the secret as a JSON object:
//!
//! ```text
//! service:  iSCSI CHAP
//! account:  iqn.2020-01.com.example:target0
//! password: {"user":"alice","secret":"s3cret"}
//! ```
//!
//! Tools that expect the CHAP user in the account field and a bare secret
//! as the password will not read these entries.

use super::{SecretError, SecretResult, SecretStore, CHAP_SERVICE_NAME};
use crate::model::ChapSecret;
use keyring::{Entry, Error as KeyringError};

/// Secret store backed by the platform keychain or keyring
pub struct KeyringSecretStore {
    service: String,
}

impl KeyringSecretStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, node: &str) -> SecretResult<Entry> {
        if node.trim().is_empty() {
            return Err(SecretError::EmptyNodeName);
        }
        Entry::new(&self.service, node).map_err(map_keyring_error)
    }
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        Self::new(CHAP_SERVICE_NAME)
    }
}

fn map_keyring_error(err: KeyringError) -> SecretError {
    SecretError::Backend(err.to_string())
}

impl SecretStore for KeyringSecretStore {
    fn chap_secret(&self, node: &str) -> SecretResult<ChapSecret> {
        let entry = self.entry(node)?;
        match entry.get_password() {
            Ok(json) => {
                serde_json::from_str(&json).map_err(|e| SecretError::Malformed(e.to_string()))
            }
            Err(KeyringError::NoEntry) => Err(SecretError::NotFound(node.to_string())),
            Err(err) => Err(map_keyring_error(err)),
        }
    }

    fn set_chap_secret(&self, node: &str, secret: &ChapSecret) -> SecretResult<()> {
        let entry = self.entry(node)?;
        let json =
            serde_json::to_string(secret).map_err(|e| SecretError::Malformed(e.to_string()))?;
        entry.set_password(&json).map_err(map_keyring_error)?;

        log::debug!("Stored CHAP secret for {} in {}", node, self.service);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_node_rejected_before_keyring_access() {
        let store = KeyringSecretStore::default();
        assert_eq!(store.service(), "iSCSI CHAP");

        let result = store.chap_secret("  ");
        assert!(matches!(result, Err(SecretError::EmptyNodeName)));

        let result = store.set_chap_secret("", &ChapSecret::new("u", "s"));
        assert!(matches!(result, Err(SecretError::EmptyNodeName)));
    }

    #[test]
    fn test_password_holds_user_and_secret_as_json() {
        let json = serde_json::to_string(&ChapSecret::new("alice", "s3cret")).unwrap();
        assert_eq!(json, r#"{"user":"alice","secret":"s3cret"}"#);

        let parsed: ChapSecret = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ChapSecret::new("alice", "s3cret"));
    }
}
