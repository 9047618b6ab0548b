//! Authentication accessors
//!
//! Preferences only record the method tag. For CHAP the user name and
//! secret live in the secret store under the owning node's name, and a
//! failed lookup falls back to no authentication.

use super::ConfigStore;
use crate::model::{Auth, AuthMethod, ChapSecret};
use crate::prefs::PreferenceStore;
use crate::secrets::{SecretResult, SecretStore};

impl<P: PreferenceStore, S: SecretStore> ConfigStore<P, S> {
    /// CHAP credentials stored for a node, with the secret store's error on
    /// failure. Use this to tell a missing secret apart from other failures.
    pub fn chap_secret(&self, node: &str) -> SecretResult<ChapSecret> {
        self.secrets.chap_secret(node)
    }

    fn reconstruct_auth(&self, node: &str, method: Option<AuthMethod>) -> Auth {
        if method != Some(AuthMethod::Chap) {
            return Auth::None;
        }

        match self.secrets.chap_secret(node) {
            Ok(secret) => Auth::Chap(secret),
            Err(e) => {
                log::warn!(
                    "CHAP configured for {} but no usable secret ({}), using no authentication",
                    node,
                    e
                );
                Auth::None
            }
        }
    }

    fn store_secret(&self, node: &str, auth: &Auth) {
        if let Auth::Chap(secret) = auth {
            if let Err(e) = self.secrets.set_chap_secret(node, secret) {
                log::warn!("Failed to store CHAP secret for {}: {}", node, e);
            }
        }
    }

    /// Authentication for a target, `None` if the target is not configured
    pub fn target_authentication(&self, target: &str) -> Option<Auth> {
        let method = self.find_target(target)?.auth_method();
        Some(self.reconstruct_auth(target, method))
    }

    /// Set authentication for a target, creating the target if needed.
    /// Switching to `Auth::None` leaves any stored secret in place.
    pub fn set_target_authentication(&mut self, target: &str, auth: &Auth) {
        if let Some(record) = self.target_entry(target, true) {
            record.authentication = Some(auth.method().as_str().to_string());
        }
        self.cache.targets.mark_modified();
        self.store_secret(target, auth);
    }

    /// Authentication for the initiator, `None` until the namespace is loaded
    pub fn initiator_authentication(&self) -> Option<Auth> {
        let record = self.cache.initiator.peek()?;
        Some(self.reconstruct_auth(&record.name, record.auth_method()))
    }

    /// Set authentication for the initiator. CHAP secrets are keyed by the
    /// current initiator name.
    pub fn set_initiator_authentication(&mut self, auth: &Auth) {
        let mut name = String::new();
        if let Some(record) = self.cache.initiator.get(true) {
            record.authentication = Some(auth.method().as_str().to_string());
            name = record.name.clone();
        }
        self.cache.initiator.mark_modified();
        self.store_secret(&name, auth);
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{sibling, store, PORTAL, TARGET};
    use super::super::ConfigStore;
    use crate::cache::Namespace;
    use crate::model::{Auth, ChapSecret, Portal, Target};
    use crate::node::Node;
    use crate::prefs::{MemoryPreferenceStore, PreferenceStore};
    use crate::secrets::{MemorySecretStore, SecretError, SecretResult, SecretStore};

    struct UnavailableSecrets;

    impl SecretStore for UnavailableSecrets {
        fn chap_secret(&self, _node: &str) -> SecretResult<ChapSecret> {
            Err(SecretError::Backend("keychain locked".to_string()))
        }

        fn set_chap_secret(&self, _node: &str, _secret: &ChapSecret) -> SecretResult<()> {
            Err(SecretError::Backend("keychain locked".to_string()))
        }
    }

    #[test]
    fn test_chap_round_trip_through_secret_store() {
        let mut store = store();
        store.target(TARGET, true);
        store.set_portal(TARGET, &Portal::new(PORTAL));
        store.set_target_authentication(TARGET, &Auth::chap("alice", "s3cret"));

        assert_eq!(
            store.target_authentication(TARGET),
            Some(Auth::chap("alice", "s3cret"))
        );
        assert_eq!(store.chap_secret(TARGET).unwrap().secret, "s3cret");
        assert!(store.is_modified(Namespace::Targets));

        // The secret is not part of the preference tree
        let record = store.target(TARGET, false).unwrap();
        assert!(!format!("{:?}", record).contains("s3cret"));
    }

    #[test]
    fn test_unconfigured_target_has_no_authentication() {
        let store = store();
        assert!(store.target_authentication(TARGET).is_none());
        assert!(store.initiator_authentication().is_none());
    }

    #[test]
    fn test_untagged_target_is_none_without_secret_lookup() {
        let mut store = ConfigStore::new(MemoryPreferenceStore::new(), UnavailableSecrets);
        store.target(TARGET, true);
        assert_eq!(store.target_authentication(TARGET), Some(Auth::None));
    }

    #[test]
    fn test_none_does_not_touch_stale_secret() {
        let mut store = store();
        store.set_target_authentication(TARGET, &Auth::chap("alice", "s3cret"));
        assert_eq!(store.secrets().write_count(), 1);

        store.set_target_authentication(TARGET, &Auth::None);
        assert_eq!(store.secrets().write_count(), 1);
        assert!(store.secrets().contains(TARGET));
        assert_eq!(store.target_authentication(TARGET), Some(Auth::None));
    }

    #[test]
    fn test_missing_secret_degrades_to_none() {
        let mut store = store();
        store.set_target_authentication(TARGET, &Auth::chap("alice", "s3cret"));
        store.synchronize().unwrap();

        let mut other = ConfigStore::new(store.prefs().handle(), MemorySecretStore::new());
        other.synchronize().unwrap();

        assert_eq!(other.target_authentication(TARGET), Some(Auth::None));
        assert!(matches!(
            other.chap_secret(TARGET),
            Err(SecretError::NotFound(_))
        ));
    }

    #[test]
    fn test_secret_store_failure_degrades_to_none() {
        let mut store = ConfigStore::new(MemoryPreferenceStore::new(), UnavailableSecrets);
        store.set_target_authentication(TARGET, &Auth::chap("alice", "s3cret"));

        assert!(store.is_modified(Namespace::Targets));
        assert_eq!(store.target_authentication(TARGET), Some(Auth::None));
    }

    #[test]
    fn test_initiator_secret_keyed_by_name() {
        let mut store = store();
        store.set_initiator_name("iqn.2020-01.com.example:host");
        store.set_initiator_authentication(&Auth::chap("host", "pw"));

        assert!(store.secrets().contains("iqn.2020-01.com.example:host"));
        assert_eq!(
            store.initiator_authentication(),
            Some(Auth::chap("host", "pw"))
        );

        let other = sibling(&store);
        assert_eq!(
            other.chap_secret("iqn.2020-01.com.example:host").unwrap().user,
            "host"
        );
    }

    #[test]
    fn test_unknown_tag_reads_as_none_and_survives_flush() {
        let mut backing = MemoryPreferenceStore::new();
        let nodes: Node = [(
            TARGET,
            [("Authentication", Node::from("SRP"))].into_iter().collect::<Node>(),
        )]
        .into_iter()
        .collect();
        backing
            .set_value(Namespace::Targets.key(), Some(nodes))
            .unwrap();
        backing.synchronize().unwrap();

        let mut store = ConfigStore::new(backing.handle(), UnavailableSecrets);
        store.synchronize().unwrap();
        assert_eq!(store.target_authentication(TARGET), Some(Auth::None));

        store.set_target(&Target::new("iqn.2020-01.com.example:target1"));
        store.synchronize().unwrap();

        let stored = backing.copy_value(Namespace::Targets.key()).unwrap().unwrap();
        assert_eq!(
            stored.get(TARGET).and_then(|t| t.get_str("Authentication")),
            Some("SRP")
        );
    }
}
