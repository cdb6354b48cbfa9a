use std::collections::BTreeMap;

use log::warn;

use super::error::AuthError;
use super::password::{PasswordHasher, StoredCredential};
use crate::modules::storage::{RecordStore, Slot, StoreError};
use crate::modules::utils::logging::log_auth_event;

/// Content of the users slot: username -> stored digest
pub type CredentialMap = BTreeMap<String, StoredCredential>;

/// Account creation and login verification over the users slot.
///
/// A "no" from the business rules (duplicate username, wrong password) is
/// `Ok(false)`; `Err` is reserved for storage failures.
#[derive(Debug, Clone, Copy)]
pub struct CredentialService<'a> {
    store: &'a RecordStore,
    hasher: PasswordHasher,
}

impl<'a> CredentialService<'a> {
    pub fn new(store: &'a RecordStore, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Salted digest of `password` with the configured iteration count
    pub fn hash(&self, password: &str) -> StoredCredential {
        self.hasher.hash(password)
    }

    /// Create an account unless the username is taken
    pub fn register(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        if username.is_empty() || password.is_empty() {
            warn!("Refusing to register an account with an empty username or password");
            return Ok(false);
        }

        let slot = self.store.lock(Slot::Users);
        let mut users: CredentialMap = slot.load()?;

        if users.contains_key(username) {
            log_auth_event("register", username, false, Some("username already exists"));
            return Ok(false);
        }

        users.insert(username.to_string(), self.hash(password));
        slot.save(&users)?;

        log_auth_event("register", username, true, None);
        Ok(true)
    }

    /// Check a username/password pair without touching the store.
    ///
    /// An empty username never verifies, even if a hand-edited or legacy
    /// users file carries an entry for it.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        if username.is_empty() {
            return Ok(false);
        }
        let users: CredentialMap = self.store.load(Slot::Users)?;
        Ok(users
            .get(username)
            .is_some_and(|stored| stored.matches(password)))
    }

    /// Stored digest of an account, if any
    pub fn stored(&self, username: &str) -> Result<Option<StoredCredential>, StoreError> {
        let mut users: CredentialMap = self.store.load(Slot::Users)?;
        Ok(users.remove(username))
    }

    pub fn usernames(&self) -> Result<Vec<String>, StoreError> {
        let users: CredentialMap = self.store.load(Slot::Users)?;
        Ok(users.into_keys().collect())
    }

    /// Form-level signup: report empty fields and duplicates as distinct errors
    pub fn signup(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let mut missing = Vec::new();
        if username.is_empty() {
            missing.push("username");
        }
        if password.is_empty() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(AuthError::ValidationFailure(missing));
        }

        if self.register(username, password)? {
            Ok(())
        } else {
            Err(AuthError::DuplicateAccount(username.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::password::legacy_digest;
    use tempfile::TempDir;

    fn setup_test_store() -> (RecordStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn service(store: &RecordStore) -> CredentialService<'_> {
        CredentialService::new(store, PasswordHasher::new(1_000))
    }

    #[test]
    fn test_register_then_verify() {
        let (store, _dir) = setup_test_store();
        let credentials = service(&store);

        assert!(credentials.register("alice", "secret1").unwrap());
        assert!(credentials.verify("alice", "secret1").unwrap());
        assert!(!credentials.verify("alice", "secret2").unwrap());
        assert!(!credentials.verify("Alice", "secret1").unwrap());
        assert!(!credentials.verify("mallory", "secret1").unwrap());
    }

    #[test]
    fn test_duplicate_registration_keeps_first_digest() {
        let (store, _dir) = setup_test_store();
        let credentials = service(&store);

        assert!(credentials.register("bob", "x").unwrap());
        let original = credentials.stored("bob").unwrap().unwrap();

        assert!(!credentials.register("bob", "y").unwrap());
        assert_eq!(credentials.stored("bob").unwrap().unwrap(), original);
        assert!(credentials.verify("bob", "x").unwrap());
        assert!(!credentials.verify("bob", "y").unwrap());
    }

    #[test]
    fn test_usernames_are_case_sensitive() {
        let (store, _dir) = setup_test_store();
        let credentials = service(&store);

        assert!(credentials.register("carol", "pw").unwrap());
        assert!(credentials.register("Carol", "pw").unwrap());
        assert_eq!(credentials.usernames().unwrap(), vec!["Carol", "carol"]);
    }

    #[test]
    fn test_empty_fields_are_refused() {
        let (store, _dir) = setup_test_store();
        let credentials = service(&store);

        assert!(!credentials.register("", "pw").unwrap());
        assert!(!credentials.register("dave", "").unwrap());
        assert!(credentials.usernames().unwrap().is_empty());
        assert!(!store.path(Slot::Users).exists());
    }

    #[test]
    fn test_signup_errors() {
        let (store, _dir) = setup_test_store();
        let credentials = service(&store);

        match credentials.signup("", "") {
            Err(AuthError::ValidationFailure(fields)) => {
                assert_eq!(fields, vec!["username", "password"])
            }
            other => panic!("unexpected result: {:?}", other),
        }

        credentials.signup("erin", "pw").unwrap();
        assert!(matches!(
            credentials.signup("erin", "other"),
            Err(AuthError::DuplicateAccount(name)) if name == "erin"
        ));
    }

    #[test]
    fn test_legacy_users_file_still_verifies() {
        let (store, _dir) = setup_test_store();
        let legacy = format!("{{\"frank\": \"{}\"}}", legacy_digest("hunter2"));
        std::fs::write(store.path(Slot::Users), legacy).unwrap();

        let credentials = service(&store);
        assert!(credentials.verify("frank", "hunter2").unwrap());
        assert!(!credentials.verify("frank", "hunter3").unwrap());

        // New accounts are salted, legacy ones are left alone
        assert!(credentials.register("grace", "pw").unwrap());
        assert!(credentials.stored("frank").unwrap().unwrap().is_legacy());
        assert!(!credentials.stored("grace").unwrap().unwrap().is_legacy());
    }

    #[test]
    fn test_hash_uses_configured_iterations() {
        let (store, _dir) = setup_test_store();
        let credentials = service(&store);

        let first = credentials.hash("pw");
        let second = credentials.hash("pw");
        assert_ne!(first, second);
        assert!(first.matches("pw"));
        assert!(matches!(first, StoredCredential::Salted { iterations: 1_000, .. }));

        assert!(credentials.register("heidi", "pw").unwrap());
        assert!(matches!(
            credentials.stored("heidi").unwrap().unwrap(),
            StoredCredential::Salted { iterations: 1_000, .. }
        ));
    }

    #[test]
    fn test_empty_username_entry_never_verifies() {
        let (store, _dir) = setup_test_store();
        let seeded = format!("{{\"\": \"{}\"}}", legacy_digest("pw"));
        std::fs::write(store.path(Slot::Users), seeded).unwrap();

        let credentials = service(&store);
        assert_eq!(credentials.usernames().unwrap(), vec![""]);
        assert!(!credentials.verify("", "pw").unwrap());
    }

    #[test]
    fn test_storage_failure_is_not_a_false() {
        let (store, _dir) = setup_test_store();
        std::fs::write(store.path(Slot::Users), "[1, 2, 3]").unwrap();

        let credentials = service(&store);
        assert!(credentials.verify("alice", "pw").is_err());
        assert!(credentials.register("alice", "pw").is_err());
    }
}
