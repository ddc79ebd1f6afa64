//! Login/logout state: the bearer token and the identity snapshot.

use thiserror::Error;

use clinica_auth::Identity;

use crate::identity_store::IdentityStore;
use crate::storage::{KeyValueStorage, StorageError, StorageKeys};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("login returned an empty token")]
    EmptyToken,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Owner of the persisted session keys and of the [`IdentityStore`].
///
/// The token and the profile snapshot are two independent keys; this is the
/// only type that writes either of them.
#[derive(Debug)]
pub struct Session<S> {
    storage: S,
    keys: StorageKeys,
    identity: IdentityStore,
}

impl<S: KeyValueStorage> Session<S> {
    /// Restore from persisted state (`initialize` over the `user` key).
    pub fn restore(storage: S) -> Self {
        Self::restore_with_keys(storage, StorageKeys::default())
    }

    pub fn restore_with_keys(storage: S, keys: StorageKeys) -> Self {
        let identity = IdentityStore::initialize(&storage, &keys.user);
        Self {
            storage,
            keys,
            identity,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.get().is_some()
    }

    /// Persisted bearer token, if any. Unreadable storage reads as none.
    pub fn token(&self) -> Option<String> {
        match self.storage.get(&self.keys.token) {
            Ok(Some(token)) => {
                let token = token.trim();
                (!token.is_empty() && token != "undefined").then(|| token.to_string())
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "could not read persisted token");
                None
            }
        }
    }

    /// Record a successful login: persist token and snapshot, then publish
    /// the identity.
    pub fn establish(&mut self, token: &str, identity: Identity) -> Result<(), SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        self.storage.set(&self.keys.token, token)?;
        if let Err(err) = self.storage.set(&self.keys.user, &identity.to_snapshot_json()) {
            if let Err(rollback) = self.storage.remove(&self.keys.token) {
                tracing::warn!(error = %rollback, "could not roll back persisted token");
            }
            return Err(err.into());
        }

        tracing::info!(
            username = %identity.username,
            role = identity.role.map(|r| r.as_str()).unwrap_or("none"),
            "session established"
        );
        self.identity.set(Some(identity));
        Ok(())
    }

    /// Log out: drop both persisted keys and clear the identity.
    ///
    /// The in-memory identity is cleared even when storage fails; the first
    /// storage error is returned afterwards.
    pub fn end(&mut self) -> Result<(), SessionError> {
        let token = self.storage.remove(&self.keys.token);
        let user = self.storage.remove(&self.keys.user);

        if let Some(identity) = self.identity.get() {
            tracing::info!(username = %identity.username, "session ended");
        }
        self.identity.set(None);

        token?;
        user?;
        Ok(())
    }

    /// For subscriptions; mutating the identity directly bypasses persistence.
    pub fn identity_store_mut(&mut self) -> &mut IdentityStore {
        &mut self.identity
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use clinica_auth::{Decision, Requirement, Role, authorize};

    use super::*;
    use crate::storage::MemoryStorage;

    struct ReadOnlyStorage(MemoryStorage);

    impl KeyValueStorage for ReadOnlyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    /// Accepts the token but rejects the user snapshot; `remove` optionally fails too.
    struct UserWriteFails {
        inner: MemoryStorage,
        remove_fails: bool,
    }

    impl KeyValueStorage for UserWriteFails {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == "user" {
                return Err(StorageError::Unavailable("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StorageError> {
            if self.remove_fails {
                return Err(StorageError::Unavailable("storage locked".to_string()));
            }
            self.inner.remove(key)
        }
    }

    fn doctor() -> Identity {
        Identity::new("ana", Some(Role::Doctor)).with_email("ana@clinica.com")
    }

    #[test]
    fn establish_persists_both_keys_and_survives_restore() {
        let storage = MemoryStorage::new();
        let mut session = Session::restore(storage.clone());
        assert!(!session.is_authenticated());

        session.establish("tok-123", doctor()).unwrap();
        assert_eq!(session.token().as_deref(), Some("tok-123"));
        assert_eq!(storage.len(), 2);

        let restored = Session::restore(storage);
        assert_eq!(restored.identity(), Some(&doctor()));
        assert_eq!(restored.token().as_deref(), Some("tok-123"));
    }

    #[test]
    fn end_clears_keys_and_identity() {
        let storage = MemoryStorage::new();
        let mut session = Session::restore(storage.clone());
        session.establish("tok", doctor()).unwrap();

        session.end().unwrap();
        assert!(session.identity().is_none());
        assert!(session.token().is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn empty_token_is_rejected() {
        let mut session = Session::restore(MemoryStorage::new());
        assert!(matches!(session.establish("  ", doctor()), Err(SessionError::EmptyToken)));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn end_clears_memory_even_if_storage_fails() {
        let backing = MemoryStorage::with_entries([
            ("token", "tok"),
            ("user", r#"{"username":"ana","rol":{"nombre":"DOCTOR"}}"#),
        ]);
        let mut session = Session::restore(ReadOnlyStorage(backing));
        assert!(session.is_authenticated());

        assert!(session.end().is_err());
        assert!(session.identity().is_none());
    }

    #[test]
    fn failed_establish_leaves_no_identity() {
        let mut session = Session::restore(ReadOnlyStorage(MemoryStorage::new()));
        assert!(session.establish("tok", doctor()).is_err());
        assert!(session.identity().is_none());
    }

    #[test]
    fn failed_user_write_rolls_back_the_token() {
        let inner = MemoryStorage::new();
        let mut session = Session::restore(UserWriteFails {
            inner: inner.clone(),
            remove_fails: false,
        });

        assert!(matches!(
            session.establish("tok", doctor()),
            Err(SessionError::Storage(StorageError::Unavailable(_)))
        ));
        assert!(inner.is_empty());
        assert!(session.token().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn failed_rollback_still_reports_the_user_write_error() {
        let inner = MemoryStorage::new();
        let mut session = Session::restore(UserWriteFails {
            inner: inner.clone(),
            remove_fails: true,
        });

        let err = session.establish("tok", doctor()).unwrap_err();
        assert_eq!(err.to_string(), "storage unavailable: quota exceeded");
        assert_eq!(inner.get("token").unwrap().as_deref(), Some("tok"));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn undefined_token_reads_as_none() {
        let session = Session::restore(MemoryStorage::with_entries([("token", "undefined")]));
        assert_eq!(session.token(), None);
    }

    #[test]
    fn subscribers_follow_login_and_logout() {
        let logged_in = Rc::new(Cell::new(false));
        let mut session = Session::restore(MemoryStorage::new());
        let flag = logged_in.clone();
        session
            .identity_store_mut()
            .subscribe(move |identity| flag.set(identity.is_some()));

        session.establish("tok", doctor()).unwrap();
        assert!(logged_in.get());
        session.end().unwrap();
        assert!(!logged_in.get());
    }

    #[test]
    fn restored_session_drives_the_guard() {
        let stored = MemoryStorage::with_entries([(
            "user",
            r#"{"username":"ana","rol":{"nombre":"DOCTOR"}}"#,
        )]);
        let session = Session::restore(stored);

        assert_eq!(
            authorize(session.identity(), &Requirement::Role(Role::Doctor), "/doctor"),
            Decision::Allow
        );
        assert_eq!(
            authorize(session.identity(), &Requirement::Role(Role::Admin), "/admin")
                .location()
                .as_deref(),
            Some("/no-permission")
        );

        let empty = Session::restore(MemoryStorage::new());
        assert_eq!(
            authorize(empty.identity(), &Requirement::Role(Role::Paciente), "/paciente"),
            Decision::RedirectToLogin {
                return_to: "/paciente".to_string()
            }
        );
    }
}
