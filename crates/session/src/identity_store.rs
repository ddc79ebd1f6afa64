//! Process-wide holder of the current identity.

use clinica_auth::Identity;

use crate::storage::KeyValueStorage;

/// Handle returned by [`IdentityStore::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(Option<&Identity>)>;

/// Single source of truth for "who is logged in".
///
/// # Invariants
/// - Reads never touch storage; the value is in memory after `initialize`.
/// - `set` only changes the in-memory profile. The persisted keys belong to
///   [`crate::Session`].
/// - Single-threaded: listeners run synchronously inside `set`.
pub struct IdentityStore {
    current: Option<Identity>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl IdentityStore {
    pub fn empty() -> Self {
        Self {
            current: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Populate from the persisted snapshot under `key`.
    ///
    /// Fail-soft: an unreadable store or a malformed snapshot yields an empty
    /// store, never an error.
    pub fn initialize<S: KeyValueStorage>(storage: &S, key: &str) -> Self {
        let raw = match storage.get(key) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key, error = %err, "could not read persisted identity");
                None
            }
        };

        let mut store = Self::empty();
        store.current = decode_persisted_identity(raw.as_deref());

        match &store.current {
            Some(identity) => tracing::debug!(
                username = %identity.username,
                role = identity.role.map(|r| r.as_str()).unwrap_or("none"),
                "restored persisted identity"
            ),
            None => tracing::debug!("no persisted identity"),
        }
        store
    }

    pub fn get(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    /// Replace the current identity and notify subscribers.
    pub fn set(&mut self, identity: Option<Identity>) {
        self.current = identity;
        for (_, listener) in &self.listeners {
            listener(self.current.as_ref());
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn(Option<&Identity>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl core::fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdentityStore")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Decode a raw persisted `user` value.
///
/// Absent, blank, `"undefined"`, `"null"`, invalid JSON and non-object JSON
/// all mean "no stored identity".
pub fn decode_persisted_identity(raw: Option<&str>) -> Option<Identity> {
    let raw = raw?.trim();
    if raw.is_empty() || raw == "undefined" || raw == "null" {
        return None;
    }

    match Identity::from_snapshot_json(raw) {
        Ok(identity) => Some(identity),
        Err(err) => {
            tracing::warn!(error = %err, "discarding malformed persisted identity");
            None
        }
    }
}
