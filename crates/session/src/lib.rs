//! `clinica-session`
//!
//! **Responsibility:** who is currently logged in.
//!
//! This crate provides:
//! - Key/value persistence mirroring browser local storage (`token`, `user`)
//! - The process-wide identity store (`initialize` / `get` / `set`)
//! - The session that writes both persisted keys on login and logout

pub mod identity_store;
pub mod session;
pub mod storage;

pub use identity_store::{IdentityStore, SubscriptionId, decode_persisted_identity};
pub use session::{Session, SessionError};
pub use storage::{KeyValueStorage, MemoryStorage, StorageError, StorageKeys};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use storage::BrowserStorage;
