//! `clinica-auth`: role taxonomy, identity and the route guard.
//!
//! This crate is decoupled from storage, HTTP and rendering: it only decides.

pub mod guard;
pub mod identity;
pub mod requirement;
pub mod roles;
pub mod snapshot;

pub use guard::{
    Decision, GuardExplanation, LOGIN_PATH, NO_PERMISSION_PATH, RETURN_TO_PARAM, authorize,
    explain, login_location, return_path_from_query,
};
pub use identity::Identity;
pub use requirement::Requirement;
pub use roles::{Role, StaffKind, UnknownRole};
pub use snapshot::{IdentitySnapshot, SnapshotError};
