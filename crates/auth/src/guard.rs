//! Route guard: the decision consulted before rendering a protected view.
//!
//! - No IO
//! - No panics
//! - Every input maps to exactly one [`Decision`]

use serde::Serialize;

use crate::{Identity, Requirement};

pub const LOGIN_PATH: &str = "/login";
pub const NO_PERMISSION_PATH: &str = "/no-permission";

/// Query parameter carrying the originally requested location to the login view.
pub const RETURN_TO_PARAM: &str = "redirect";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    /// Nobody is logged in; `return_to` is where to go after login.
    RedirectToLogin { return_to: String },
    /// Logged in, but the role does not satisfy the requirement.
    RedirectToNoPermission,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Where to navigate instead of rendering, if anywhere.
    pub fn location(&self) -> Option<String> {
        match self {
            Decision::Allow => None,
            Decision::RedirectToLogin { return_to } => Some(login_location(return_to)),
            Decision::RedirectToNoPermission => Some(NO_PERMISSION_PATH.to_string()),
        }
    }
}

/// Decide whether `current` may render a destination guarded by `requirement`.
///
/// `requested` is the location being navigated to (path plus query), carried
/// into the login redirect.
pub fn authorize(current: Option<&Identity>, requirement: &Requirement, requested: &str) -> Decision {
    let Some(identity) = current else {
        tracing::debug!(%requirement, requested, "no identity; redirecting to login");
        return Decision::RedirectToLogin {
            return_to: requested.to_string(),
        };
    };

    if requirement.is_satisfied_by(identity.role) {
        return Decision::Allow;
    }

    tracing::debug!(
        %requirement,
        requested,
        username = %identity.username,
        role = identity.role.map(|r| r.as_str()).unwrap_or("none"),
        "role does not satisfy requirement"
    );
    Decision::RedirectToNoPermission
}

/// `/login?redirect=<requested>`, or bare `/login` when there is nothing
/// worth returning to.
pub fn login_location(return_to: &str) -> String {
    match return_path_from_query(Some(return_to)) {
        Some(path) if path != "/" && !path.starts_with(LOGIN_PATH) => {
            format!("{LOGIN_PATH}?{RETURN_TO_PARAM}={}", encode_query_value(&path))
        }
        _ => LOGIN_PATH.to_string(),
    }
}

/// Validate a post-login return location taken from the query string.
///
/// Only local absolute paths are accepted; `//host` and absolute URLs are
/// dropped so the login view never redirects off-site.
pub fn return_path_from_query(raw: Option<&str>) -> Option<String> {
    let path = raw?.trim();
    if !path.starts_with('/') || path.starts_with("//") || path.contains('\\') {
        return None;
    }
    if path.chars().any(char::is_control) {
        return None;
    }
    Some(path.to_string())
}

fn encode_query_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision explanation (diagnostics)
// ─────────────────────────────────────────────────────────────────────────────

/// Why the guard decided what it decided.
#[derive(Debug, Clone, Serialize)]
pub struct GuardExplanation {
    pub requirement: String,
    pub required_roles: Vec<&'static str>,
    pub username: Option<String>,
    pub role: Option<&'static str>,
    pub granted: bool,
    pub reason: String,
}

pub fn explain(current: Option<&Identity>, requirement: &Requirement) -> GuardExplanation {
    let required_roles: Vec<&'static str> = requirement.roles().iter().map(|r| r.as_str()).collect();

    let (granted, reason) = match current {
        None => (false, "not authenticated".to_string()),
        Some(_) if requirement.is_public() => (true, "destination has no role requirement".to_string()),
        Some(identity) => match identity.role {
            None => (false, "identity has no recognized role".to_string()),
            Some(role) if requirement.roles().contains(&role) => {
                (true, format!("role {role} is in {requirement}"))
            }
            Some(role) if required_roles.is_empty() => {
                (false, format!("role {role} cannot satisfy an empty role set"))
            }
            Some(role) => (false, format!("role {role} is not in {requirement}")),
        },
    };

    GuardExplanation {
        requirement: requirement.to_string(),
        required_roles,
        username: current.map(|i| i.username.clone()),
        role: current.and_then(|i| i.role).map(|r| r.as_str()),
        granted,
        reason,
    }
}
