use serde::Serialize;

use crate::{Role, StaffKind};

/// The authenticated principal, as the client knows it.
///
/// `role` is `None` when the backend profile carried no role, or one this
/// client does not recognize. Such an identity is logged in but satisfies no
/// role requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: Option<String>,
    pub username: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub role: Option<Role>,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: String::new(),
            given_name: String::new(),
            family_name: String::new(),
            role,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_names(mut self, given: impl Into<String>, family: impl Into<String>) -> Self {
        self.given_name = given.into();
        self.family_name = family.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    pub fn staff_kind(&self) -> Option<StaffKind> {
        self.role.and_then(|r| r.staff_kind())
    }

    /// "Given Family", falling back to the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.given_name.trim(), self.family_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
