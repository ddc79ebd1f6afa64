use core::str::FromStr;

use crate::{Role, UnknownRole};

/// Role constraint attached to a navigable destination.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Requirement {
    /// No role constraint; any authenticated identity passes.
    #[default]
    Public,
    Role(Role),
    /// Any one of the listed roles. Empty means nobody passes.
    AnyOf(Vec<Role>),
}

impl Requirement {
    pub fn any_of(roles: impl IntoIterator<Item = Role>) -> Self {
        Requirement::AnyOf(roles.into_iter().collect())
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Requirement::Public)
    }

    /// The requirement normalized to a set of roles (empty for `Public`).
    pub fn roles(&self) -> &[Role] {
        match self {
            Requirement::Public => &[],
            Requirement::Role(role) => core::slice::from_ref(role),
            Requirement::AnyOf(roles) => roles,
        }
    }

    /// Whether a (possibly unknown) role satisfies this requirement.
    pub fn is_satisfied_by(&self, role: Option<Role>) -> bool {
        match self {
            Requirement::Public => true,
            _ => role.is_some_and(|r| self.roles().contains(&r)),
        }
    }

    /// Parse a comma-separated list of role tags; blank parses to `Public`.
    pub fn parse(raw: &str) -> Result<Self, UnknownRole> {
        let mut roles = raw
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::parse::<Role>)
            .collect::<Result<Vec<_>, _>>()?;

        roles.dedup();
        Ok(match roles.len() {
            0 => Requirement::Public,
            1 => Requirement::Role(roles[0]),
            _ => Requirement::AnyOf(roles),
        })
    }
}

impl From<Role> for Requirement {
    fn from(role: Role) -> Self {
        Requirement::Role(role)
    }
}

impl FromStr for Requirement {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::parse(s)
    }
}

impl core::fmt::Display for Requirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_public() {
            return f.write_str("public");
        }
        let tags: Vec<&str> = self.roles().iter().map(Role::as_str).collect();
        write!(f, "[{}]", tags.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaffKind;

    #[test]
    fn parse_single_and_many() {
        assert_eq!(Requirement::parse("DOCTOR").unwrap(), Requirement::Role(Role::Doctor));
        assert_eq!(
            Requirement::parse("admin, secretaria").unwrap(),
            Requirement::AnyOf(vec![Role::Admin, Role::Empleado(StaffKind::Secretaria)])
        );
        assert_eq!(Requirement::parse("  ").unwrap(), Requirement::Public);
        assert!(Requirement::parse("DOCTOR,ROOT").is_err());
    }

    #[test]
    fn normalization() {
        assert!(Requirement::Public.roles().is_empty());
        assert_eq!(Requirement::Role(Role::Admin).roles(), &[Role::Admin]);
    }

    #[test]
    fn satisfaction_fails_closed() {
        let req = Requirement::any_of([Role::Doctor, Role::Enfermera]);
        assert!(req.is_satisfied_by(Some(Role::Enfermera)));
        assert!(!req.is_satisfied_by(Some(Role::Paciente)));
        assert!(!req.is_satisfied_by(None));

        assert!(!Requirement::AnyOf(Vec::new()).is_satisfied_by(Some(Role::Admin)));
        assert!(Requirement::Public.is_satisfied_by(None));
    }

    #[test]
    fn display() {
        assert_eq!(Requirement::Public.to_string(), "public");
        assert_eq!(
            Requirement::any_of([Role::Admin, Role::Doctor]).to_string(),
            "[ADMIN,DOCTOR]"
        );
    }
}
