use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use clinica_core::DomainError;

/// Staff sub-kind, only meaningful under [`Role::Empleado`].
///
/// The backend carries this as a free-text job title next to the generic
/// `EMPLEADO` role; it is resolved into this enum once, at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StaffKind {
    Secretaria,
    /// Any other (or missing) job title.
    General,
}

impl StaffKind {
    pub fn from_job_title(title: Option<&str>) -> Self {
        match title.map(str::trim) {
            Some(t) if t.eq_ignore_ascii_case("secretaria") => StaffKind::Secretaria,
            _ => StaffKind::General,
        }
    }

    /// Job title as the backend spells it, if the kind has one.
    pub fn job_title(&self) -> Option<&'static str> {
        match self {
            StaffKind::Secretaria => Some("Secretaria"),
            StaffKind::General => None,
        }
    }
}

/// Access level of an authenticated identity.
///
/// Closed set: every branch on a role is an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Admin,
    Doctor,
    Paciente,
    Enfermera,
    Empleado(StaffKind),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl From<UnknownRole> for DomainError {
    fn from(value: UnknownRole) -> Self {
        DomainError::unknown(value.to_string())
    }
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Doctor,
        Role::Paciente,
        Role::Enfermera,
        Role::Empleado(StaffKind::Secretaria),
        Role::Empleado(StaffKind::General),
    ];

    /// Canonical tag, used by route requirements and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Paciente => "PACIENTE",
            Role::Enfermera => "ENFERMERA",
            Role::Empleado(StaffKind::Secretaria) => "SECRETARIA",
            Role::Empleado(StaffKind::General) => "EMPLEADO",
        }
    }

    /// Role name as stored by the backend (`rol.nombre`); staff sub-kinds
    /// collapse to `EMPLEADO`.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::Empleado(_) => "EMPLEADO",
            other => other.as_str(),
        }
    }

    /// Human-readable label for navigation and headers.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Doctor => "Doctor",
            Role::Paciente => "Paciente",
            Role::Enfermera => "Enfermera",
            Role::Empleado(StaffKind::Secretaria) => "Secretaria",
            Role::Empleado(StaffKind::General) => "Empleado",
        }
    }

    pub fn staff_kind(&self) -> Option<StaffKind> {
        match self {
            Role::Empleado(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Resolve the backend's two role signals (role name + job title).
    ///
    /// The job title is only consulted for `EMPLEADO`.
    pub fn from_parts(role_name: &str, job_title: Option<&str>) -> Result<Self, UnknownRole> {
        match role_name.parse::<Role>()? {
            Role::Empleado(StaffKind::General) => {
                Ok(Role::Empleado(StaffKind::from_job_title(job_title)))
            }
            role => Ok(role),
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownRole(trimmed.to_string()))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_tags_case_insensitively() {
        assert_eq!("doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!(" Enfermera ".parse::<Role>().unwrap(), Role::Enfermera);
        assert_eq!(
            "SECRETARIA".parse::<Role>().unwrap(),
            Role::Empleado(StaffKind::Secretaria)
        );
        assert_eq!(
            "empleado".parse::<Role>().unwrap(),
            Role::Empleado(StaffKind::General)
        );
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let err = "ROOT".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("ROOT".to_string()));
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn canonical_tags_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn job_title_only_refines_staff() {
        assert_eq!(
            Role::from_parts("EMPLEADO", Some("secretaria ")).unwrap(),
            Role::Empleado(StaffKind::Secretaria)
        );
        assert_eq!(
            Role::from_parts("EMPLEADO", Some("Contador")).unwrap(),
            Role::Empleado(StaffKind::General)
        );
        assert_eq!(
            Role::from_parts("EMPLEADO", None).unwrap(),
            Role::Empleado(StaffKind::General)
        );
        assert_eq!(Role::from_parts("DOCTOR", Some("Secretaria")).unwrap(), Role::Doctor);
    }

    #[test]
    fn staff_collapse_to_empleado_on_the_wire() {
        assert_eq!(Role::Empleado(StaffKind::Secretaria).wire_name(), "EMPLEADO");
        assert_eq!(Role::Admin.wire_name(), "ADMIN");
        assert_eq!(Role::Empleado(StaffKind::Secretaria).staff_kind(), Some(StaffKind::Secretaria));
        assert_eq!(Role::Paciente.staff_kind(), None);
    }

    #[test]
    fn serializes_as_canonical_tag() {
        let json = serde_json::to_string(&Role::Empleado(StaffKind::Secretaria)).unwrap();
        assert_eq!(json, "\"SECRETARIA\"");
        let back: Role = serde_json::from_str("\"paciente\"").unwrap();
        assert_eq!(back, Role::Paciente);
    }
}
