//! Role-specific navigation: which links an identity sees.

use clinica_auth::{Identity, Role, StaffKind};

use crate::routes::AppRoute;

/// A page inside a gated area, optionally backed by a backend collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub label: &'static str,
    pub path: &'static str,
    /// Backend collection listed on this page (`GET <api>/<resource>`).
    pub resource: Option<&'static str>,
}

const fn section(label: &'static str, path: &'static str, resource: Option<&'static str>) -> Section {
    Section { label, path, resource }
}

const ADMIN: &[Section] = &[
    section("Panel", "/admin", None),
    section("Usuarios", "/admin/usuarios", Some("usuarios")),
    section("Departamentos", "/admin/departamentos", Some("departamentos")),
    section("Medicamentos", "/admin/medicamentos", Some("medicamentos")),
    section("Reportes", "/admin/reportes", Some("reportes")),
];

const DOCTOR: &[Section] = &[
    section("Panel", "/doctor", None),
    section("Citas", "/doctor/citas", Some("citas")),
    section("Tratamientos", "/doctor/tratamientos", Some("tratamientos")),
];

const ENFERMERA: &[Section] = &[
    section("Panel", "/enfermera", None),
    section("Pacientes", "/enfermera/pacientes", Some("pacientes")),
    section("Medicamentos", "/enfermera/medicamentos", Some("medicamentos")),
];

const PACIENTE: &[Section] = &[
    section("Mi portal", "/paciente", None),
    section("Mis citas", "/paciente/citas", Some("citas")),
    section("Pagos", "/paciente/pagos", Some("pagos")),
];

const SECRETARIA: &[Section] = &[
    section("Panel", "/secretaria", None),
    section("Agenda", "/secretaria/citas", Some("citas")),
    section("Pacientes", "/secretaria/pacientes", Some("pacientes")),
];

/// Pages of a gated area (empty for public routes).
pub fn sections_for(route: AppRoute) -> &'static [Section] {
    match route {
        AppRoute::Admin => ADMIN,
        AppRoute::Doctor => DOCTOR,
        AppRoute::Enfermera => ENFERMERA,
        AppRoute::Paciente => PACIENTE,
        AppRoute::Secretaria => SECRETARIA,
        AppRoute::Home
        | AppRoute::Login
        | AppRoute::Register
        | AppRoute::PaymentSuccess
        | AppRoute::NoPermission
        | AppRoute::NotFound => &[],
    }
}

/// The section a location points at, if any.
pub fn section_at(location: &str) -> Option<&'static Section> {
    let path = location.split(['?', '#']).next().unwrap_or_default();
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    sections_for(AppRoute::resolve(path))
        .iter()
        .find(|s| s.path == path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

/// Links shown in the top navigation for `identity`.
pub fn nav_links(identity: Option<&Identity>) -> Vec<NavLink> {
    let home = NavLink {
        label: AppRoute::Home.title(),
        href: AppRoute::Home.path(),
    };

    let Some(identity) = identity else {
        return vec![
            home,
            NavLink {
                label: AppRoute::Login.title(),
                href: AppRoute::Login.path(),
            },
            NavLink {
                label: AppRoute::Register.title(),
                href: AppRoute::Register.path(),
            },
        ];
    };

    let area = match identity.role {
        Some(Role::Admin) => AppRoute::Admin,
        Some(Role::Doctor) => AppRoute::Doctor,
        Some(Role::Enfermera) => AppRoute::Enfermera,
        Some(Role::Paciente) => AppRoute::Paciente,
        Some(Role::Empleado(StaffKind::Secretaria)) => AppRoute::Secretaria,
        Some(Role::Empleado(StaffKind::General)) | None => return vec![home],
    };

    std::iter::once(home)
        .chain(sections_for(area).iter().map(|s| NavLink {
            label: s.label,
            href: s.path,
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use clinica_auth::{Decision, authorize};

    use super::*;

    fn links_for(role: Option<Role>) -> Vec<&'static str> {
        let identity = Identity::new("u", role);
        nav_links(Some(&identity)).into_iter().map(|l| l.href).collect()
    }

    #[test]
    fn anonymous_sees_public_links_only() {
        let hrefs: Vec<_> = nav_links(None).into_iter().map(|l| l.href).collect();
        assert_eq!(hrefs, vec!["/", "/login", "/register"]);
    }

    #[test]
    fn admin_only_links_are_hidden_from_others() {
        assert!(links_for(Some(Role::Admin)).contains(&"/admin/usuarios"));
        for role in Role::ALL.into_iter().filter(|r| *r != Role::Admin) {
            assert!(
                links_for(Some(role)).iter().all(|href| !href.starts_with("/admin")),
                "{role:?}"
            );
        }
    }

    #[test]
    fn roleless_and_general_staff_only_see_home() {
        assert_eq!(links_for(None), vec!["/"]);
        assert_eq!(links_for(Some(Role::Empleado(StaffKind::General))), vec!["/"]);
    }

    #[test]
    fn every_visible_link_passes_the_guard() {
        for role in Role::ALL {
            let identity = Identity::new("u", Some(role));
            for link in nav_links(Some(&identity)) {
                let route = AppRoute::resolve(link.href);
                assert_ne!(route, AppRoute::NotFound, "{}", link.href);
                if let Some(req) = route.requirement() {
                    assert_eq!(authorize(Some(&identity), &req, link.href), Decision::Allow);
                }
            }
        }
    }

    #[test]
    fn section_lookup() {
        let s = section_at("/doctor/citas?dia=hoy").unwrap();
        assert_eq!(s.resource, Some("citas"));
        assert_eq!(section_at("/doctor/").unwrap().label, "Panel");
        assert!(section_at("/doctor/desconocido").is_none());
        assert!(section_at("/login").is_none());
    }
}
