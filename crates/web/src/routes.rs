//! Route table: every navigable destination and its role requirement.

use clinica_auth::{LOGIN_PATH, NO_PERMISSION_PATH, Requirement, Role, StaffKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppRoute {
    Home,
    Login,
    Register,
    PaymentSuccess,
    NoPermission,
    Admin,
    Doctor,
    Enfermera,
    Paciente,
    Secretaria,
    NotFound,
}

impl AppRoute {
    /// All routable destinations (`NotFound` has no path of its own).
    pub const ALL: [AppRoute; 10] = [
        AppRoute::Home,
        AppRoute::Login,
        AppRoute::Register,
        AppRoute::PaymentSuccess,
        AppRoute::NoPermission,
        AppRoute::Admin,
        AppRoute::Doctor,
        AppRoute::Enfermera,
        AppRoute::Paciente,
        AppRoute::Secretaria,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            AppRoute::Home => "/",
            AppRoute::Login => LOGIN_PATH,
            AppRoute::Register => "/register",
            AppRoute::PaymentSuccess => "/payment-success",
            AppRoute::NoPermission => NO_PERMISSION_PATH,
            AppRoute::Admin => "/admin",
            AppRoute::Doctor => "/doctor",
            AppRoute::Enfermera => "/enfermera",
            AppRoute::Paciente => "/paciente",
            AppRoute::Secretaria => "/secretaria",
            AppRoute::NotFound => "/404",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AppRoute::Home => "Inicio",
            AppRoute::Login => "Iniciar sesión",
            AppRoute::Register => "Registro",
            AppRoute::PaymentSuccess => "Pago exitoso",
            AppRoute::NoPermission => "Sin permiso",
            AppRoute::Admin => "Administración",
            AppRoute::Doctor => "Panel del doctor",
            AppRoute::Enfermera => "Panel de enfermería",
            AppRoute::Paciente => "Mi portal",
            AppRoute::Secretaria => "Secretaría",
            AppRoute::NotFound => "Página no encontrada",
        }
    }

    /// `None` for public destinations (rendered without consulting the
    /// guard); the role constraint for gated ones.
    pub fn requirement(&self) -> Option<Requirement> {
        let role = match self {
            AppRoute::Home
            | AppRoute::Login
            | AppRoute::Register
            | AppRoute::PaymentSuccess
            | AppRoute::NoPermission
            | AppRoute::NotFound => return None,
            AppRoute::Admin => Role::Admin,
            AppRoute::Doctor => Role::Doctor,
            AppRoute::Enfermera => Role::Enfermera,
            AppRoute::Paciente => Role::Paciente,
            AppRoute::Secretaria => Role::Empleado(StaffKind::Secretaria),
        };
        Some(Requirement::Role(role))
    }

    pub fn is_gated(&self) -> bool {
        self.requirement().is_some()
    }

    /// Resolve a location (path, optionally with query or fragment).
    ///
    /// Public routes match exactly; gated routes also own every path below
    /// them (`/admin/usuarios` is `Admin`).
    pub fn resolve(location: &str) -> AppRoute {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        AppRoute::ALL
            .into_iter()
            .find(|route| {
                let base = route.path();
                if route.is_gated() {
                    path == base || path.strip_prefix(base).is_some_and(|rest| rest.starts_with('/'))
                } else {
                    path == base
                }
            })
            .unwrap_or(AppRoute::NotFound)
    }
}

/// The location being navigated to, as handed to the guard: path plus query.
///
/// `search` may come with or without its leading `?`.
pub fn requested_location(pathname: &str, search: &str) -> String {
    let path = if pathname.is_empty() { "/" } else { pathname };
    match search.strip_prefix('?').unwrap_or(search) {
        "" => path.to_string(),
        query => format!("{path}?{query}"),
    }
}

/// Landing destination after login, per role.
pub fn home_for(role: Option<Role>) -> AppRoute {
    match role {
        Some(Role::Admin) => AppRoute::Admin,
        Some(Role::Doctor) => AppRoute::Doctor,
        Some(Role::Enfermera) => AppRoute::Enfermera,
        Some(Role::Paciente) => AppRoute::Paciente,
        Some(Role::Empleado(StaffKind::Secretaria)) => AppRoute::Secretaria,
        Some(Role::Empleado(StaffKind::General)) | None => AppRoute::Home,
    }
}


#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn subpaths_of_a_gated_area_stay_in_it(segment in "[a-z0-9-]{1,12}", query in "[a-z=&]{0,10}") {
            for route in AppRoute::ALL.into_iter().filter(AppRoute::is_gated) {
                let location = format!("{}/{}?{}", route.path(), segment, query);
                prop_assert_eq!(AppRoute::resolve(&location), route);
            }
        }

        #[test]
        fn resolve_is_total(location in "\\PC{0,40}") {
            let route = AppRoute::resolve(&location);
            prop_assert!(route == AppRoute::NotFound || AppRoute::ALL.contains(&route));
        }
    }
}
