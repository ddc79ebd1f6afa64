//! Guarded rendering of role-gated destinations.

use leptos::*;
use leptos_router::*;

use clinica_auth::{Decision, LOGIN_PATH, authorize};

use crate::frontend::context::use_session;
use crate::routes::{AppRoute, requested_location};

/// Render `children` only if the current identity may open `route`;
/// otherwise redirect to login (keeping the requested path) or to the
/// no-permission page.
#[component]
pub fn Protected(route: AppRoute, children: ChildrenFn) -> impl IntoView {
    let session = use_session();
    let location = use_location();
    let requirement = route.requirement().unwrap_or_default();

    move || {
        let requested = requested_location(&location.pathname.get(), &location.search.get());
        let decision = session
            .identity
            .with(|identity| authorize(identity.as_ref(), &requirement, &requested));

        match decision {
            Decision::Allow => children().into_view(),
            denied => {
                let target = denied.location().unwrap_or_else(|| LOGIN_PATH.to_string());
                view! { <Redirect path=target/> }.into_view()
            }
        }
    }
}
