//! Leptos application with routing.

use leptos::*;
use leptos_router::*;

use crate::frontend::context::{SessionContext, use_session};
use crate::frontend::guard::Protected;
use crate::frontend::pages::*;
use crate::navigation::nav_links;
use crate::routes::AppRoute;

/// Main application component.
#[component]
pub fn App() -> impl IntoView {
    SessionContext::provide();

    view! {
        <Router>
            <div class="app">
                <NavBar/>
                <main>
                    <Routes>
                        <Route path="/" view=HomePage/>
                        <Route path="/login" view=LoginPage/>
                        <Route path="/register" view=RegisterPage/>
                        <Route path="/payment-success" view=PaymentSuccessPage/>
                        <Route path="/no-permission" view=NoPermissionPage/>
                        <Route path="/admin" view=|| gated(AppRoute::Admin)/>
                        <Route path="/admin/:section" view=|| gated(AppRoute::Admin)/>
                        <Route path="/doctor" view=|| gated(AppRoute::Doctor)/>
                        <Route path="/doctor/:section" view=|| gated(AppRoute::Doctor)/>
                        <Route path="/enfermera" view=|| gated(AppRoute::Enfermera)/>
                        <Route path="/enfermera/:section" view=|| gated(AppRoute::Enfermera)/>
                        <Route path="/paciente" view=|| gated(AppRoute::Paciente)/>
                        <Route path="/paciente/:section" view=|| gated(AppRoute::Paciente)/>
                        <Route path="/secretaria" view=|| gated(AppRoute::Secretaria)/>
                        <Route path="/secretaria/:section" view=|| gated(AppRoute::Secretaria)/>
                        <Route path="/*any" view=NotFoundPage/>
                    </Routes>
                </main>
            </div>
        </Router>
    }
}

fn gated(route: AppRoute) -> impl IntoView {
    view! {
        <Protected route=route>
            <Dashboard route=route/>
        </Protected>
    }
}

#[component]
fn NavBar() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();

    let logout = move |_: ev::MouseEvent| {
        session.logout();
        navigate(AppRoute::Login.path(), Default::default());
    };

    view! {
        <header>
            <h1>"Clínica"</h1>
            <nav>
                {move || {
                    session.identity.with(|identity| {
                        nav_links(identity.as_ref())
                            .into_iter()
                            .map(|link| view! { <A href=link.href>{link.label}</A> })
                            .collect_view()
                    })
                }}
            </nav>
            {move || {
                session.identity.get().map(|identity| {
                    let logout = logout.clone();
                    view! {
                        <div class="user">
                            <span>{identity.display_name()}</span>
                            <button on:click=logout>"Cerrar sesión"</button>
                        </div>
                    }
                })
            }}
        </header>
    }
}
