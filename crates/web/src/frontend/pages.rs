//! Views.

use leptos::*;
use leptos_router::*;
use serde_json::Value;

use clinica_auth::{RETURN_TO_PARAM, Role, return_path_from_query};
use clinica_client::{AuthApi, RegisterProfile};

use crate::frontend::context::use_session;
use crate::navigation::{section_at, sections_for};
use crate::routes::{AppRoute, home_for};
use crate::table::{cell_text, columns, filter_rows, sort_rows};

#[component]
pub fn HomePage() -> impl IntoView {
    let session = use_session();

    view! {
        <section class="home">
            <h2>"Clínica"</h2>
            {move || match session.identity.get() {
                Some(identity) => {
                    let home = home_for(identity.role);
                    view! {
                        <p>{format!("Bienvenido, {}", identity.display_name())}</p>
                        <A href=home.path()>{home.title()}</A>
                    }
                    .into_view()
                }
                None => view! {
                    <p>"Agenda tus citas y consulta tus tratamientos en línea."</p>
                    <A href=AppRoute::Login.path()>"Iniciar sesión"</A>
                }
                .into_view(),
            }}
        </section>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();
    let query = use_query_map();
    let navigate = use_navigate();

    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let error = create_rw_signal(None::<String>);
    let pending = create_rw_signal(false);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if pending.get_untracked() {
            return;
        }
        pending.set(true);
        error.set(None);

        let email_value = email.get_untracked();
        let password_value = password.get_untracked();
        let return_to = query.with_untracked(|q| {
            return_path_from_query(q.get(RETURN_TO_PARAM).map(String::as_str))
        });
        let navigate = navigate.clone();

        spawn_local(async move {
            let outcome = match session.auth_api() {
                Ok(api) => api.login(&email_value, &password_value).await,
                Err(err) => Err(err),
            };

            match outcome.and_then(|login| session.establish(login)) {
                Ok(identity) => {
                    let target =
                        return_to.unwrap_or_else(|| home_for(identity.role).path().to_string());
                    navigate(&target, Default::default());
                }
                Err(err) => {
                    tracing::info!(error = %err, "login failed");
                    error.set(Some(err.user_message()));
                }
            }
            pending.set(false);
        });
    };

    view! {
        <section class="login">
            <h2>{AppRoute::Login.title()}</h2>
            <form on:submit=submit>
                <div class="form-group">
                    <label for="email">"Correo electrónico"</label>
                    <input
                        type="email"
                        id="email"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label for="password">"Contraseña"</label>
                    <input
                        type="password"
                        id="password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </div>
                {move || error.get().map(|msg| view! { <p class="error">{msg}</p> })}
                <button type="submit" disabled=move || pending.get()>
                    {move || if pending.get() { "Ingresando..." } else { "Ingresar" }}
                </button>
            </form>
            <A href=AppRoute::Register.path()>"¿No tienes cuenta? Regístrate"</A>
        </section>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let session = use_session();

    let username = create_rw_signal(String::new());
    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let given_name = create_rw_signal(String::new());
    let family_name = create_rw_signal(String::new());
    let error = create_rw_signal(None::<String>);
    let done = create_rw_signal(None::<String>);
    let pending = create_rw_signal(false);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if pending.get_untracked() {
            return;
        }

        let profile = RegisterProfile::patient(
            username.get_untracked(),
            email.get_untracked(),
            password.get_untracked(),
            given_name.get_untracked(),
            family_name.get_untracked(),
        );
        if let Err(err) = profile.validate() {
            error.set(Some(clinica_client::ApiError::from(err).user_message()));
            return;
        }

        pending.set(true);
        error.set(None);
        spawn_local(async move {
            let outcome = match session.auth_api() {
                Ok(api) => api.register(&profile).await,
                Err(err) => Err(err),
            };
            match outcome {
                Ok(created) => done.set(Some(
                    created
                        .message
                        .unwrap_or_else(|| "Cuenta creada. Ya puedes iniciar sesión.".to_string()),
                )),
                Err(err) => error.set(Some(err.user_message())),
            }
            pending.set(false);
        });
    };

    let field = move |id: &'static str, label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-group">
                <label for=id>{label}</label>
                <input
                    type=kind
                    id=id
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </div>
        }
    };

    view! {
        <section class="register">
            <h2>{AppRoute::Register.title()}</h2>
            {move || match done.get() {
                Some(msg) => view! {
                    <p class="success">{msg}</p>
                    <A href=AppRoute::Login.path()>"Iniciar sesión"</A>
                }
                .into_view(),
                None => view! {
                    <form on:submit=submit>
                        {field("username", "Usuario", "text", username)}
                        {field("email", "Correo electrónico", "email", email)}
                        {field("password", "Contraseña", "password", password)}
                        {field("nombre", "Nombre", "text", given_name)}
                        {field("apellido", "Apellido", "text", family_name)}
                        {move || error.get().map(|msg| view! { <p class="error">{msg}</p> })}
                        <button type="submit" disabled=move || pending.get()>"Crear cuenta"</button>
                    </form>
                }
                .into_view(),
            }}
        </section>
    }
}

#[component]
pub fn PaymentSuccessPage() -> impl IntoView {
    let query = use_query_map();
    let reference = move || query.with(|q| q.get("session_id").cloned());

    view! {
        <section class="payment-success">
            <h2>{AppRoute::PaymentSuccess.title()}</h2>
            <p>"Tu pago fue procesado correctamente."</p>
            {move || reference().map(|r| view! { <p class="muted">{format!("Referencia: {r}")}</p> })}
            <A href=AppRoute::Paciente.path()>"Volver a mi portal"</A>
        </section>
    }
}

#[component]
pub fn NoPermissionPage() -> impl IntoView {
    view! {
        <section class="no-permission">
            <h2>{AppRoute::NoPermission.title()}</h2>
            <p>"No tienes permiso para ver esta página."</p>
            <A href=AppRoute::Home.path()>"Ir al inicio"</A>
        </section>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <section class="not-found">
            <h2>{AppRoute::NotFound.title()}</h2>
            <A href=AppRoute::Home.path()>"Ir al inicio"</A>
        </section>
    }
}

/// Landing page and sections of a gated area.
#[component]
pub fn Dashboard(route: AppRoute) -> impl IntoView {
    let session = use_session();
    let location = use_location();
    let section = move || section_at(&location.pathname.get());

    view! {
        <section class="dashboard">
            <h2>{route.title()}</h2>
            <nav class="sections">
                {sections_for(route)
                    .iter()
                    .map(|s| view! { <A href=s.path>{s.label}</A> })
                    .collect_view()}
            </nav>
            {move || match section() {
                Some(s) => match s.resource {
                    Some(resource) => view! { <ResourceView resource=resource/> }.into_view(),
                    None => view! {
                        <p>
                            {move || {
                                session
                                    .identity
                                    .get()
                                    .map(|i| {
                                        let role = i.role.map(|r: Role| r.label()).unwrap_or("");
                                        format!("{} · {}", i.display_name(), role)
                                    })
                                    .unwrap_or_default()
                            }}
                        </p>
                    }
                    .into_view(),
                },
                None => view! { <NotFoundPage/> }.into_view(),
            }}
        </section>
    }
}

/// Lists a backend collection with text filter and column sorting.
#[component]
fn ResourceView(resource: &'static str) -> impl IntoView {
    let session = use_session();
    let filter = create_rw_signal(String::new());
    let sort = create_rw_signal(None::<(String, bool)>);

    let rows = create_resource(
        move || (resource.to_string(), session.identity.get()),
        move |(resource, _identity)| async move {
            let api = session.api().map_err(|e| e.user_message())?;
            api.get_json::<Vec<Value>>(&resource)
                .await
                .map_err(|e| e.user_message())
        },
    );

    let toggle_sort = move |column: String| {
        sort.update(|current| {
            *current = match current.take() {
                Some((col, asc)) if col == column => Some((col, !asc)),
                _ => Some((column, true)),
            }
        })
    };

    view! {
        <div class="resource">
            <input
                type="search"
                placeholder="Buscar..."
                prop:value=move || filter.get()
                on:input=move |ev| filter.set(event_target_value(&ev))
            />
            <Suspense fallback=|| view! { <p>"Cargando..."</p> }>
                {move || rows.get().map(|result| match result {
                    Err(msg) => view! { <p class="notification error">{msg}</p> }.into_view(),
                    Ok(rows) if rows.is_empty() => view! { <p>"Sin registros."</p> }.into_view(),
                    Ok(rows) => {
                        let cols = columns(&rows);
                        let query = filter.get();
                        let mut visible = filter_rows(&rows, &query);
                        if let Some((col, asc)) = sort.get() {
                            sort_rows(&mut visible, &col, asc);
                        }
                        view! {
                            <table>
                                <thead>
                                    <tr>
                                        {cols.iter().map(|c| {
                                            let column = c.clone();
                                            view! {
                                                <th on:click=move |_| toggle_sort(column.clone())>{c.clone()}</th>
                                            }
                                        }).collect_view()}
                                    </tr>
                                </thead>
                                <tbody>
                                    {visible.iter().map(|row| view! {
                                        <tr>
                                            {cols.iter().map(|c| view! {
                                                <td>{row.get(c.as_str()).map(cell_text).unwrap_or_default()}</td>
                                            }).collect_view()}
                                        </tr>
                                    }).collect_view()}
                                </tbody>
                            </table>
                        }
                        .into_view()
                    }
                })}
            </Suspense>
        </div>
    }
}
