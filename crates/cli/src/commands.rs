use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};

use clinica_auth::{Decision, Identity, Role, authorize, explain};
use clinica_client::{ApiClient, AuthApi, ClientConfig, HttpAuthApi, RegisterProfile, sign_in};
use clinica_session::{FileStorage, Session};
use clinica_web::AppRoute;

#[derive(Debug, Parser)]
#[command(name = "clinica")]
#[command(about = "Clinic client: sign in, inspect the session, check route access", long_about = None)]
pub struct Cli {
    /// Session file (defaults to `<data dir>/clinica/session.json`).
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        apellido: String,
        /// ADMIN, DOCTOR, PACIENTE, ENFERMERA, SECRETARIA or EMPLEADO
        #[arg(long, default_value = "PACIENTE")]
        rol: Role,
    },
    /// Clear the persisted session
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Run the route guard for a location against the current session
    Check { path: String },
}

pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let mut session = open_session(cli.storage)?;

    match cli.command {
        Command::Login { email, password } => {
            let api = auth_api(&session)?;
            match sign_in(&api, &mut session, &email, &password).await {
                Ok(identity) => Ok(format!("Sesión iniciada: {}", describe(&identity))),
                Err(err) => {
                    tracing::warn!(error = %err, "login failed");
                    bail!(err.user_message())
                }
            }
        }
        Command::Register {
            username,
            email,
            password,
            nombre,
            apellido,
            rol,
        } => {
            let profile = RegisterProfile {
                username,
                email,
                password,
                given_name: nombre,
                family_name: apellido,
                role: rol,
            };
            if let Err(err) = profile.validate() {
                bail!(err.to_string());
            }

            let api = auth_api(&session)?;
            match api.register(&profile).await {
                Ok(created) => Ok(created
                    .message
                    .unwrap_or_else(|| format!("Cuenta creada para {}", profile.username))),
                Err(err) => {
                    tracing::warn!(error = %err, "registration failed");
                    bail!(err.user_message())
                }
            }
        }
        Command::Logout => {
            session.end().context("could not clear the session file")?;
            Ok("Sesión cerrada".to_string())
        }
        Command::Whoami => Ok(whoami(session.identity())),
        Command::Check { path } => {
            let report = check_report(session.identity(), &path);
            serde_json::to_string_pretty(&report).context("encoding report")
        }
    }
}

fn open_session(storage: Option<PathBuf>) -> anyhow::Result<Session<FileStorage>> {
    let path = match storage {
        Some(path) => path,
        None => FileStorage::default_path()
            .context("no data directory on this platform; pass --storage")?,
    };
    tracing::debug!(path = %path.display(), "opening session");
    Ok(Session::restore(FileStorage::new(path)))
}

fn auth_api(session: &Session<FileStorage>) -> anyhow::Result<HttpAuthApi> {
    let config = ClientConfig::from_env();
    let client = ApiClient::for_session(config, session).context("building HTTP client")?;
    Ok(HttpAuthApi::new(client))
}

fn describe(identity: &Identity) -> String {
    match identity.role {
        Some(role) => format!("{} ({})", identity.display_name(), role.label()),
        None => format!("{} (sin rol)", identity.display_name()),
    }
}

fn whoami(identity: Option<&Identity>) -> String {
    match identity {
        Some(identity) => describe(identity),
        None => "not logged in".to_string(),
    }
}

/// Guard outcome for `location`, as rendered by `check`.
///
/// Public destinations are never guarded: they allow and carry no explanation.
fn check_report(identity: Option<&Identity>, location: &str) -> Value {
    let route = AppRoute::resolve(location);
    let (decision, explanation) = match route.requirement() {
        Some(requirement) => (
            authorize(identity, &requirement, location),
            Some(explain(identity, &requirement)),
        ),
        None => (Decision::Allow, None),
    };

    json!({
        "path": location,
        "route": route.title(),
        "decision": decision,
        "location": decision.location(),
        "explanation": explanation,
    })
}

#[cfg(test)]
mod tests {
    use clinica_auth::StaffKind;

    use super::*;

    #[test]
    fn parses_global_storage_and_role() {
        let cli = Cli::try_parse_from([
            "clinica",
            "register",
            "--username",
            "marta",
            "--email",
            "marta@clinica.mx",
            "--password",
            "secreto1",
            "--nombre",
            "Marta",
            "--apellido",
            "Gil",
            "--rol",
            "secretaria",
            "--storage",
            "/tmp/s.json",
        ])
        .unwrap();

        assert_eq!(cli.storage, Some(PathBuf::from("/tmp/s.json")));
        match cli.command {
            Command::Register { rol, .. } => assert_eq!(rol, Role::Empleado(StaffKind::Secretaria)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(
            Cli::try_parse_from([
                "clinica", "register", "--username", "x", "--email", "x@y.z", "--password",
                "123456", "--nombre", "X", "--apellido", "Y", "--rol", "JEFE",
            ])
            .is_err()
        );
    }

    #[test]
    fn check_reports_login_redirect_for_anonymous() {
        let report = check_report(None, "/doctor/citas");
        assert_eq!(report["route"], json!(AppRoute::Doctor.title()));
        assert_eq!(report["decision"]["decision"], json!("redirect_to_login"));
        assert_eq!(report["location"], json!("/login?redirect=/doctor/citas"));
        assert_eq!(report["explanation"]["granted"], json!(false));
    }

    #[test]
    fn check_reports_no_permission_and_allow() {
        let paciente = Identity::new("pepe", Some(Role::Paciente));
        let denied = check_report(Some(&paciente), "/admin");
        assert_eq!(denied["decision"]["decision"], json!("redirect_to_no_permission"));
        assert_eq!(denied["location"], json!("/no-permission"));

        let allowed = check_report(Some(&paciente), "/paciente/pagos");
        assert_eq!(allowed["decision"]["decision"], json!("allow"));
        assert_eq!(allowed["location"], Value::Null);
    }

    #[test]
    fn public_routes_allow_anonymous() {
        let report = check_report(None, "/register");
        assert_eq!(report["decision"]["decision"], json!("allow"));
        assert_eq!(report["explanation"], Value::Null);
    }

    #[tokio::test]
    async fn whoami_and_logout_use_the_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut session = Session::restore(FileStorage::new(&path));
        session
            .establish("tok", Identity::new("ana", Some(Role::Doctor)).with_names("Ana", "López"))
            .unwrap();

        let who = run(Cli::try_parse_from(["clinica", "--storage", path.to_str().unwrap(), "whoami"]).unwrap())
            .await
            .unwrap();
        assert_eq!(who, "Ana López (Doctor)");

        run(Cli::try_parse_from(["clinica", "logout", "--storage", path.to_str().unwrap()]).unwrap())
            .await
            .unwrap();
        let who = run(Cli::try_parse_from(["clinica", "whoami", "--storage", path.to_str().unwrap()]).unwrap())
            .await
            .unwrap();
        assert_eq!(who, "not logged in");
    }
}
