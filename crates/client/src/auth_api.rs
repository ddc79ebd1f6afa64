//! Auth collaborator: `login` and `register`.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};

use clinica_auth::{Identity, Role};
use clinica_core::{DomainError, Email};
use clinica_session::{KeyValueStorage, Session};

use crate::error::extract_message;
use crate::http::read_json;
use crate::{ApiClient, ApiError};

pub const LOGIN_PATH: &str = "auth/login";
pub const REGISTER_PATH: &str = "auth/register";

pub const MIN_PASSWORD_LEN: usize = 6;

/// Successful login exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
}

impl LoginResponse {
    /// Decode `{ "token": "...", "user": { ...snapshot... } }`.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let Value::Object(mut map) = value else {
            return Err(ApiError::decode("login response is not an object"));
        };

        let token = match map.remove("token") {
            Some(Value::String(token)) if !token.trim().is_empty() => token,
            _ => return Err(ApiError::decode("login response has no token")),
        };

        let user = map
            .remove("user")
            .ok_or_else(|| ApiError::decode("login response has no user"))?;
        let user = Identity::from_snapshot_value(user).map_err(ApiError::decode)?;

        Ok(Self { token, user })
    }
}

/// Self-service registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterProfile {
    pub username: String,
    pub email: String,
    pub password: String,
    pub given_name: String,
    pub family_name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    email: Email,
    password: &'a str,
    nombre: &'a str,
    apellido: &'a str,
    rol: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    puesto: Option<Value>,
}

impl RegisterProfile {
    /// A patient registration, the default for the public register view.
    pub fn patient(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            given_name: given_name.into(),
            family_name: family_name.into(),
            role: Role::Paciente,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.body().map(|_| ())
    }

    fn body(&self) -> Result<RegisterBody<'_>, DomainError> {
        if self.username.trim().is_empty() {
            return Err(DomainError::validation("el nombre de usuario es obligatorio"));
        }
        if self.given_name.trim().is_empty() || self.family_name.trim().is_empty() {
            return Err(DomainError::validation("nombre y apellido son obligatorios"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "la contraseña debe tener al menos {MIN_PASSWORD_LEN} caracteres"
            )));
        }
        let email = Email::parse(&self.email)
            .map_err(|_| DomainError::validation("el correo electrónico no es válido"))?;

        Ok(RegisterBody {
            username: self.username.trim(),
            email,
            password: &self.password,
            nombre: self.given_name.trim(),
            apellido: self.family_name.trim(),
            rol: json!({ "nombre": self.role.wire_name() }),
            puesto: self
                .role
                .staff_kind()
                .and_then(|k| k.job_title())
                .map(|title| json!({ "nombre": title })),
        })
    }
}

/// Backend confirmation of a created account.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisteredUser {
    pub message: Option<String>,
    pub user: Option<Identity>,
}

impl RegisteredUser {
    /// Accepts `{ "message", "user": {..} }` or the created user itself.
    pub fn from_value(value: Value) -> Self {
        let message = match &value {
            Value::Object(map) => ["message", "mensaje"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .map(str::to_string),
            Value::String(s) => Some(s.clone()),
            _ => None,
        };

        let user = match &value {
            Value::Object(map) => match map.get("user") {
                Some(user) => Identity::from_snapshot_value(user.clone()).ok(),
                None if map.contains_key("username") => {
                    Identity::from_snapshot_value(value.clone()).ok()
                }
                None => None,
            },
            _ => None,
        };

        Self { message, user }
    }
}

/// Authentication contract of the backend.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    async fn register(&self, profile: &RegisterProfile) -> Result<RegisteredUser, ApiError>;
}

/// [`AuthApi`] over the REST backend.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
}

impl HttpAuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::validation("ingresa tu correo y contraseña").into());
        }

        let response = self
            .client
            .request(Method::POST, LOGIN_PATH)
            .json(&LoginBody { email, password })
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            tracing::info!(status = status.as_u16(), "login rejected");
            return Err(ApiError::InvalidCredentials {
                message: extract_message(&body),
            });
        }

        let value: Value = read_json(response).await?;
        let login = LoginResponse::from_value(value)?;
        tracing::debug!(username = %login.user.username, "login accepted");
        Ok(login)
    }

    async fn register(&self, profile: &RegisterProfile) -> Result<RegisteredUser, ApiError> {
        let body = profile.body()?;

        let response = self
            .client
            .request(Method::POST, REGISTER_PATH)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::network)?;

        let value: Value = read_json(response).await?;
        tracing::info!(username = %profile.username, "account registered");
        Ok(RegisteredUser::from_value(value))
    }
}

/// Log in and, on success, establish the session.
///
/// Failures leave the session untouched (identity stays none).
pub async fn sign_in<A, S>(
    api: &A,
    session: &mut Session<S>,
    email: &str,
    password: &str,
) -> Result<Identity, ApiError>
where
    A: AuthApi + ?Sized,
    S: KeyValueStorage,
{
    let LoginResponse { token, user } = api.login(email, password).await?;
    session
        .establish(&token, user.clone())
        .map_err(|e| ApiError::Session(e.to_string()))?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use clinica_auth::StaffKind;

    use super::*;

    #[test]
    fn login_response_decodes_token_and_user() {
        let login = LoginResponse::from_value(json!({
            "token": "jwt",
            "user": {"username": "ana", "rol": {"nombre": "DOCTOR"}}
        }))
        .unwrap();
        assert_eq!(login.token, "jwt");
        assert_eq!(login.user.role, Some(Role::Doctor));
    }

    #[test]
    fn login_response_requires_token_and_object_user() {
        for value in [
            json!({"user": {"username": "ana"}}),
            json!({"token": "", "user": {"username": "ana"}}),
            json!({"token": "jwt"}),
            json!({"token": "jwt", "user": "undefined"}),
            json!([1]),
        ] {
            assert!(matches!(LoginResponse::from_value(value), Err(ApiError::Decode(_))));
        }
    }

    #[test]
    fn register_validation() {
        let ok = RegisterProfile::patient("ana", "Ana@Clinica.com", "secreto", "Ana", "López");
        assert!(ok.validate().is_ok());

        let short = RegisterProfile { password: "123".to_string(), ..ok.clone() };
        assert!(short.validate().is_err());

        let bad_email = RegisterProfile { email: "ana".to_string(), ..ok.clone() };
        assert!(bad_email.validate().is_err());

        let nameless = RegisterProfile { family_name: " ".to_string(), ..ok };
        assert!(nameless.validate().is_err());
    }

    #[test]
    fn register_body_uses_backend_shape() {
        let profile = RegisterProfile {
            role: Role::Empleado(StaffKind::Secretaria),
            ..RegisterProfile::patient("sofia", "SOFIA@clinica.com", "secreto", "Sofía", "Ruiz")
        };
        let body = serde_json::to_value(profile.body().unwrap()).unwrap();
        assert_eq!(body["email"], json!("sofia@clinica.com"));
        assert_eq!(body["rol"]["nombre"], json!("EMPLEADO"));
        assert_eq!(body["puesto"]["nombre"], json!("Secretaria"));

        let patient = RegisterProfile::patient("p", "p@clinica.com", "secreto", "P", "Q");
        let body = serde_json::to_value(patient.body().unwrap()).unwrap();
        assert!(body.get("puesto").is_none());
    }

    #[test]
    fn registered_user_accepts_both_shapes() {
        let wrapped = RegisteredUser::from_value(json!({
            "message": "Usuario creado",
            "user": {"username": "ana", "rol": "PACIENTE"}
        }));
        assert_eq!(wrapped.message.as_deref(), Some("Usuario creado"));
        assert_eq!(wrapped.user.unwrap().role, Some(Role::Paciente));

        let bare = RegisteredUser::from_value(json!({"id": 3, "username": "ana"}));
        assert_eq!(bare.user.unwrap().id.as_deref(), Some("3"));

        assert_eq!(RegisteredUser::from_value(json!(null)), RegisteredUser::default());
    }
}
