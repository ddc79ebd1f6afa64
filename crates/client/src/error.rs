//! Backend call failures and their user-facing text.

use serde_json::Value;
use thiserror::Error;

use clinica_core::DomainError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Login rejected by the backend (bad e-mail or password).
    #[error("invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// The bearer token is missing, expired or revoked.
    #[error("unauthorized")]
    Unauthorized,

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("could not persist session: {0}")]
    Session(String),
}

impl ApiError {
    /// Map a non-success status and its body.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            _ => ApiError::Rejected {
                status,
                message: extract_message(body),
            },
        }
    }

    pub fn network(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }

    pub fn decode(err: impl core::fmt::Display) -> Self {
        ApiError::Decode(err.to_string())
    }

    /// Text suitable for an inline message or a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidCredentials { message } if !message.is_empty() => message.clone(),
            ApiError::InvalidCredentials { .. } => "Correo o contraseña incorrectos.".to_string(),
            ApiError::Unauthorized => "Tu sesión ha expirado. Inicia sesión nuevamente.".to_string(),
            ApiError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Rejected { status, .. } => {
                format!("El servidor rechazó la solicitud (código {status}).")
            }
            ApiError::Network(_) => "No se pudo conectar con el servidor.".to_string(),
            ApiError::Decode(_) => "Respuesta inesperada del servidor.".to_string(),
            ApiError::Validation(DomainError::Validation(msg) | DomainError::Unknown(msg)) => {
                msg.clone()
            }
            ApiError::Session(_) => "No se pudo guardar la sesión en este dispositivo.".to_string(),
        }
    }
}

const MESSAGE_KEYS: [&str; 4] = ["message", "mensaje", "error", "detail"];

/// Pull a human message out of an error body: `{"message": ..}`,
/// `{"mensaje": ..}`, `{"error": ..}`, `{"detail": ..}` or short plain text.
pub fn extract_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return String::new();
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => MESSAGE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(|m| m.trim().to_string())
            .unwrap_or_default(),
        Ok(Value::String(s)) => s.trim().to_string(),
        Ok(_) => String::new(),
        Err(_) if body.len() <= 200 && !body.starts_with('<') => body.to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_common_error_shapes() {
        assert_eq!(extract_message(r#"{"message":"Email ya registrado"}"#), "Email ya registrado");
        assert_eq!(extract_message(r#"{"error":"not_found","x":1}"#), "not_found");
        assert_eq!(extract_message(r#"{"mensaje":" Cita no disponible "}"#), "Cita no disponible");
        assert_eq!(extract_message("\"plain json string\""), "plain json string");
        assert_eq!(extract_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_message("<html><body>502</body></html>"), "");
        assert_eq!(extract_message("[1,2]"), "");
        assert_eq!(extract_message(""), "");
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(ApiError::from_status(401, ""), ApiError::Unauthorized));
        match ApiError::from_status(409, r#"{"message":"duplicado"}"#) {
            ApiError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicado");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn user_messages_never_empty() {
        let errors = [
            ApiError::InvalidCredentials { message: String::new() },
            ApiError::Unauthorized,
            ApiError::Rejected { status: 500, message: String::new() },
            ApiError::Network("refused".to_string()),
            ApiError::Decode("eof".to_string()),
            ApiError::Validation(DomainError::validation("la contraseña es muy corta")),
            ApiError::Session("quota".to_string()),
        ];
        for err in errors {
            assert!(!err.user_message().is_empty(), "{err:?}");
        }
        assert_eq!(
            ApiError::InvalidCredentials { message: "Credenciales inválidas".to_string() }.user_message(),
            "Credenciales inválidas"
        );
    }
}
