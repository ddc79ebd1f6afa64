//! Persisted/wire form of an [`Identity`].
//!
//! This is the JSON the backend returns as `user` on login and the client
//! mirrors under the `user` storage key, e.g.
//! `{"username":"ana","email":"ana@clinica.com","nombre":"Ana","apellido":"López","rol":{"nombre":"EMPLEADO"},"puesto":{"nombre":"Secretaria"}}`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::{Identity, Role};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("identity snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("identity snapshot is not a JSON object")]
    NotAnObject,
}

/// Loose serde mirror of the backend profile.
///
/// Text fields tolerate `null`; `rol` and `puesto` accept either
/// `{"nombre": "..."}` or a bare string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellido: Option<String>,
    #[serde(default, alias = "role", skip_serializing_if = "Option::is_none")]
    pub rol: Option<Value>,
    #[serde(default, alias = "cargo", skip_serializing_if = "Option::is_none")]
    pub puesto: Option<Value>,
}

fn named(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("nombre").and_then(Value::as_str),
        _ => None,
    }
}

impl IdentitySnapshot {
    pub fn into_identity(self) -> Identity {
        let role_name = self.rol.as_ref().and_then(named);
        let job_title = self.puesto.as_ref().and_then(named);

        let role = match role_name {
            Some(name) => match Role::from_parts(name, job_title) {
                Ok(role) => Some(role),
                Err(err) => {
                    tracing::warn!(error = %err, "identity carries an unrecognized role");
                    None
                }
            },
            None => None,
        };

        let id = match self.id {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Identity {
            id,
            username: self.username.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            given_name: self.nombre.unwrap_or_default(),
            family_name: self.apellido.unwrap_or_default(),
            role,
        }
    }
}

impl From<&Identity> for IdentitySnapshot {
    fn from(identity: &Identity) -> Self {
        let id = identity.id.as_ref().map(|id| match id.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(id.clone()),
        });

        Self {
            id,
            username: Some(identity.username.clone()),
            email: Some(identity.email.clone()),
            nombre: Some(identity.given_name.clone()),
            apellido: Some(identity.family_name.clone()),
            rol: identity.role.map(|r| json!({ "nombre": r.wire_name() })),
            puesto: identity
                .staff_kind()
                .and_then(|k| k.job_title())
                .map(|title| json!({ "nombre": title })),
        }
    }
}

impl Identity {
    /// Decode a snapshot. Anything but a JSON object is rejected.
    pub fn from_snapshot_json(raw: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_snapshot_value(value)
    }

    pub fn from_snapshot_value(value: Value) -> Result<Self, SnapshotError> {
        if !value.is_object() {
            return Err(SnapshotError::NotAnObject);
        }
        let snapshot: IdentitySnapshot = serde_json::from_value(value)?;
        Ok(snapshot.into_identity())
    }

    pub fn to_snapshot_json(&self) -> String {
        // A struct of strings and JSON values always serializes.
        serde_json::to_string(&IdentitySnapshot::from(self)).unwrap_or_default()
    }
}
