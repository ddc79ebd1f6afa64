//! `clinica-client`: REST access to the clinic backend.
//!
//! Every outgoing request goes through [`http::authorize_request`], which
//! attaches the persisted bearer token. The Auth collaborator (`login`,
//! `register`) sits behind the [`AuthApi`] trait.

pub mod auth_api;
pub mod config;
pub mod error;
pub mod http;

pub use auth_api::{AuthApi, HttpAuthApi, LoginResponse, RegisterProfile, RegisteredUser, sign_in};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{ApiClient, authorize_request};
