//! Session context shared by every view.

use leptos::*;

use clinica_auth::Identity;
use clinica_client::{ApiClient, ApiError, ClientConfig, HttpAuthApi, LoginResponse};
use clinica_session::{BrowserStorage, Session};

/// Root-provided handle on the session.
///
/// `identity` is the reactive mirror views render from; it is refreshed after
/// every session mutation, outside the session borrow, so effects it triggers
/// may read the session again.
#[derive(Clone, Copy)]
pub struct SessionContext {
    session: StoredValue<Session<BrowserStorage>>,
    config: StoredValue<ClientConfig>,
    pub identity: RwSignal<Option<Identity>>,
}

impl SessionContext {
    /// Restore from local storage and provide to the component tree.
    pub fn provide() -> Self {
        let session = Session::restore(BrowserStorage);
        let ctx = Self {
            identity: create_rw_signal(session.identity().cloned()),
            session: store_value(session),
            config: store_value(ClientConfig::from_env()),
        };
        provide_context(ctx);
        ctx
    }

    pub fn api(&self) -> Result<ApiClient, ApiError> {
        let config = self.config.get_value();
        self.session
            .with_value(|session| ApiClient::for_session(config, session))
    }

    pub fn auth_api(&self) -> Result<HttpAuthApi, ApiError> {
        self.api().map(HttpAuthApi::new)
    }

    /// Persist a successful login and publish the identity.
    pub fn establish(&self, login: LoginResponse) -> Result<Identity, ApiError> {
        let LoginResponse { token, user } = login;
        let mut result = Ok(());
        self.session
            .update_value(|session| result = session.establish(&token, user.clone()));
        self.sync();
        result
            .map(|_| user)
            .map_err(|e| ApiError::Session(e.to_string()))
    }

    pub fn logout(&self) {
        let mut result = Ok(());
        self.session.update_value(|session| result = session.end());
        if let Err(err) = result {
            tracing::warn!(error = %err, "logout could not clear local storage");
        }
        self.sync();
    }

    fn sync(&self) {
        let current = self
            .session
            .with_value(|session| session.identity().cloned());
        self.identity.set(current);
    }
}

pub fn use_session() -> SessionContext {
    expect_context::<SessionContext>()
}
