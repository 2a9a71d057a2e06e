//! Auth service - login, registration and logout

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{AuthResponse, Credentials, Session};
use crate::ports::BackendApi;

use super::session::SessionState;

/// Session lifecycle over the backend's authentication endpoints
pub struct AuthService {
    api: Arc<dyn BackendApi>,
    session: Arc<SessionState>,
}

impl AuthService {
    pub fn new(api: Arc<dyn BackendApi>, session: Arc<SessionState>) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Log in; on success the session is persisted and published
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let credentials = Self::credentials(email, password)?;
        let response = self.api.login(&credentials).await?;
        self.start_session(&credentials, response)
    }

    /// Create an account and log straight into it
    pub async fn register(&self, email: &str, password: &str) -> Result<Session> {
        let credentials = Self::credentials(email, password)?;
        let response = self.api.register(&credentials).await?;
        self.start_session(&credentials, response)
    }

    /// Forget the session locally; no network call
    pub fn logout(&self) -> Result<()> {
        self.session.clear().map(|_| ())
    }

    fn credentials(email: &str, password: &str) -> Result<Credentials> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::validation("Email is required"));
        }
        if password.is_empty() {
            return Err(Error::validation("Password is required"));
        }
        Ok(Credentials::new(email, password))
    }

    fn start_session(&self, credentials: &Credentials, response: AuthResponse) -> Result<Session> {
        if response.token.trim().is_empty() {
            return Err(Error::backend(
                200,
                Some("Authentication response did not include a token".to_string()),
            ));
        }
        let email = response
            .email()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(&credentials.email)
            .to_string();
        let session = Session::new(email, response.token);
        self.session.establish(session.clone())?;
        Ok(session)
    }
}
