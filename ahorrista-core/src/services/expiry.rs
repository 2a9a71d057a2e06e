//! What happens when the backend stops accepting our token

use std::sync::Arc;

use crate::ports::{AuthFailureAction, AuthFailurePolicy, Notifier};

use super::logging::{LogEvent, LoggingService};
use super::navigation::{Navigator, Route};
use super::session::SessionState;

pub const SESSION_EXPIRED_MESSAGE: &str = "Session invalid, redirecting you to log in again";

/// Tears the session down and sends the user to login on a 401
///
/// On the login view itself a 401 is an ordinary answer (wrong password),
/// so it is handed back to the caller untouched.
pub struct SessionExpiryPolicy {
    session: Arc<SessionState>,
    navigator: Arc<Navigator>,
    notifier: Arc<dyn Notifier>,
    logger: Option<Arc<LoggingService>>,
}

impl SessionExpiryPolicy {
    pub fn new(
        session: Arc<SessionState>,
        navigator: Arc<Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            navigator,
            notifier,
            logger: None,
        }
    }

    /// Record storage failures in the event log
    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }
}

impl AuthFailurePolicy for SessionExpiryPolicy {
    fn on_auth_failure(&self) -> AuthFailureAction {
        // Memory is cleared even when storage refuses, which is enough to
        // make the guard redirect in this process
        if let Err(e) = self.session.clear() {
            if let Some(logger) = &self.logger {
                let _ = logger.log(LogEvent::new("session_clear_failed").with_failure(&e));
            }
        }

        // Only the caller that actually moves the view to login alerts;
        // on the login view, or after a concurrent redirect, the 401 is
        // an ordinary answer
        if !self.navigator.navigate(Route::Login) {
            return AuthFailureAction::Propagate;
        }

        self.notifier.alert(SESSION_EXPIRED_MESSAGE);
        AuthFailureAction::Abort
    }
}
