//! Collaborators invoked when the backend rejects the credential

/// What the HTTP adapter should hand back after a 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureAction {
    /// The session was torn down and the user redirected; the caller gets
    /// `Error::SessionExpired` and must not render anything else
    Abort,
    /// Already on the login view; the 401 reaches the caller as a normal
    /// backend error so it can show "wrong password" and the like
    Propagate,
}

/// What happens when any call comes back 401
pub trait AuthFailurePolicy: Send + Sync {
    fn on_auth_failure(&self) -> AuthFailureAction;
}

/// Blocking, must-acknowledge user notification
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}
