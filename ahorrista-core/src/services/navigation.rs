//! Navigation and the route guard
//!
//! `Navigator` holds which view is showing. `RouteGuard` decides whether a
//! protected view may be shown for the current session. `Navigator::follow`
//! keeps the two in step as the session changes.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use super::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Login,
    Register,
    Workspace,
}

impl Route {
    pub fn is_protected(self) -> bool {
        matches!(self, Route::Workspace)
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Workspace => "/menu",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Admit,
    Redirect(Route),
}

/// Gate for protected views
pub struct RouteGuard;

impl RouteGuard {
    /// Admit only with an identity in memory and a token in storage
    pub fn check(session: &SessionState, route: Route) -> GuardDecision {
        if !route.is_protected() || session.is_authenticated() {
            GuardDecision::Admit
        } else {
            GuardDecision::Redirect(Route::Login)
        }
    }
}

/// Current view, observable
pub struct Navigator {
    current: watch::Sender<Route>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (current, _) = watch::channel(initial);
        Self { current }
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }

    /// Unconditional navigation (redirects use this)
    ///
    /// Returns whether the view actually changed; checking and switching
    /// happen under one lock.
    pub fn navigate(&self, route: Route) -> bool {
        self.current.send_if_modified(|current| {
            if *current == route {
                false
            } else {
                *current = route;
                true
            }
        })
    }

    /// Navigate through the guard; returns the view actually shown
    pub fn open(&self, route: Route, session: &SessionState) -> Route {
        let target = match RouteGuard::check(session, route) {
            GuardDecision::Admit => route,
            GuardDecision::Redirect(to) => to,
        };
        self.navigate(target);
        target
    }

    /// Apply the session side effects once: logged in on a public view
    /// moves to the workspace, logged out on a protected view moves to login
    pub fn sync_with_session(&self, session: &SessionState) -> Route {
        let current = self.current();
        let target = if session.is_authenticated() {
            if current.is_protected() {
                current
            } else {
                Route::Workspace
            }
        } else {
            match RouteGuard::check(session, current) {
                GuardDecision::Admit => current,
                GuardDecision::Redirect(to) => to,
            }
        };
        self.navigate(target);
        target
    }

    /// Re-evaluate on every session change until the session is dropped
    pub async fn follow(self: Arc<Self>, session: Arc<SessionState>) {
        let mut changes = session.subscribe();
        self.sync_with_session(&session);
        while changes.changed().await.is_ok() {
            self.sync_with_session(&session);
        }
    }
}
