//! Ahorrista Core - client logic for the Ahorrista expense tracker
//!
//! This crate implements the client following hexagonal architecture:
//!
//! - **domain**: Entities (ExpenseSummary, ExpenseDetail, Goal, Session, ...)
//! - **ports**: Trait seams (BackendApi, SessionStore, AuthFailurePolicy)
//! - **services**: Session, navigation, auth, goals and the workspace controller
//! - **adapters**: reqwest backend client and session storage

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::{ApiClient, FileSessionStore, HttpBackend};
use config::Config;
use ports::{BackendApi, Notifier};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use services::{EntryPoint, LogEvent, LoggingService};
pub use domain::{
    AmountOperator, Expense, ExpenseCategory, ExpenseDetail, ExpenseFilter, ExpenseSummary, Goal,
    GoalFields, NewExpense, Session,
};

/// Main context for Ahorrista operations
///
/// Owns the configuration and the shared session, and wires the HTTP
/// backend to the session expiry policy.
pub struct AhorristaContext {
    pub config: Config,
    pub session: Arc<SessionState>,
    pub navigator: Arc<Navigator>,
    pub api: Arc<dyn BackendApi>,
    pub auth_service: AuthService,
    pub goal_service: GoalService,
    notifier: Arc<dyn Notifier>,
}

impl AhorristaContext {
    /// Create a context rooted at the app directory
    ///
    /// The session is restored from `session.json` and the navigator starts
    /// on the workspace if that session is usable, on login otherwise.
    pub fn new(app_dir: &Path, notifier: Arc<dyn Notifier>) -> Result<Self> {
        Self::with_logger(app_dir, notifier, None)
    }

    /// Same as `new`, with session-expiry failures recorded in the event log
    pub fn with_logger(
        app_dir: &Path,
        notifier: Arc<dyn Notifier>,
        logger: Option<Arc<LoggingService>>,
    ) -> Result<Self> {
        let config = Config::load(app_dir)?;

        let store = Arc::new(FileSessionStore::new(app_dir));
        let session = Arc::new(SessionState::restore(store.clone())?);

        let navigator = Arc::new(Navigator::new(Route::Login));
        navigator.sync_with_session(&session);

        let mut policy = SessionExpiryPolicy::new(
            Arc::clone(&session),
            Arc::clone(&navigator),
            Arc::clone(&notifier),
        );
        if let Some(logger) = logger {
            policy = policy.with_logger(logger);
        }
        let policy = Arc::new(policy);
        let client = ApiClient::new(&config.api_url, config.timeout, store, policy)?;
        let api: Arc<dyn BackendApi> = Arc::new(HttpBackend::new(client));

        let auth_service = AuthService::new(Arc::clone(&api), Arc::clone(&session));
        let goal_service = GoalService::new(Arc::clone(&api));

        Ok(Self {
            config,
            session,
            navigator,
            api,
            auth_service,
            goal_service,
            notifier,
        })
    }

    /// Fresh controller for one workspace screen
    pub fn workspace(&self) -> WorkspaceController {
        WorkspaceController::new(Arc::clone(&self.api), Arc::clone(&self.notifier))
    }

    /// Open a view through the route guard; returns the view shown
    pub fn open(&self, route: Route) -> Route {
        self.navigator.open(route, &self.session)
    }
}
