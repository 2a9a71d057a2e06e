//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits, so tests can swap in fakes for storage, the
//! backend and user-facing notifications.

mod auth_failure;
mod backend;
mod session_store;

pub use auth_failure::{AuthFailureAction, AuthFailurePolicy, Notifier};
pub use backend::BackendApi;
pub use session_store::SessionStore;
