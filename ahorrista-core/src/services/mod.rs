//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod auth;
mod expiry;
mod goals;
pub mod logging;
mod navigation;
mod session;
pub mod workspace;

pub use auth::AuthService;
pub use expiry::{SessionExpiryPolicy, SESSION_EXPIRED_MESSAGE};
pub use goals::{parse_goal_fields, GoalService};
pub use logging::{EntryPoint, LogEntry, LogEvent, LogStats, LoggingService};
pub use navigation::{GuardDecision, Navigator, Route, RouteGuard};
pub use session::SessionState;
pub use workspace::{DetailKey, DetailPanel, ExpenseForm, WorkspaceController, WorkspaceView};
