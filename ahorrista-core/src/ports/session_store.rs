//! Session storage port - where the token and email survive restarts

use crate::domain::result::Result;
use crate::domain::Session;

/// Persisted client state: exactly a token and an email
///
/// Implementations must treat a missing or blank token as "no session".
pub trait SessionStore: Send + Sync {
    /// Read the stored session, if any
    fn load(&self) -> Result<Option<Session>>;

    /// Persist token and email, replacing whatever was stored
    fn save(&self, session: &Session) -> Result<()>;

    /// Remove token and email
    fn clear(&self) -> Result<()>;
}
