//! Session state - the process-wide "who is logged in"
//!
//! One `SessionState` is shared (behind `Arc`) by the auth service, the
//! expiry policy, the route guard and every screen. Changes are broadcast
//! on a watch channel so observers can re-evaluate.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::result::Result;
use crate::domain::Session;
use crate::ports::SessionStore;

pub struct SessionState {
    store: Arc<dyn SessionStore>,
    current: watch::Sender<Option<Session>>,
}

impl SessionState {
    /// Initialize from persisted storage
    pub fn restore(store: Arc<dyn SessionStore>) -> Result<Self> {
        let initial = store.load()?;
        let (current, _) = watch::channel(initial);
        Ok(Self { store, current })
    }

    /// In-memory session, if any
    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// Token as found in storage right now
    pub fn stored_token(&self) -> Option<String> {
        self.store
            .load()
            .ok()
            .flatten()
            .map(|s| s.token)
            .filter(|t| !t.trim().is_empty())
    }

    /// Authenticated means both an in-memory identity and a stored token
    pub fn is_authenticated(&self) -> bool {
        self.current().is_some() && self.stored_token().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    /// Persist and publish a fresh session
    pub fn establish(&self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        self.current.send_replace(Some(session));
        Ok(())
    }

    /// Drop the session from memory and storage
    ///
    /// Returns whether there was anything to clear, so repeated calls
    /// (several 401s in a row) touch storage only once. Memory is cleared
    /// even if storage fails.
    pub fn clear(&self) -> Result<bool> {
        let had_memory = self.current.borrow().is_some();
        let had_stored = self.store.load().ok().flatten().is_some();
        if !had_memory && !had_stored {
            return Ok(false);
        }

        self.current.send_replace(None);
        if had_stored {
            self.store.clear()?;
        }
        Ok(true)
    }
}
