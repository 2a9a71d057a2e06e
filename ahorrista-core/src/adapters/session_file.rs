//! Session storage adapters
//!
//! `FileSessionStore` keeps `{ "token": ..., "email": ... }` in
//! `session.json` in the app directory. `MemorySessionStore` keeps it in
//! process memory, for tests and throwaway runs.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::Session;
use crate::ports::SessionStore;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// File-backed session store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(app_dir: &Path) -> Self {
        Self {
            path: app_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        // A damaged file reads as logged out, same as a missing one
        let stored: StoredSession = serde_json::from_str(&content).unwrap_or_default();

        let token = match stored.token {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Ok(None),
        };
        Ok(Some(Session::new(stored.email.unwrap_or_default(), token)))
    }

    fn save(&self, session: &Session) -> Result<()> {
        if !session.has_token() {
            return Err(Error::validation("Refusing to store a session without a token"));
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredSession {
            token: Some(session.token.clone()),
            email: Some(session.email.clone()),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
    clears: AtomicUsize,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
            clears: AtomicUsize::new(0),
        }
    }

    /// How many times `clear` has been called
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Session>>> {
        self.session
            .lock()
            .map_err(|e| Error::Other(format!("Lock poisoned: {}", e)))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.slot()?.clone().filter(|s| s.has_token()))
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.slot()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.load().unwrap().is_none());

        let session = Session::new("ana@example.com", "tok-1");
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_clear_without_file_is_ok() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.clear().unwrap();
    }

    #[test]
    fn test_blank_token_reads_as_logged_out() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SESSION_FILE),
            r#"{"token":"","email":"ana@example.com"}"#,
        )
        .unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_damaged_file_reads_as_logged_out() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_token_without_email_still_loads() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), r#"{"token":"abc"}"#).unwrap();
        let store = FileSessionStore::new(dir.path());
        let session = store.load().unwrap().unwrap();
        assert_eq!(session.token, "abc");
        assert_eq!(session.email, "");
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save(&Session::new("ana@example.com", "tok")).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_store_counts_clears() {
        let store = MemorySessionStore::with_session(Session::new("a@b.c", "t"));
        assert!(store.load().unwrap().is_some());
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.clear_count(), 1);
    }
}
