//! Signed-in identity and where it is kept between runs.

pub mod login;

pub use login::{
    AuthError, Authenticator, LoginAction, LoginEnvironment, LoginPhase, LoginReducer, LoginState,
    LoginStore, MockAuthenticator,
};

use crate::json_file;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Who a session belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages events and attendees
    Organizer,
    /// Registers for events
    Attendee,
}

/// The signed-in user record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// User id
    pub id: String,
    /// Sign-in email
    pub email: String,
    /// Display name
    pub name: String,
    /// Role
    pub role: Role,
}

impl Session {
    /// Returns `true` for organizer sessions
    #[must_use]
    pub fn is_organizer(&self) -> bool {
        self.role == Role::Organizer
    }
}

/// Session persistence failures
#[derive(Error, Debug)]
pub enum SessionError {
    /// Reading or writing the session file failed
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),
    /// The session file does not hold a valid record
    #[error("malformed session record: {0}")]
    Json(#[from] serde_json::Error),
    /// No one is signed in
    #[error("not signed in")]
    SignedOut,
}

/// Keeps at most one session record
pub trait SessionStore: Send + Sync {
    /// Current record, `None` when signed out
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the record exists but cannot be read.
    fn load(&self) -> BoxFuture<'static, Result<Option<Session>, SessionError>>;

    /// Replace the record
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the record cannot be written.
    fn save(&self, session: Session) -> BoxFuture<'static, Result<(), SessionError>>;

    /// Remove the record; clearing an empty store succeeds
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if an existing record cannot be removed.
    fn clear(&self) -> BoxFuture<'static, Result<(), SessionError>>;
}

/// Session record kept as a JSON file
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store backed by the file at `path`; parent directories are created on save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> BoxFuture<'static, Result<Option<Session>, SessionError>> {
        let path = self.path.clone();
        Box::pin(async move { json_file::read(&path).await })
    }

    fn save(&self, session: Session) -> BoxFuture<'static, Result<(), SessionError>> {
        let path = self.path.clone();
        Box::pin(async move {
            json_file::write::<_, SessionError>(&path, &session).await?;
            tracing::debug!(path = %path.display(), user_id = %session.id, "Session saved");
            Ok(())
        })
    }

    fn clear(&self) -> BoxFuture<'static, Result<(), SessionError>> {
        let path = self.path.clone();
        Box::pin(async move { Ok(json_file::remove(&path).await?) })
    }
}

/// In-memory session store
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    session: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store already holding `session`
    #[must_use]
    pub fn signed_in(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(Some(session))),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> BoxFuture<'static, Result<Option<Session>, SessionError>> {
        let session = self.slot().clone();
        Box::pin(async move { Ok(session) })
    }

    fn save(&self, session: Session) -> BoxFuture<'static, Result<(), SessionError>> {
        *self.slot() = Some(session);
        Box::pin(async { Ok(()) })
    }

    fn clear(&self) -> BoxFuture<'static, Result<(), SessionError>> {
        *self.slot() = None;
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn organizer() -> Session {
        Session {
            id: "1".to_string(),
            email: "john@example.com".to_string(),
            name: "John Doe".to_string(),
            role: Role::Organizer,
        }
    }

    #[test]
    fn test_session_json_shape() {
        let json = serde_json::to_value(organizer()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "email": "john@example.com",
                "name": "John Doe",
                "role": "organizer",
            })
        );
    }

    #[tokio::test]
    async fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().await.unwrap().is_none());
        store.save(organizer()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(organizer()));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = FileSessionStore::new(path);
        assert!(matches!(store.load().await, Err(SessionError::Json(_))));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemorySessionStore::new();
        assert!(store.load().await.unwrap().is_none());
        store.save(organizer()).await.unwrap();
        assert!(store.load().await.unwrap().unwrap().is_organizer());
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
