//! Session store port: who is logged in on this client.

use crate::domain::User;

/// Errors from reading or writing the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Session state lock poisoned")]
    LockPoisoned,
}

/// Client-side holder of the current user.
///
/// Services never read this implicitly; callers fetch the user and pass it
/// on as an explicit identity.
pub trait SessionStore: Send + Sync {
    /// The logged-in user, if any.
    ///
    /// # Errors
    /// Returns error if the session cannot be read.
    fn current_user(&self) -> Result<Option<User>, SessionError>;

    /// Replace the session; `None` logs out.
    ///
    /// # Errors
    /// Returns error if the session cannot be written.
    fn set_current_user(&self, user: Option<&User>) -> Result<(), SessionError>;
}
