//! Session store adapters.
//!
//! - `MemorySessionStore`: process-local, for tests and embedding.
//! - `FileSessionStore`: the logged-in user as a JSON file, so the CLI
//!   stays logged in between invocations. Holds no credentials.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

use crate::domain::User;
use crate::ports::{SessionError, SessionStore};

/// In-memory session.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<User>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn current_user(&self) -> Result<Option<User>, SessionError> {
        let user = self.user.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(user.clone())
    }

    fn set_current_user(&self, user: Option<&User>) -> Result<(), SessionError> {
        let mut slot = self.user.lock().map_err(|_| SessionError::LockPoisoned)?;
        *slot = user.cloned();
        Ok(())
    }
}

/// Session persisted to a JSON file (mode 0600 on Unix).
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_user(&self, user: &User) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let body = serde_json::to_vec_pretty(user)?;

        let mut options = fs::OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.path)?;
        // `mode` only applies on creation; tighten files that already existed.
        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        file.write_all(&body)?;
        file.flush()?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn current_user(&self) -> Result<Option<User>, SessionError> {
        let body = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&body)?))
    }

    fn set_current_user(&self, user: Option<&User>) -> Result<(), SessionError> {
        match user {
            Some(user) => {
                self.write_user(user)?;
                tracing::debug!(path = %self.path.display(), "Session saved");
            }
            None => match fs::remove_file(&self.path) {
                Ok(()) => tracing::debug!(path = %self.path.display(), "Session cleared"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            },
        }
        Ok(())
    }
}
