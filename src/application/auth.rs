//! Account service: signup, login and the client session.

use std::sync::Arc;

use crate::adapters::StorageError;
use crate::domain::{normalize_email, password, validate_signup, NewUser, User};
use crate::ports::{PersistenceGateway, SessionStore};
use crate::GlycoError;

/// Service for account and session management.
pub struct AuthService<G, S>
where
    G: PersistenceGateway,
    S: SessionStore,
{
    gateway: Arc<G>,
    session: Arc<S>,
}

impl<G, S> AuthService<G, S>
where
    G: PersistenceGateway,
    S: SessionStore,
    G::Error: Into<StorageError>,
{
    pub fn new(gateway: Arc<G>, session: Arc<S>) -> Self {
        Self { gateway, session }
    }

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    /// Returns `Validation` for bad fields, `UserExists` if the email is taken.
    pub fn signup(&self, email: &str, password: &str, full_name: &str) -> Result<User, GlycoError> {
        validate_signup(email, password, full_name).map_err(GlycoError::Validation)?;

        let hash = password::hash_password(password)?;
        let new_user = NewUser::new(email, full_name, hash);

        let created: Result<User, StorageError> =
            self.gateway.create_user(&new_user).map_err(Into::into);
        match created {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Signup complete");
                Ok(user)
            }
            Err(StorageError::UserExists) => Err(GlycoError::UserExists),
            Err(e) => Err(GlycoError::Storage(e)),
        }
    }

    /// Check credentials and store the user in the session.
    ///
    /// Unknown email and wrong password produce the same error.
    ///
    /// # Errors
    /// Returns `InvalidCredentials` on any mismatch.
    pub fn login(&self, email: &str, password: &str) -> Result<User, GlycoError> {
        let stored = self
            .gateway
            .find_user_by_email(&normalize_email(email))
            .map_err(|e| GlycoError::Storage(e.into()))?;

        let Some(stored) = stored else {
            password::verify_against_dummy(password)?;
            tracing::info!("Login rejected: unknown account");
            return Err(GlycoError::InvalidCredentials);
        };

        if !password::verify_password(password, &stored.password_hash)? {
            tracing::info!(user_id = %stored.user.id, "Login rejected: wrong password");
            return Err(GlycoError::InvalidCredentials);
        }

        self.session.set_current_user(Some(&stored.user))?;
        tracing::info!(user_id = %stored.user.id, "User logged in");
        Ok(stored.user)
    }

    /// Clear the session.
    ///
    /// # Errors
    /// Returns error if the session cannot be written.
    pub fn logout(&self) -> Result<(), GlycoError> {
        self.session.set_current_user(None)?;
        tracing::info!("User logged out");
        Ok(())
    }

    /// The logged-in user, if any.
    ///
    /// # Errors
    /// Returns error if the session cannot be read.
    pub fn current_user(&self) -> Result<Option<User>, GlycoError> {
        Ok(self.session.current_user()?)
    }

    /// Reflect a saved assessment in the session copy of the user.
    ///
    /// # Errors
    /// Returns error if the session cannot be written.
    pub fn mark_assessment_complete(&self, user: &User) -> Result<User, GlycoError> {
        let updated = user.with_assessment_complete();
        self.session.set_current_user(Some(&updated))?;
        Ok(updated)
    }

    /// Re-read the session user from the gateway.
    ///
    /// Logs out if the account no longer exists.
    ///
    /// # Errors
    /// Returns error if the gateway or session fails.
    pub fn refresh(&self) -> Result<Option<User>, GlycoError> {
        let Some(current) = self.session.current_user()? else {
            return Ok(None);
        };

        let fresh = self
            .gateway
            .get_user(&current.id)
            .map_err(|e| GlycoError::Storage(e.into()))?;

        self.session.set_current_user(fresh.as_ref())?;
        if fresh.is_none() {
            tracing::warn!(user_id = %current.id, "Session user no longer exists");
        }
        Ok(fresh)
    }
}
