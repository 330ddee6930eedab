//! Persistence gateway port.
//!
//! Abstracts where users and assessments live (SQLite locally, anything
//! else behind the same contract) from the application services.

use serde::{Deserialize, Serialize};

use crate::domain::{AssessmentRecord, NewUser, StoredUser, User};

/// Result of a save call, mirroring the gateway's `{success, error?}` body.
///
/// The error text is shown to the user unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveOutcome {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }

    /// Convert into a `Result`, keeping the gateway's message verbatim.
    ///
    /// # Errors
    /// Returns the error message when `success` is false.
    pub fn into_result(self) -> Result<(), String> {
        if self.success {
            Ok(())
        } else {
            Err(self.error.unwrap_or_else(|| "Unknown error occurred".to_string()))
        }
    }
}

/// Storage for accounts and assessment records.
pub trait PersistenceGateway: Send + Sync {
    /// Error type for gateway operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create an account.
    ///
    /// # Errors
    /// Fails if the email is already registered or storage fails.
    fn create_user(&self, user: &NewUser) -> Result<User, Self::Error>;

    /// Look up an account with its password hash, by normalized email.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>, Self::Error>;

    /// Fetch an account by id.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn get_user(&self, user_id: &str) -> Result<Option<User>, Self::Error>;

    /// Upsert the user's current assessment and mark their account as
    /// having completed one.
    ///
    /// Never returns `Err`: failures are reported through [`SaveOutcome`].
    fn save_assessment(&self, user_id: &str, record: &AssessmentRecord) -> SaveOutcome;

    /// Fetch the user's current assessment.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn get_assessment(&self, user_id: &str) -> Result<Option<AssessmentRecord>, Self::Error>;

    /// Past submissions, newest first, at most `limit`.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn assessment_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, Self::Error>;

    /// Number of registered accounts.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn count_users(&self) -> Result<usize, Self::Error>;

    /// Delete all accounts and assessments.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn clear_all(&self) -> Result<(), Self::Error>;
}
