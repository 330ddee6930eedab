//! SQLite adapter: Implementation of PersistenceGateway.
//!
//! Tables:
//! - `users`: accounts, keyed by id, unique on normalized email. Passwords
//!   are stored only as Argon2id PHC strings.
//! - `assessments`: one current record per user (upsert).
//! - `assessment_history`: append-only log of every submission, used for
//!   trend data.
//!
//! Records are stored as their JSON body alongside a few scalar columns
//! that are useful for querying.
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{AssessmentRecord, NewUser, StoredUser, User};
use crate::ports::{PersistenceGateway, SaveOutcome};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("User already exists")]
    UserExists,

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid timestamp in storage: {0}")]
    InvalidTimestamp(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

/// SQLite persistence gateway.
pub struct SqliteGateway {
    conn: Mutex<Connection>,
}

impl SqliteGateway {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let gateway = Self {
            conn: Mutex::new(conn),
        };
        gateway.init_schema()?;
        Ok(gateway)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute_batch(
            r"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                assessment_complete INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS assessments (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                record_json TEXT NOT NULL,
                risk_score INTEGER NOT NULL,
                risk_level TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS assessment_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                record_json TEXT NOT NULL,
                risk_score INTEGER NOT NULL,
                risk_level TEXT NOT NULL,
                submitted_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_user_submitted
                ON assessment_history(user_id, submitted_at DESC);
            ",
        )?;

        Ok(())
    }

    fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, StorageError> {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|_| StorageError::InvalidTimestamp(s.to_string()))
    }

    fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            full_name: row.get(2)?,
            assessment_complete: row.get::<_, i64>(3)? != 0,
        })
    }

    fn try_save_assessment(&self, user_id: &str, record: &AssessmentRecord) -> Result<(), StorageError> {
        let mut stored = record.clone();
        stored.user_id = user_id.to_string();
        let body = serde_json::to_string(&stored)?;
        let updated_at = stored.updated_at.to_rfc3339();
        let level = stored.risk_level.as_str();

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let flagged = tx.execute(
            "UPDATE users SET assessment_complete = 1 WHERE id = ?1",
            params![user_id],
        )?;
        if flagged == 0 {
            return Err(StorageError::NotFound(user_id.to_string()));
        }

        tx.execute(
            r"
            INSERT INTO assessments (user_id, record_json, risk_score, risk_level, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id) DO UPDATE SET
                record_json = excluded.record_json,
                risk_score = excluded.risk_score,
                risk_level = excluded.risk_level,
                updated_at = excluded.updated_at
            ",
            params![user_id, body, i64::from(stored.risk_score), level, updated_at],
        )?;

        tx.execute(
            r"
            INSERT INTO assessment_history (user_id, record_json, risk_score, risk_level, submitted_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![user_id, body, i64::from(stored.risk_score), level, updated_at],
        )?;

        tx.commit()?;
        Ok(())
    }
}

impl PersistenceGateway for SqliteGateway {
    type Error = StorageError;

    fn create_user(&self, user: &NewUser) -> Result<User, Self::Error> {
        let conn = self.conn()?;

        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?1",
                params![user.email],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(StorageError::UserExists);
        }

        conn.execute(
            r"
            INSERT INTO users (id, email, full_name, password_hash, assessment_complete, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            ",
            params![
                user.id,
                user.email,
                user.full_name,
                user.password_hash,
                user.created_at.to_rfc3339(),
            ],
        )?;

        tracing::info!(user_id = %user.id, "Created user");
        Ok(User {
            id: user.id.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            assessment_complete: false,
        })
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>, Self::Error> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                r"
                SELECT id, email, full_name, assessment_complete, password_hash, created_at
                FROM users WHERE email = ?1
                ",
                params![email],
                |row| {
                    let user = Self::user_from_row(row)?;
                    let password_hash: String = row.get(4)?;
                    let created_at: String = row.get(5)?;
                    Ok((user, password_hash, created_at))
                },
            )
            .optional()?;

        match row {
            Some((user, password_hash, created_at)) => Ok(Some(StoredUser {
                user,
                password_hash,
                created_at: Self::parse_timestamp(&created_at)?,
            })),
            None => Ok(None),
        }
    }

    fn get_user(&self, user_id: &str) -> Result<Option<User>, Self::Error> {
        let conn = self.conn()?;

        let user = conn
            .query_row(
                "SELECT id, email, full_name, assessment_complete FROM users WHERE id = ?1",
                params![user_id],
                Self::user_from_row,
            )
            .optional()?;

        Ok(user)
    }

    fn save_assessment(&self, user_id: &str, record: &AssessmentRecord) -> SaveOutcome {
        match self.try_save_assessment(user_id, record) {
            Ok(()) => {
                tracing::info!(user_id, score = record.risk_score, "Assessment saved");
                SaveOutcome::ok()
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Assessment save failed");
                SaveOutcome::failed(e.to_string())
            }
        }
    }

    fn get_assessment(&self, user_id: &str) -> Result<Option<AssessmentRecord>, Self::Error> {
        let conn = self.conn()?;

        let body: Option<String> = conn
            .query_row(
                "SELECT record_json FROM assessments WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;

        tracing::debug!(user_id, found = body.is_some(), "Assessment fetched");
        body.map(|b| serde_json::from_str(&b).map_err(StorageError::from))
            .transpose()
    }

    fn assessment_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, Self::Error> {
        let conn = self.conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = conn.prepare(
            r"
            SELECT record_json FROM assessment_history
            WHERE user_id = ?1
            ORDER BY submitted_at DESC, id DESC
            LIMIT ?2
            ",
        )?;

        let bodies = stmt
            .query_map(params![user_id, limit], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        bodies
            .iter()
            .map(|b| serde_json::from_str(b).map_err(StorageError::from))
            .collect()
    }

    fn count_users(&self) -> Result<usize, Self::Error> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn clear_all(&self) -> Result<(), Self::Error> {
        let conn = self.conn()?;
        conn.execute_batch(
            "DELETE FROM assessment_history; DELETE FROM assessments; DELETE FROM users;",
        )?;
        tracing::warn!("Cleared all data from storage");
        Ok(())
    }
}
