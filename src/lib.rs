//! # glycocheck
//!
//! Diabetes risk questionnaire with local persistence.
//!
//! This crate provides:
//! - A pure, additive diabetes risk scoring engine
//! - Assessment records keyed by user, stored in SQLite
//! - Account signup/login with Argon2id password hashes
//! - A command-line front end
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (measurements, scoring, records, users)
//! - `ports`: Trait definitions for the persistence gateway and session store
//! - `adapters`: Concrete implementations (SQLite, session files, log sanitizer)
//! - `application`: Use cases orchestrating domain and ports
//! - `cli`: Command-line interface

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{AssessmentRecord, PatientMeasurements, RiskAssessment, RiskLevel};

/// Result type for glycocheck operations
pub type Result<T> = std::result::Result<T, GlycoError>;

/// Main error type for glycocheck
#[derive(Debug, thiserror::Error)]
pub enum GlycoError {
    #[error(transparent)]
    Assessment(#[from] domain::AssessmentError),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] ports::SessionError),

    #[error("Password error: {0}")]
    Password(#[from] domain::PasswordError),

    /// A non-success response from the persistence gateway, message unchanged.
    #[error("{0}")]
    Gateway(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserExists,

    #[error("Invalid input: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GlycoError {
    /// Whether this error means nobody is logged in.
    #[must_use]
    pub fn is_not_authenticated(&self) -> bool {
        matches!(
            self,
            Self::Assessment(domain::AssessmentError::NotAuthenticated)
        )
    }
}
