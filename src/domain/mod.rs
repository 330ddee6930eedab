//! Domain layer: Core business types and logic.
//!
//! Pure types and functions with no I/O. The scoring engine never fails;
//! only record assembly and password handling return errors.

mod assessment;
mod measurements;
pub mod password;
pub mod scoring;
mod user;

pub use assessment::{AssessmentError, AssessmentRecord};
pub use measurements::{bounds, Gender, PatientMeasurements};
pub use password::PasswordError;
pub use scoring::{
    assess, classify_risk_level, compute_bmi, compute_risk_score, derive_factors, score_breakdown,
    BmiCategory, FactorFlags, RiskAssessment, RiskLevel, ScoreBreakdown,
};
pub use user::{normalize_email, validate_signup, NewUser, StoredUser, User, MIN_PASSWORD_LEN};
