//! Persistable assessment records.
//!
//! A record is the submitted questionnaire plus everything the scoring
//! engine derived from it, stamped with its owner and submission time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::measurements::PatientMeasurements;
use super::scoring::{FactorFlags, RiskAssessment, RiskLevel};
use super::user::User;

/// Errors while assembling a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    #[error("Please log in to save your assessment")]
    NotAuthenticated,
}

/// One user's current assessment, in the shape stored by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    #[serde(flatten)]
    pub measurements: PatientMeasurements,

    pub bmi: f64,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub factors: FactorFlags,

    pub user_id: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl AssessmentRecord {
    /// Compose a record from form input and engine output.
    ///
    /// The identity is passed explicitly; `None` means nobody is logged in.
    ///
    /// # Errors
    /// Returns `AssessmentError::NotAuthenticated` when `identity` is `None`.
    pub fn build(
        identity: Option<&User>,
        measurements: PatientMeasurements,
        assessment: &RiskAssessment,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Self, AssessmentError> {
        let user = identity.ok_or(AssessmentError::NotAuthenticated)?;

        Ok(Self {
            measurements,
            bmi: assessment.bmi,
            risk_score: assessment.score,
            risk_level: assessment.level,
            factors: assessment.factors,
            user_id: user.id.clone(),
            updated_at: now,
        })
    }

    /// The engine output this record was built from.
    #[must_use]
    pub fn risk_assessment(&self) -> RiskAssessment {
        RiskAssessment {
            bmi: self.bmi,
            score: self.risk_score,
            level: self.risk_level,
            factors: self.factors,
        }
    }
}
