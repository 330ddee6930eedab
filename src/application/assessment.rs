//! Assessment service: score a questionnaire and persist the result.
//!
//! Flow per submission:
//! 1. Score the measurements (never fails)
//! 2. Build the record for the given identity (fails if nobody is logged in)
//! 3. Save through the gateway (failures surface with the gateway's message)

use std::sync::Arc;

use serde::Serialize;

use crate::adapters::StorageError;
use crate::domain::{assess, AssessmentRecord, PatientMeasurements, RiskAssessment, User};
use crate::ports::PersistenceGateway;
use crate::GlycoError;

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub assessment: RiskAssessment,
    pub record: AssessmentRecord,
}

/// Service for submitting and reading assessments.
pub struct AssessmentService<G>
where
    G: PersistenceGateway,
{
    gateway: Arc<G>,
}

impl<G> AssessmentService<G>
where
    G: PersistenceGateway,
    G::Error: Into<StorageError>,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Score and save a questionnaire for `identity`, stamped with the current time.
    ///
    /// # Errors
    /// See [`AssessmentService::submit_at`].
    pub fn submit(
        &self,
        identity: Option<&User>,
        measurements: PatientMeasurements,
    ) -> Result<Submission, GlycoError> {
        self.submit_at(identity, measurements, chrono::Utc::now())
    }

    /// Score and save a questionnaire with an explicit timestamp.
    ///
    /// Nothing is written when `identity` is `None`. The gateway is called
    /// once; there is no retry.
    ///
    /// # Errors
    /// - `Assessment(NotAuthenticated)` if `identity` is `None`
    /// - `Gateway(message)` if the gateway reports failure
    pub fn submit_at(
        &self,
        identity: Option<&User>,
        measurements: PatientMeasurements,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Submission, GlycoError> {
        let assessment = assess(&measurements);
        tracing::debug!(
            score = assessment.score,
            level = %assessment.level,
            "Scored assessment"
        );

        let record = AssessmentRecord::build(identity, measurements, &assessment, now)?;

        self.gateway
            .save_assessment(&record.user_id, &record)
            .into_result()
            .map_err(GlycoError::Gateway)?;

        tracing::info!(
            user_id = %record.user_id,
            score = assessment.score,
            level = %assessment.level,
            "Assessment submitted"
        );

        Ok(Submission { assessment, record })
    }

    /// The user's current assessment, if they have submitted one.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    pub fn current(&self, user: &User) -> Result<Option<AssessmentRecord>, GlycoError> {
        self.gateway
            .get_assessment(&user.id)
            .map_err(|e| GlycoError::Storage(e.into()))
    }

    /// Past submissions, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    pub fn history(&self, user: &User, limit: usize) -> Result<Vec<AssessmentRecord>, GlycoError> {
        self.gateway
            .assessment_history(&user.id, limit)
            .map_err(|e| GlycoError::Storage(e.into()))
    }
}
