//! Dashboard summary built from stored assessments.
//!
//! Stat cards and the factor breakdown come from the user's current record;
//! trend series come from their submission history.

use std::sync::Arc;

use serde::Serialize;

use crate::adapters::StorageError;
use crate::domain::scoring::{self, thresholds};
use crate::domain::{score_breakdown, AssessmentError, AssessmentRecord, BmiCategory, User};
use crate::ports::PersistenceGateway;
use crate::GlycoError;

const NOT_AVAILABLE: &str = "N/A";
const NEEDS_ASSESSMENT: &str = "Complete assessment to see data";

/// One headline metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub unit: &'static str,
    pub description: String,
}

impl StatCard {
    fn unavailable(title: &'static str) -> Self {
        Self {
            title,
            value: NOT_AVAILABLE.to_string(),
            unit: "-",
            description: NEEDS_ASSESSMENT.to_string(),
        }
    }
}

/// Share of the total risk points contributed by one factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorShare {
    pub name: &'static str,
    pub points: u8,
    /// Percentage of the unclamped point total, one decimal.
    pub percent: f64,
}

/// One submission in a trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub glucose: i32,
    pub bmi: f64,
    pub systolic_bp: i32,
    pub diastolic_bp: i32,
    pub risk_score: u8,
}

impl From<&AssessmentRecord> for TrendPoint {
    fn from(r: &AssessmentRecord) -> Self {
        Self {
            submitted_at: r.updated_at,
            glucose: r.measurements.glucose,
            bmi: r.bmi,
            systolic_bp: r.measurements.systolic_bp,
            diastolic_bp: r.measurements.diastolic_bp,
            risk_score: r.risk_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub user_name: String,
    pub needs_assessment: bool,
    pub cards: Vec<StatCard>,
    pub factors: Vec<FactorShare>,
    /// Oldest first.
    pub trend: Vec<TrendPoint>,
}

fn glucose_description(glucose: i32) -> &'static str {
    if glucose >= thresholds::GLUCOSE_DIABETIC {
        "Diabetic range"
    } else if glucose >= thresholds::GLUCOSE_PREDIABETIC {
        "Prediabetic range"
    } else {
        "Normal range"
    }
}

fn blood_pressure_description(systolic: i32, diastolic: i32) -> &'static str {
    if scoring::is_high_bp(systolic, diastolic) {
        "High"
    } else if scoring::is_elevated_bp(systolic, diastolic) {
        "Elevated"
    } else {
        "Normal"
    }
}

fn cards_for(record: &AssessmentRecord) -> Vec<StatCard> {
    let m = &record.measurements;
    vec![
        StatCard {
            title: "Latest Glucose",
            value: m.glucose.to_string(),
            unit: "mg/dL",
            description: glucose_description(m.glucose).to_string(),
        },
        StatCard {
            title: "Current BMI",
            value: format!("{:.1}", record.bmi),
            unit: "kg/m²",
            description: BmiCategory::from_bmi(record.bmi).to_string(),
        },
        StatCard {
            title: "Blood Pressure",
            value: format!("{}/{}", m.systolic_bp, m.diastolic_bp),
            unit: "mmHg",
            description: blood_pressure_description(m.systolic_bp, m.diastolic_bp).to_string(),
        },
        StatCard {
            title: "Risk Score",
            value: record.risk_score.to_string(),
            unit: "/100",
            description: format!("{} risk", record.risk_level),
        },
    ]
}

fn factor_shares(record: &AssessmentRecord) -> Vec<FactorShare> {
    let breakdown = score_breakdown(&record.measurements);
    let total = breakdown.raw_total();
    if total == 0 {
        return Vec::new();
    }

    breakdown
        .entries()
        .into_iter()
        .filter(|(_, points)| *points > 0)
        .map(|(name, points)| FactorShare {
            name,
            points,
            percent: (f64::from(points) * 1000.0 / f64::from(total)).round() / 10.0,
        })
        .collect()
}

/// Service for assembling the dashboard view.
pub struct DashboardService<G>
where
    G: PersistenceGateway,
{
    gateway: Arc<G>,
}

impl<G> DashboardService<G>
where
    G: PersistenceGateway,
    G::Error: Into<StorageError>,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Summary for the logged-in user.
    ///
    /// # Errors
    /// Returns `Assessment(NotAuthenticated)` when `identity` is `None`, or a
    /// storage error.
    pub fn summary(&self, identity: Option<&User>, history_limit: usize) -> Result<DashboardSummary, GlycoError> {
        let user = identity.ok_or(AssessmentError::NotAuthenticated)?;

        let current = self
            .gateway
            .get_assessment(&user.id)
            .map_err(|e| GlycoError::Storage(e.into()))?;

        let user_name = if user.full_name.trim().is_empty() {
            "Patient".to_string()
        } else {
            user.full_name.clone()
        };

        let Some(record) = current else {
            return Ok(DashboardSummary {
                user_name,
                needs_assessment: true,
                cards: ["Latest Glucose", "Current BMI", "Blood Pressure", "Risk Score"]
                    .into_iter()
                    .map(StatCard::unavailable)
                    .collect(),
                factors: Vec::new(),
                trend: Vec::new(),
            });
        };

        let mut history = self
            .gateway
            .assessment_history(&user.id, history_limit)
            .map_err(|e| GlycoError::Storage(e.into()))?;
        history.reverse();

        Ok(DashboardSummary {
            user_name,
            needs_assessment: false,
            cards: cards_for(&record),
            factors: factor_shares(&record),
            trend: history.iter().map(TrendPoint::from).collect(),
        })
    }
}
