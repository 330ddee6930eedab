//! Diabetes risk scoring engine.
//!
//! An additive point model over age, BMI, fasting glucose, blood pressure
//! and medical history. Every function here is pure and total: degenerate
//! input (zero height, negative weight, absurd ages) never fails, it simply
//! earns no points for the affected factor.
//!
//! Band cutoffs are defined once in [`thresholds`]; both the point table and
//! the factor flags read from those constants.

use serde::{Deserialize, Serialize};

use super::measurements::PatientMeasurements;

/// Risk band cutoffs and the points each band contributes.
///
/// Every lower bound is inclusive. Changing any value here changes the
/// scores of stored assessments.
pub mod thresholds {
    pub const AGE_HIGH: i32 = 45;
    pub const AGE_HIGH_POINTS: u8 = 15;
    pub const AGE_ELEVATED: i32 = 35;
    pub const AGE_ELEVATED_POINTS: u8 = 10;

    pub const BMI_OBESE: f64 = 30.0;
    pub const BMI_OBESE_POINTS: u8 = 20;
    pub const BMI_OVERWEIGHT: f64 = 25.0;
    pub const BMI_OVERWEIGHT_POINTS: u8 = 10;
    /// Only used for the dashboard category, never scored.
    pub const BMI_UNDERWEIGHT: f64 = 18.5;

    pub const GLUCOSE_DIABETIC: i32 = 126;
    pub const GLUCOSE_DIABETIC_POINTS: u8 = 25;
    pub const GLUCOSE_PREDIABETIC: i32 = 100;
    pub const GLUCOSE_PREDIABETIC_POINTS: u8 = 15;

    pub const SYSTOLIC_HIGH: i32 = 140;
    pub const DIASTOLIC_HIGH: i32 = 90;
    pub const BP_HIGH_POINTS: u8 = 15;
    pub const SYSTOLIC_ELEVATED: i32 = 130;
    pub const DIASTOLIC_ELEVATED: i32 = 85;
    pub const BP_ELEVATED_POINTS: u8 = 10;

    pub const FAMILY_DIABETES_POINTS: u8 = 15;
    pub const FAMILY_HYPERTENSION_POINTS: u8 = 5;
    pub const HYPERTENSIVE_POINTS: u8 = 10;
    pub const CARDIOVASCULAR_POINTS: u8 = 10;
    pub const STROKE_POINTS: u8 = 5;

    pub const MAX_SCORE: u8 = 100;

    pub const LEVEL_HIGH: u8 = 60;
    pub const LEVEL_MODERATE: u8 = 30;
}

use thresholds as t;

/// Risk level classification for type 2 diabetes.
///
/// Serialized capitalized (`"Low"`, `"Moderate"`, `"High"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Score below 30
    Low,
    /// Score 30 to 59
    Moderate,
    /// Score 60 and above
    High,
}

impl RiskLevel {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - keep up your current habits",
            Self::Moderate => "Moderate risk - lifestyle changes and a check-up recommended",
            Self::High => "High risk - consult a healthcare provider soon",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Moderate" => Ok(Self::Moderate),
            "High" => Ok(Self::High),
            other => Err(format!("Unknown risk level '{other}'")),
        }
    }
}

/// WHO adult BMI category, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    /// BMI could not be computed (zero or negative height/weight)
    Unknown,
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi <= 0.0 {
            Self::Unknown
        } else if bmi < t::BMI_UNDERWEIGHT {
            Self::Underweight
        } else if bmi < t::BMI_OVERWEIGHT {
            Self::Normal
        } else if bmi < t::BMI_OBESE {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "Unknown",
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        };
        f.write_str(s)
    }
}

/// Which measurements crossed a risk threshold.
///
/// Consumed by recommendation content; JSON keys match the client contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorFlags {
    #[serde(rename = "highBMI")]
    pub high_bmi: bool,
    #[serde(rename = "highGlucose")]
    pub high_glucose: bool,
    #[serde(rename = "highBP")]
    pub high_bp: bool,
    #[serde(rename = "familyHistory")]
    pub family_history: bool,
    pub cardiovascular: bool,
    #[serde(rename = "ageRisk")]
    pub age_risk: bool,
}

/// Points contributed by each factor before clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub age: u8,
    pub bmi: u8,
    pub glucose: u8,
    pub blood_pressure: u8,
    pub family_diabetes: u8,
    pub family_hypertension: u8,
    pub hypertensive: u8,
    pub cardiovascular: u8,
    pub stroke: u8,
}

impl ScoreBreakdown {
    /// Unclamped sum of all contributions.
    #[must_use]
    pub fn raw_total(&self) -> u32 {
        self.entries().iter().map(|(_, points)| u32::from(*points)).sum()
    }

    /// Sum of all contributions, capped at [`thresholds::MAX_SCORE`].
    #[must_use]
    pub fn total(&self) -> u8 {
        // Capped at 100 so the narrowing cast is lossless.
        self.raw_total().min(u32::from(t::MAX_SCORE)) as u8
    }

    /// Labelled contributions in display order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, u8); 9] {
        [
            ("Age", self.age),
            ("BMI", self.bmi),
            ("Glucose", self.glucose),
            ("Blood Pressure", self.blood_pressure),
            ("Family Diabetes", self.family_diabetes),
            ("Family Hypertension", self.family_hypertension),
            ("Hypertension", self.hypertensive),
            ("Cardiovascular", self.cardiovascular),
            ("Stroke", self.stroke),
        ]
    }
}

/// Complete output of the scoring engine for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub bmi: f64,
    pub score: u8,
    pub level: RiskLevel,
    pub factors: FactorFlags,
}

/// Body Mass Index in kg/m², rounded to one decimal place.
///
/// Returns `0.0` when either height or weight is not positive.
#[must_use]
pub fn compute_bmi(height_cm: i32, weight_kg: i32) -> f64 {
    if height_cm <= 0 || weight_kg <= 0 {
        return 0.0;
    }
    let height_m = f64::from(height_cm) / 100.0;
    let bmi = f64::from(weight_kg) / (height_m * height_m);
    (bmi * 10.0).round() / 10.0
}

pub(crate) fn is_high_bp(systolic: i32, diastolic: i32) -> bool {
    systolic >= t::SYSTOLIC_HIGH || diastolic >= t::DIASTOLIC_HIGH
}

pub(crate) fn is_elevated_bp(systolic: i32, diastolic: i32) -> bool {
    systolic >= t::SYSTOLIC_ELEVATED || diastolic >= t::DIASTOLIC_ELEVATED
}

fn points_if(condition: bool, points: u8) -> u8 {
    if condition {
        points
    } else {
        0
    }
}

/// Per-factor point contributions.
///
/// Within a factor only the highest matching band counts.
#[must_use]
pub fn score_breakdown(m: &PatientMeasurements) -> ScoreBreakdown {
    let bmi = compute_bmi(m.height, m.weight);

    let age = if m.age >= t::AGE_HIGH {
        t::AGE_HIGH_POINTS
    } else if m.age >= t::AGE_ELEVATED {
        t::AGE_ELEVATED_POINTS
    } else {
        0
    };

    let bmi_points = if bmi >= t::BMI_OBESE {
        t::BMI_OBESE_POINTS
    } else if bmi >= t::BMI_OVERWEIGHT {
        t::BMI_OVERWEIGHT_POINTS
    } else {
        0
    };

    let glucose = if m.glucose >= t::GLUCOSE_DIABETIC {
        t::GLUCOSE_DIABETIC_POINTS
    } else if m.glucose >= t::GLUCOSE_PREDIABETIC {
        t::GLUCOSE_PREDIABETIC_POINTS
    } else {
        0
    };

    let blood_pressure = if is_high_bp(m.systolic_bp, m.diastolic_bp) {
        t::BP_HIGH_POINTS
    } else if is_elevated_bp(m.systolic_bp, m.diastolic_bp) {
        t::BP_ELEVATED_POINTS
    } else {
        0
    };

    ScoreBreakdown {
        age,
        bmi: bmi_points,
        glucose,
        blood_pressure,
        family_diabetes: points_if(m.family_diabetes, t::FAMILY_DIABETES_POINTS),
        family_hypertension: points_if(m.family_hypertension, t::FAMILY_HYPERTENSION_POINTS),
        hypertensive: points_if(m.hypertensive, t::HYPERTENSIVE_POINTS),
        cardiovascular: points_if(m.cardiovascular_disease, t::CARDIOVASCULAR_POINTS),
        stroke: points_if(m.stroke, t::STROKE_POINTS),
    }
}

/// Additive risk score in `[0, 100]`.
#[must_use]
pub fn compute_risk_score(m: &PatientMeasurements) -> u8 {
    score_breakdown(m).total()
}

/// Map a score to its risk level. Boundaries belong to the higher band.
#[must_use]
pub fn classify_risk_level(score: u8) -> RiskLevel {
    if score >= t::LEVEL_HIGH {
        RiskLevel::High
    } else if score >= t::LEVEL_MODERATE {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Threshold flags for recommendation content.
///
/// Each flag tests the lowest scoring band of its factor.
#[must_use]
pub fn derive_factors(m: &PatientMeasurements, bmi: f64) -> FactorFlags {
    FactorFlags {
        high_bmi: bmi >= t::BMI_OVERWEIGHT,
        high_glucose: m.glucose >= t::GLUCOSE_PREDIABETIC,
        high_bp: is_elevated_bp(m.systolic_bp, m.diastolic_bp),
        family_history: m.family_diabetes,
        cardiovascular: m.cardiovascular_disease,
        age_risk: m.age >= t::AGE_HIGH,
    }
}

/// Run the full engine: BMI, score, level and factor flags.
#[must_use]
pub fn assess(m: &PatientMeasurements) -> RiskAssessment {
    let bmi = compute_bmi(m.height, m.weight);
    let score = compute_risk_score(m);
    RiskAssessment {
        bmi,
        score,
        level: classify_risk_level(score),
        factors: derive_factors(m, bmi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::measurements::Gender;
    use proptest::prelude::*;

    fn baseline() -> PatientMeasurements {
        PatientMeasurements {
            age: 25,
            gender: Gender::Male,
            pulse_rate: 70,
            systolic_bp: 110,
            diastolic_bp: 70,
            glucose: 85,
            height: 170,
            weight: 65,
            family_diabetes: false,
            hypertensive: false,
            family_hypertension: false,
            cardiovascular_disease: false,
            stroke: false,
        }
    }

    fn high_risk() -> PatientMeasurements {
        PatientMeasurements {
            age: 50,
            systolic_bp: 145,
            diastolic_bp: 95,
            glucose: 130,
            weight: 90,
            family_diabetes: true,
            hypertensive: true,
            ..baseline()
        }
    }

    #[test]
    fn test_bmi_rounding() {
        assert!((compute_bmi(170, 90) - 31.1).abs() < 1e-9);
        assert!((compute_bmi(170, 65) - 22.5).abs() < 1e-9);
        assert!((compute_bmi(170, 78) - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_bmi_degenerate_input() {
        assert_eq!(compute_bmi(0, 80), 0.0);
        assert_eq!(compute_bmi(180, 0), 0.0);
        assert_eq!(compute_bmi(-170, 80), 0.0);
        assert_eq!(compute_bmi(170, -5), 0.0);
    }

    #[test]
    fn test_high_risk_scenario() {
        let result = assess(&high_risk());
        assert_eq!(result.score, 100);
        assert_eq!(result.level, RiskLevel::High);
        assert_eq!(
            result.factors,
            FactorFlags {
                high_bmi: true,
                high_glucose: true,
                high_bp: true,
                family_history: true,
                cardiovascular: false,
                age_risk: true,
            }
        );
    }

    #[test]
    fn test_low_risk_scenario() {
        let result = assess(&baseline());
        assert_eq!(result.score, 0);
        assert_eq!(result.level, RiskLevel::Low);
        assert_eq!(result.factors, FactorFlags::default());
    }

    #[test]
    fn test_moderate_risk_scenario() {
        let m = PatientMeasurements {
            age: 40,
            weight: 78,
            glucose: 110,
            systolic_bp: 132,
            diastolic_bp: 86,
            family_hypertension: true,
            ..baseline()
        };
        let breakdown = score_breakdown(&m);
        assert_eq!(breakdown.age, 10);
        assert_eq!(breakdown.bmi, 10);
        assert_eq!(breakdown.glucose, 15);
        assert_eq!(breakdown.blood_pressure, 10);
        assert_eq!(breakdown.family_hypertension, 5);

        // Age 40 falls in the 35-44 band and adds 10 on top of the others.
        let result = assess(&m);
        assert_eq!(result.score, 50);
        assert_eq!(result.level, RiskLevel::Moderate);
    }

    #[test]
    fn test_score_is_clamped() {
        let m = PatientMeasurements {
            cardiovascular_disease: true,
            stroke: true,
            family_hypertension: true,
            ..high_risk()
        };
        // Every factor in its top band: 100 from the high-risk case plus
        // cardiovascular 10, stroke 5 and family hypertension 5.
        let breakdown = score_breakdown(&m);
        assert_eq!(breakdown.raw_total(), 120);
        assert!(breakdown.raw_total() > u32::from(thresholds::MAX_SCORE));
        assert_eq!(breakdown.total(), 100);
        assert_eq!(compute_risk_score(&m), 100);
        assert_eq!(assess(&m).level, RiskLevel::High);
    }

    #[test]
    fn test_band_boundaries_are_inclusive() {
        let at = |age, glucose, systolic, diastolic| PatientMeasurements {
            age,
            glucose,
            systolic_bp: systolic,
            diastolic_bp: diastolic,
            ..baseline()
        };
        assert_eq!(score_breakdown(&at(35, 85, 110, 70)).age, 10);
        assert_eq!(score_breakdown(&at(34, 85, 110, 70)).age, 0);
        assert_eq!(score_breakdown(&at(45, 85, 110, 70)).age, 15);
        assert_eq!(score_breakdown(&at(25, 100, 110, 70)).glucose, 15);
        assert_eq!(score_breakdown(&at(25, 99, 110, 70)).glucose, 0);
        assert_eq!(score_breakdown(&at(25, 126, 110, 70)).glucose, 25);
        assert_eq!(score_breakdown(&at(25, 85, 130, 70)).blood_pressure, 10);
        assert_eq!(score_breakdown(&at(25, 85, 110, 85)).blood_pressure, 10);
        assert_eq!(score_breakdown(&at(25, 85, 140, 70)).blood_pressure, 15);
        assert_eq!(score_breakdown(&at(25, 85, 110, 90)).blood_pressure, 15);
    }

    #[test]
    fn test_bmi_band_boundaries_are_inclusive() {
        let at = |height, weight| PatientMeasurements {
            height,
            weight,
            ..baseline()
        };

        let overweight = at(200, 100);
        assert_eq!(compute_bmi(200, 100), 25.0);
        assert_eq!(score_breakdown(&overweight).bmi, 10);
        assert!(assess(&overweight).factors.high_bmi);

        let obese = at(200, 120);
        assert_eq!(compute_bmi(200, 120), 30.0);
        assert_eq!(score_breakdown(&obese).bmi, 20);
        assert!(assess(&obese).factors.high_bmi);

        let normal = at(200, 99);
        assert_eq!(compute_bmi(200, 99), 24.8);
        assert_eq!(score_breakdown(&normal).bmi, 0);
        assert!(!assess(&normal).factors.high_bmi);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(classify_risk_level(0), RiskLevel::Low);
        assert_eq!(classify_risk_level(29), RiskLevel::Low);
        assert_eq!(classify_risk_level(30), RiskLevel::Moderate);
        assert_eq!(classify_risk_level(59), RiskLevel::Moderate);
        assert_eq!(classify_risk_level(60), RiskLevel::High);
        assert_eq!(classify_risk_level(100), RiskLevel::High);
    }

    #[test]
    fn test_zero_height_scores_no_bmi_points() {
        let m = PatientMeasurements {
            height: 0,
            ..high_risk()
        };
        let result = assess(&m);
        assert_eq!(result.bmi, 0.0);
        assert_eq!(score_breakdown(&m).bmi, 0);
        assert!(!result.factors.high_bmi);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(assess(&high_risk())).expect("Should serialize");
        assert_eq!(json["level"], "High");
        assert_eq!(json["factors"]["highBMI"], true);
        assert_eq!(json["factors"]["ageRisk"], true);
        assert_eq!(json["factors"]["cardiovascular"], false);
    }

    #[test]
    fn test_bmi_category() {
        assert_eq!(BmiCategory::from_bmi(0.0), BmiCategory::Unknown);
        assert_eq!(BmiCategory::from_bmi(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(22.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(31.1), BmiCategory::Obese);
    }

    fn any_measurements() -> impl Strategy<Value = PatientMeasurements> {
        (
            (any::<i32>(), any::<i32>(), any::<i32>(), any::<i32>()),
            (any::<i32>(), any::<i32>(), any::<i32>()),
            any::<[bool; 5]>(),
        )
            .prop_map(
                |((age, pulse_rate, systolic_bp, diastolic_bp), (glucose, height, weight), flags)| {
                    PatientMeasurements {
                        age,
                        gender: Gender::Other,
                        pulse_rate,
                        systolic_bp,
                        diastolic_bp,
                        glucose,
                        height,
                        weight,
                        family_diabetes: flags[0],
                        hypertensive: flags[1],
                        family_hypertension: flags[2],
                        cardiovascular_disease: flags[3],
                        stroke: flags[4],
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn prop_score_within_bounds(m in any_measurements()) {
            prop_assert!(compute_risk_score(&m) <= 100);
        }

        #[test]
        fn prop_scoring_is_deterministic(m in any_measurements()) {
            prop_assert_eq!(assess(&m), assess(&m));
        }

        #[test]
        fn prop_level_is_monotonic(a in 0u8..=100, b in 0u8..=100) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify_risk_level(lo) <= classify_risk_level(hi));
        }

        #[test]
        fn prop_zero_dimension_gives_zero_bmi(h in any::<i32>(), w in any::<i32>()) {
            prop_assert_eq!(compute_bmi(0, w), 0.0);
            prop_assert_eq!(compute_bmi(h, 0), 0.0);
        }

        #[test]
        fn prop_flags_agree_with_points(m in any_measurements()) {
            let breakdown = score_breakdown(&m);
            let flags = derive_factors(&m, compute_bmi(m.height, m.weight));
            prop_assert_eq!(flags.high_bmi, breakdown.bmi > 0);
            prop_assert_eq!(flags.high_glucose, breakdown.glucose > 0);
            prop_assert_eq!(flags.high_bp, breakdown.blood_pressure > 0);
            prop_assert_eq!(flags.age_risk, breakdown.age == thresholds::AGE_HIGH_POINTS);
        }
    }
}
