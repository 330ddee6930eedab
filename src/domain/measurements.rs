//! Questionnaire input for the diabetes risk assessment.
//!
//! Field names serialize in camelCase so records stay compatible with the
//! JSON bodies exchanged with the persistence gateway.

use serde::{Deserialize, Serialize};

/// Self-reported gender. Serialized lowercase (`"male"`, `"female"`, `"other"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(format!("Unknown gender '{other}' (expected male, female or other)")),
        }
    }
}

/// Raw answers from the assessment form.
///
/// The scoring engine accepts any integer values here; range checks live in
/// [`PatientMeasurements::validate`] and are applied by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientMeasurements {
    /// Age in whole years
    pub age: i32,

    pub gender: Gender,

    /// Resting pulse in beats per minute
    pub pulse_rate: i32,

    /// Systolic blood pressure in mmHg
    pub systolic_bp: i32,

    /// Diastolic blood pressure in mmHg
    pub diastolic_bp: i32,

    /// Fasting plasma glucose in mg/dL
    pub glucose: i32,

    /// Height in centimetres
    pub height: i32,

    /// Weight in kilograms
    pub weight: i32,

    pub family_diabetes: bool,
    pub hypertensive: bool,
    pub family_hypertension: bool,
    pub cardiovascular_disease: bool,
    pub stroke: bool,
}

/// Inclusive input bounds enforced by the front end.
pub mod bounds {
    pub const AGE: (i32, i32) = (1, 120);
    pub const PULSE_RATE: (i32, i32) = (40, 200);
    pub const SYSTOLIC_BP: (i32, i32) = (50, 260);
    pub const DIASTOLIC_BP: (i32, i32) = (30, 160);
    pub const GLUCOSE: (i32, i32) = (20, 600);
    pub const HEIGHT: (i32, i32) = (100, 250);
    pub const WEIGHT: (i32, i32) = (20, 300);
}

fn check_range(errors: &mut Vec<String>, label: &str, value: i32, (min, max): (i32, i32)) {
    if !(min..=max).contains(&value) {
        errors.push(format!("{label} {value} out of range [{min}, {max}]"));
    }
}

impl PatientMeasurements {
    /// Validate that all numeric answers are within the form's bounds.
    ///
    /// # Errors
    /// Returns every violation found, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        check_range(&mut errors, "Age", self.age, bounds::AGE);
        check_range(&mut errors, "Pulse rate", self.pulse_rate, bounds::PULSE_RATE);
        check_range(&mut errors, "Systolic BP", self.systolic_bp, bounds::SYSTOLIC_BP);
        check_range(&mut errors, "Diastolic BP", self.diastolic_bp, bounds::DIASTOLIC_BP);
        check_range(&mut errors, "Glucose", self.glucose, bounds::GLUCOSE);
        check_range(&mut errors, "Height", self.height, bounds::HEIGHT);
        check_range(&mut errors, "Weight", self.weight, bounds::WEIGHT);

        if self.diastolic_bp >= self.systolic_bp && errors.is_empty() {
            errors.push(format!(
                "Diastolic BP {} must be lower than systolic BP {}",
                self.diastolic_bp, self.systolic_bp
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PatientMeasurements {
        PatientMeasurements {
            age: 50,
            gender: Gender::Female,
            pulse_rate: 72,
            systolic_bp: 145,
            diastolic_bp: 95,
            glucose: 130,
            height: 170,
            weight: 90,
            family_diabetes: true,
            hypertensive: true,
            family_hypertension: false,
            cardiovascular_disease: false,
            stroke: false,
        }
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(sample()).expect("Should serialize");
        assert_eq!(json["gender"], "female");
        assert_eq!(json["pulseRate"], 72);
        assert_eq!(json["systolicBp"], 145);
        assert_eq!(json["familyDiabetes"], true);
        assert_eq!(json["cardiovascularDisease"], false);
    }

    #[test]
    fn test_gender_parsing_is_case_sensitive() {
        assert_eq!("male".parse::<Gender>(), Ok(Gender::Male));
        assert!("Male".parse::<Gender>().is_err());
        assert!(serde_json::from_str::<Gender>("\"FEMALE\"").is_err());
    }

    #[test]
    fn test_validation() {
        assert!(sample().validate().is_ok());

        let invalid = PatientMeasurements {
            age: 0,
            height: 90,
            weight: 400,
            ..sample()
        };
        let errors = invalid.validate().expect_err("Should reject");
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_inverted_blood_pressure_rejected() {
        let invalid = PatientMeasurements {
            systolic_bp: 80,
            diastolic_bp: 90,
            ..sample()
        };
        assert!(invalid.validate().is_err());
    }
}
