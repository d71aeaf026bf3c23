//! Patient intake: the raw submitted form and its validated counterpart.

use serde::{Deserialize, Serialize};

use super::enums::{Gender, SymptomDuration};

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;
pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 10;
pub const MIN_RADIUS_KM: u32 = 1;
pub const MAX_RADIUS_KM: u32 = 20;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Please fill in all required fields marked with *: {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),

    #[error("Age must be between 1 and 120 (got {0})")]
    AgeOutOfRange(u32),

    #[error("Symptom severity must be between 1 and 10 (got {0})")]
    SeverityOutOfRange(u8),

    #[error("Search radius must be between 1 and 20 km (got {0})")]
    RadiusOutOfRange(u32),
}

/// Form as submitted by the browser. Unvalidated.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntakeForm {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub symptoms: String,
    pub severity: u8,
    pub duration: SymptomDuration,
    pub medical_history: Option<String>,
    pub current_medications: Option<String>,
    pub allergies: Option<String>,
    pub location: String,
    pub search_radius_km: u32,
}

impl Default for IntakeForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 25,
            gender: Gender::Male,
            symptoms: String::new(),
            severity: 5,
            duration: SymptomDuration::LessThanOneDay,
            medical_history: None,
            current_medications: None,
            allergies: None,
            location: String::new(),
            search_radius_km: 5,
        }
    }
}

/// Validated intake for one consultation.
///
/// Build through [`PatientIntake::from_form`] so that name, symptoms and
/// location are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientIntake {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub symptoms: String,
    pub severity: u8,
    pub duration: SymptomDuration,
    pub medical_history: Option<String>,
    pub current_medications: Option<String>,
    pub allergies: Option<String>,
    pub location: String,
    pub search_radius_meters: u32,
}

impl PatientIntake {
    pub fn from_form(form: IntakeForm) -> Result<Self, IntakeError> {
        let name = single_line(&form.name);
        let symptoms = form.symptoms.trim().to_string();
        let location = single_line(&form.location);

        let missing: Vec<&'static str> = [
            ("name", name.is_empty()),
            ("symptoms", symptoms.is_empty()),
            ("location", location.is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, empty)| empty.then_some(field))
        .collect();
        if !missing.is_empty() {
            return Err(IntakeError::MissingRequired(missing));
        }

        if !(MIN_AGE..=MAX_AGE).contains(&form.age) {
            return Err(IntakeError::AgeOutOfRange(form.age));
        }
        if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&form.severity) {
            return Err(IntakeError::SeverityOutOfRange(form.severity));
        }
        if !(MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&form.search_radius_km) {
            return Err(IntakeError::RadiusOutOfRange(form.search_radius_km));
        }

        Ok(Self {
            name,
            age: form.age,
            gender: form.gender,
            symptoms,
            severity: form.severity,
            duration: form.duration,
            medical_history: optional_text(form.medical_history),
            current_medications: optional_text(form.current_medications),
            allergies: optional_text(form.allergies),
            location,
            search_radius_meters: form.search_radius_km * 1000,
        })
    }
}

/// Collapse line breaks, other control characters and whitespace runs into
/// single spaces. Name and location are echoed into report text and must not
/// start a line of their own there.
fn single_line(value: &str) -> String {
    value
        .split(|c: char| c.is_control() || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal valid intake used across module tests.
    pub fn intake(name: &str, symptoms: &str, location: &str) -> PatientIntake {
        PatientIntake::from_form(IntakeForm {
            name: name.into(),
            symptoms: symptoms.into(),
            location: location.into(),
            ..IntakeForm::default()
        })
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> IntakeForm {
        IntakeForm {
            name: "  Alex ".into(),
            age: 34,
            gender: Gender::Other,
            symptoms: "headache".into(),
            severity: 6,
            duration: SymptomDuration::OneToThreeDays,
            medical_history: Some("   ".into()),
            current_medications: Some(" Ibuprofen ".into()),
            allergies: None,
            location: "Testville".into(),
            search_radius_km: 7,
        }
    }

    #[test]
    fn valid_form_is_trimmed_and_converted() {
        let intake = PatientIntake::from_form(valid_form()).unwrap();
        assert_eq!(intake.name, "Alex");
        assert_eq!(intake.search_radius_meters, 7000);
        assert_eq!(intake.medical_history, None);
        assert_eq!(intake.current_medications.as_deref(), Some("Ibuprofen"));
    }

    #[test]
    fn name_and_location_are_flattened_to_one_line() {
        let form = IntakeForm {
            name: "Alex\nFOLLOW-UP SCHEDULE: none".into(),
            location: " Main St\r\n\tTestville\u{0007} ".into(),
            symptoms: "headache\nsince Monday".into(),
            ..valid_form()
        };
        let intake = PatientIntake::from_form(form).unwrap();
        assert_eq!(intake.name, "Alex FOLLOW-UP SCHEDULE: none");
        assert_eq!(intake.location, "Main St Testville");
        assert_eq!(intake.symptoms, "headache\nsince Monday");
    }

    #[test]
    fn control_only_name_counts_as_missing() {
        let form = IntakeForm {
            name: "\r\n\t".into(),
            ..valid_form()
        };
        assert_eq!(
            PatientIntake::from_form(form),
            Err(IntakeError::MissingRequired(vec!["name"]))
        );
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let form = IntakeForm {
            name: " ".into(),
            location: String::new(),
            ..valid_form()
        };
        let err = PatientIntake::from_form(form).unwrap_err();
        assert_eq!(err, IntakeError::MissingRequired(vec!["name", "location"]));
        assert!(err.to_string().starts_with("Please fill in all required fields"));
    }

    #[test]
    fn out_of_range_values_rejected() {
        let err = PatientIntake::from_form(IntakeForm { age: 0, ..valid_form() }).unwrap_err();
        assert_eq!(err, IntakeError::AgeOutOfRange(0));

        let err =
            PatientIntake::from_form(IntakeForm { severity: 11, ..valid_form() }).unwrap_err();
        assert_eq!(err, IntakeError::SeverityOutOfRange(11));

        let err = PatientIntake::from_form(IntakeForm {
            search_radius_km: 25,
            ..valid_form()
        })
        .unwrap_err();
        assert_eq!(err, IntakeError::RadiusOutOfRange(25));
    }

    #[test]
    fn form_defaults_fill_missing_json_fields() {
        let form: IntakeForm = serde_json::from_str(
            r#"{"name":"Sam","symptoms":"cough","location":"Lyon","duration":"1-2 weeks"}"#,
        )
        .unwrap();
        assert_eq!(form.age, 25);
        assert_eq!(form.severity, 5);
        assert_eq!(form.search_radius_km, 5);
        assert_eq!(form.duration, SymptomDuration::OneToTwoWeeks);
    }
}
