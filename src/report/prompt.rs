use crate::models::PatientIntake;

use super::sections::SectionKey;

pub const CONSULTATION_SYSTEM_PROMPT: &str = "You are a medical AI assistant. \
Give practical, specific recommendations while maintaining medical safety. \
Always answer using the exact section headings you are asked for, each on its own line.";

/// What to ask for under each heading, in presentation order.
fn section_instructions(key: SectionKey) -> &'static str {
    match key {
        SectionKey::PossibleConditions => {
            "Based on the symptoms described, list 3-4 most likely medical conditions with brief explanations."
        }
        SectionKey::RecommendedMedicines => {
            "Suggest appropriate over-the-counter or commonly prescribed medications:\n\
             - Medicine name, typical dosage, frequency, and purpose\n\
             - Consider patient's age and any contraindications"
        }
        SectionKey::TreatmentProcess => {
            "Provide step-by-step treatment approach:\n\
             1. Immediate relief measures\n\
             2. Short-term treatment plan (1-2 weeks)\n\
             3. If needed, long-term management"
        }
        SectionKey::LifestyleRecommendations => {
            "Suggest specific lifestyle changes:\n\
             - Dietary modifications\n\
             - Activity and rest recommendations\n\
             - Environmental factors to consider"
        }
        SectionKey::EmergencySigns => {
            "List specific warning signs that require emergency attention"
        }
        SectionKey::FollowUpSchedule => "Recommend when to see a healthcare provider",
        SectionKey::Disclaimers => {
            "Include standard medical disclaimers about AI advice limitations"
        }
    }
}

/// Build the consultation prompt for one intake.
pub fn build_consultation_prompt(intake: &PatientIntake) -> String {
    let sections = SectionKey::ALL
        .iter()
        .map(|key| format!("{}\n{}", key.heading(), section_instructions(*key)))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Analyze this patient case and provide detailed recommendations.

PATIENT PROFILE:
Name: {name}
Age: {age} years
Gender: {gender}
Symptoms: {symptoms}
Severity Level: {severity}/10
Duration: {duration}
Medical History: {history}
Current Medications: {medications}
Known Allergies: {allergies}

Please provide a comprehensive medical analysis with specific details, using exactly these headings:

{sections}

Please be specific and practical in your recommendations while maintaining medical safety.
",
        name = intake.name,
        age = intake.age,
        gender = intake.gender,
        symptoms = intake.symptoms,
        severity = intake.severity,
        duration = intake.duration,
        history = intake.medical_history.as_deref().unwrap_or("None provided"),
        medications = intake.current_medications.as_deref().unwrap_or("None"),
        allergies = intake.allergies.as_deref().unwrap_or("None"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::intake::fixtures::intake;

    #[test]
    fn prompt_contains_patient_profile() {
        let mut alex = intake("Alex", "headache and nausea", "Testville");
        alex.allergies = Some("Penicillin".into());
        let prompt = build_consultation_prompt(&alex);

        assert!(prompt.contains("Name: Alex"));
        assert!(prompt.contains("Age: 25 years"));
        assert!(prompt.contains("Gender: Male"));
        assert!(prompt.contains("Symptoms: headache and nausea"));
        assert!(prompt.contains("Severity Level: 5/10"));
        assert!(prompt.contains("Duration: Less than 1 day"));
        assert!(prompt.contains("Medical History: None provided"));
        assert!(prompt.contains("Known Allergies: Penicillin"));
    }

    #[test]
    fn prompt_requests_every_heading_on_its_own_line() {
        let prompt = build_consultation_prompt(&intake("Alex", "headache", "Testville"));
        for key in SectionKey::ALL {
            assert!(
                prompt.lines().any(|l| l == key.heading()),
                "missing heading {}",
                key.heading()
            );
        }
    }
}
