//! Static report used when the reasoning service is unavailable or its answer
//! is unusable. Depends only on the patient's name.

use crate::models::PatientIntake;

pub fn generate_fallback(intake: &PatientIntake) -> String {
    format!(
        "POSSIBLE CONDITIONS:
Based on the symptoms described for {name}, here are some general considerations:
- Common viral or bacterial infections
- Stress-related conditions
- Nutritional deficiencies
- Environmental factors

RECOMMENDED MEDICINES:
- Rest and adequate hydration
- Over-the-counter pain relievers if needed (as per package instructions)
- Multivitamin supplements
- Consult pharmacist for symptom-specific medications

TREATMENT PROCESS:
1. Get adequate rest and sleep (7-9 hours daily)
2. Stay well-hydrated with water and clear fluids
3. Monitor symptoms for any changes
4. Consider gentle exercise if feeling up to it

LIFESTYLE RECOMMENDATIONS:
- Maintain a balanced diet with fruits and vegetables
- Reduce stress through relaxation techniques
- Avoid smoking and limit alcohol consumption
- Maintain good hygiene practices

WHEN TO SEEK IMMEDIATE CARE:
- High fever (over 103°F/39.4°C)
- Difficulty breathing or chest pain
- Severe dehydration
- Symptoms that worsen rapidly
- Any concerning changes in condition

FOLLOW-UP SCHEDULE:
- If symptoms persist beyond 1 week, consult a healthcare provider
- Schedule routine check-up within 2-4 weeks
- Immediate care if any emergency signs develop

IMPORTANT DISCLAIMERS:
- This is general health information only
- Not a substitute for professional medical advice
- Always consult qualified healthcare providers
- Seek emergency care when in doubt
",
        name = intake.name
    )
}
