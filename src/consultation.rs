//! One consultation: reasoning, then geocoding, then facility lookups.
//!
//! Everything runs strictly in sequence on the calling thread. The clients
//! are blocking, so async callers go through `spawn_blocking`.

use serde::Serialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::location::{
    locate, FacilitySource, Geocoder, LocationError, LocationResult, NominatimClient,
    OverpassClient,
};
use crate::models::PatientIntake;
use crate::reasoning::{
    build_reasoning_client, ReasoningClient, ReasoningError, CONSULTATION_SETTINGS,
};
use crate::report::{assemble, build_consultation_prompt, MedicalReport, CONSULTATION_SYSTEM_PROMPT};

#[derive(Error, Debug)]
pub enum ServicesError {
    #[error("Reasoning client setup failed: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("Location client setup failed: {0}")]
    Location(#[from] LocationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
}

/// Banner shown above the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultationOutcome {
    pub report: MedicalReport,
    pub location: LocationResult,
    pub notices: Vec<Notice>,
}

/// External collaborators used by every consultation.
pub struct ConsultationServices {
    pub reasoning: Box<dyn ReasoningClient>,
    pub geocoder: Box<dyn Geocoder>,
    pub facilities: Box<dyn FacilitySource>,
}

impl ConsultationServices {
    pub fn new(
        reasoning: Box<dyn ReasoningClient>,
        geocoder: Box<dyn Geocoder>,
        facilities: Box<dyn FacilitySource>,
    ) -> Self {
        Self {
            reasoning,
            geocoder,
            facilities,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ServicesError> {
        let location = &config.location;
        Ok(Self::new(
            build_reasoning_client(&config.reasoning)?,
            Box::new(NominatimClient::new(&location.geocoder_url, &location.user_agent)?),
            Box::new(OverpassClient::new(&location.overpass_url, &location.user_agent)?),
        ))
    }

    /// Run the full consultation for a validated intake. Never fails: every
    /// external failure degrades to a reduced result plus a notice.
    pub fn run(&self, intake: &PatientIntake) -> ConsultationOutcome {
        let prompt = build_consultation_prompt(intake);
        let response =
            self.reasoning
                .generate(&prompt, CONSULTATION_SYSTEM_PROMPT, &CONSULTATION_SETTINGS);
        let report = assemble(intake, response);

        let location = locate(
            self.geocoder.as_ref(),
            self.facilities.as_ref(),
            &intake.location,
            intake.search_radius_meters,
        );

        let notices = notices_for(intake, &report, &location);
        tracing::info!(
            backend = self.reasoning.backend(),
            source = ?report.source,
            sections = report.sections.len(),
            location_found = location.is_available(),
            "Consultation complete"
        );

        ConsultationOutcome {
            report,
            location,
            notices,
        }
    }
}

fn notices_for(
    intake: &PatientIntake,
    report: &MedicalReport,
    location: &LocationResult,
) -> Vec<Notice> {
    let mut notices = Vec::with_capacity(2);

    if report.source.is_fallback() {
        notices.push(Notice::new(
            NoticeLevel::Info,
            "Medical analysis generated but may be incomplete. Using fallback recommendations.",
        ));
    } else {
        notices.push(Notice::new(
            NoticeLevel::Success,
            "Medical analysis completed successfully!",
        ));
    }

    if location.is_available() {
        notices.push(Notice::new(
            NoticeLevel::Success,
            format!(
                "Found location: {} ({} hospitals, {} pharmacies nearby)",
                intake.location,
                location.hospitals.len(),
                location.pharmacies.len()
            ),
        ));
    } else {
        notices.push(Notice::new(
            NoticeLevel::Warning,
            "Could not find location coordinates. Map features will be unavailable.",
        ));
    }

    notices
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::location::mock::{MockFacilitySource, MockGeocoder};
    use crate::location::Coordinates;
    use crate::reasoning::mock::MockReasoningClient;

    pub const SECTIONED_RESPONSE: &str = "POSSIBLE CONDITIONS:\n- Tension headache\n\n\
RECOMMENDED MEDICINES:\n- Paracetamol 500mg as needed\n\n\
TREATMENT PROCESS:\n- Rest in a dark room\n\n\
LIFESTYLE RECOMMENDATIONS:\n- Drink more water\n\n\
WHEN TO SEEK IMMEDIATE CARE:\n- Sudden severe headache\n\n\
FOLLOW-UP SCHEDULE:\n- See a doctor if not better in 3 days\n\n\
IMPORTANT DISCLAIMERS:\n- Not a diagnosis";

    /// Working reasoning, geocoder at the equator, no facilities.
    pub fn services() -> ConsultationServices {
        ConsultationServices::new(
            Box::new(MockReasoningClient::new(SECTIONED_RESPONSE)),
            Box::new(MockGeocoder::found(Coordinates::new(0.0, 0.0))),
            Box::new(MockFacilitySource::new()),
        )
    }

    /// Reasoning and geocoding both unavailable.
    pub fn offline_services() -> ConsultationServices {
        ConsultationServices::new(
            Box::new(MockReasoningClient::failing(ReasoningError::MissingCredentials)),
            Box::new(MockGeocoder::not_found()),
            Box::new(MockFacilitySource::new()),
        )
    }
}
