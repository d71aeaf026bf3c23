//! Shared state and response views for the HTTP layer.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::consultation::{ConsultationOutcome, ConsultationServices, Notice};
use crate::location::{Facility, MapView};
use crate::models::PatientIntake;
use crate::report::{ReportSource, SectionKey};
use crate::session::SessionStore;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes.
#[derive(Clone)]
pub struct ApiContext {
    pub services: Arc<ConsultationServices>,
    pub sessions: Arc<SessionStore>,
}

impl ApiContext {
    pub fn new(services: ConsultationServices, sessions: SessionStore) -> Self {
        Self {
            services: Arc::new(services),
            sessions: Arc::new(sessions),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Consultation view: what the results page renders
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct SectionView {
    pub key: SectionKey,
    pub title: &'static str,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct LocationView {
    pub found: bool,
    pub hospitals: Vec<Facility>,
    pub pharmacies: Vec<Facility>,
    pub map: Option<MapView>,
}

#[derive(Debug, Serialize)]
pub struct ConsultationView {
    pub session_id: Uuid,
    pub patient: PatientIntake,
    pub source: ReportSource,
    /// False when no heading was found; render `raw_text` as-is.
    pub structured: bool,
    pub sections: Vec<SectionView>,
    pub raw_text: String,
    pub notices: Vec<Notice>,
    pub location: LocationView,
    pub report_url: String,
}

impl ConsultationView {
    pub fn new(session_id: Uuid, intake: &PatientIntake, outcome: &ConsultationOutcome) -> Self {
        let report = &outcome.report;
        let location = &outcome.location;

        let sections = SectionKey::ALL
            .iter()
            .filter_map(|key| {
                report.section(*key).map(|body| SectionView {
                    key: *key,
                    title: key.title(),
                    body: body.to_string(),
                })
            })
            .collect();

        Self {
            session_id,
            patient: intake.clone(),
            source: report.source,
            structured: report.is_structured(),
            sections,
            raw_text: report.raw_text.clone(),
            notices: outcome.notices.clone(),
            location: LocationView {
                found: location.is_available(),
                hospitals: location.display_hospitals().into_iter().cloned().collect(),
                pharmacies: location.display_pharmacies().into_iter().cloned().collect(),
                map: location.map_view(),
            },
            report_url: format!("/api/sessions/{session_id}/report.pdf"),
        }
    }
}
