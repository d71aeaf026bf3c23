//! Turns a reasoning outcome into a displayable [`MedicalReport`].
//!
//! Fallback substitution happens here, once, before the text reaches the
//! section parser.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::PatientIntake;
use crate::reasoning::ReasoningError;

use super::fallback::generate_fallback;
use super::sections::{parse_sections, report_headings, SectionKey};

/// Trimmed responses must be longer than this to be used as-is.
pub const MIN_USEFUL_RESPONSE_CHARS: usize = 50;

/// Where the report text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    Reasoning,
    /// The reasoning call failed outright.
    FallbackUnavailable,
    /// The reasoning call answered, but too little to be useful.
    FallbackLowQuality,
}

impl ReportSource {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::Reasoning)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicalReport {
    pub raw_text: String,
    pub sections: BTreeMap<SectionKey, String>,
    pub source: ReportSource,
}

impl MedicalReport {
    /// Parse `raw_text` with the fixed report headings.
    pub fn from_raw_text(raw_text: String, source: ReportSource) -> Self {
        let sections = parse_sections(&raw_text, &report_headings())
            .into_iter()
            .filter_map(|s| SectionKey::from_heading(s.heading).map(|k| (k, s.body)))
            .collect();
        Self {
            raw_text,
            sections,
            source,
        }
    }

    /// False when no heading was recognised; display `raw_text` verbatim.
    pub fn is_structured(&self) -> bool {
        !self.sections.is_empty()
    }

    pub fn section(&self, key: SectionKey) -> Option<&str> {
        self.sections.get(&key).map(String::as_str)
    }
}

/// Whether a reasoning response is worth showing.
pub fn is_useful_response(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().count() > MIN_USEFUL_RESPONSE_CHARS
}

/// Pick the report text: the response when usable, else the fallback.
pub fn resolve_raw_text(
    intake: &PatientIntake,
    outcome: Result<String, ReasoningError>,
) -> (String, ReportSource) {
    match outcome {
        Ok(text) if is_useful_response(&text) => (text, ReportSource::Reasoning),
        Ok(text) => {
            tracing::warn!(
                chars = text.trim().chars().count(),
                "Reasoning response too short; using fallback report"
            );
            (generate_fallback(intake), ReportSource::FallbackLowQuality)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Reasoning call failed; using fallback report");
            (generate_fallback(intake), ReportSource::FallbackUnavailable)
        }
    }
}

/// Resolve the text for `intake` and split it into sections.
pub fn assemble(
    intake: &PatientIntake,
    outcome: Result<String, ReasoningError>,
) -> MedicalReport {
    let (raw_text, source) = resolve_raw_text(intake, outcome);
    let report = MedicalReport::from_raw_text(raw_text, source);
    tracing::debug!(
        sections = report.sections.len(),
        structured = report.is_structured(),
        ?source,
        "Report assembled"
    );
    report
}
