//! Heading-based sectioning of a free-text recommendation.
//!
//! A heading only counts when it starts a line. Leading spaces or tabs and
//! markdown decoration (`##`, `**`, `>`, list bullets, `1.`) are allowed in
//! front of it, and a closing `**` or `__` after it is dropped. The same words appearing mid-sentence inside another section's
//! body are plain text, not a boundary.

use regex::Regex;
use serde::Serialize;

/// The seven labelled regions of a consultation report, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    PossibleConditions,
    RecommendedMedicines,
    TreatmentProcess,
    LifestyleRecommendations,
    EmergencySigns,
    FollowUpSchedule,
    Disclaimers,
}

impl SectionKey {
    pub const ALL: [SectionKey; 7] = [
        SectionKey::PossibleConditions,
        SectionKey::RecommendedMedicines,
        SectionKey::TreatmentProcess,
        SectionKey::LifestyleRecommendations,
        SectionKey::EmergencySigns,
        SectionKey::FollowUpSchedule,
        SectionKey::Disclaimers,
    ];

    /// Verbatim marker expected in the response text.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::PossibleConditions => "POSSIBLE CONDITIONS:",
            Self::RecommendedMedicines => "RECOMMENDED MEDICINES:",
            Self::TreatmentProcess => "TREATMENT PROCESS:",
            Self::LifestyleRecommendations => "LIFESTYLE RECOMMENDATIONS:",
            Self::EmergencySigns => "WHEN TO SEEK IMMEDIATE CARE:",
            Self::FollowUpSchedule => "FOLLOW-UP SCHEDULE:",
            Self::Disclaimers => "IMPORTANT DISCLAIMERS:",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::PossibleConditions => "Possible Conditions",
            Self::RecommendedMedicines => "Recommended Medicines",
            Self::TreatmentProcess => "Treatment Process",
            Self::LifestyleRecommendations => "Lifestyle Recommendations",
            Self::EmergencySigns => "When to Seek Immediate Care",
            Self::FollowUpSchedule => "Follow-up Schedule",
            Self::Disclaimers => "Important Disclaimers",
        }
    }

    pub fn from_heading(heading: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.heading() == heading)
    }
}

/// All report headings in presentation order.
pub fn report_headings() -> [&'static str; 7] {
    SectionKey::ALL.map(|k| k.heading())
}

/// One heading found in the text with its trimmed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSection<'h> {
    pub heading: &'h str,
    /// Byte offset of the heading line within the source text, decoration included.
    pub offset: usize,
    pub body: String,
}

/// Split `raw_text` into the bodies following each of `headings`.
///
/// Results follow the order of `headings`, not the order in the text.
/// Headings that never start a line are left out entirely. Markdown
/// decoration around a heading (`## `, `**...**`, `> `, `- `, `1. `) is
/// accepted and kept out of the bodies. A body ends where the nearest later
/// heading line begins, or at end of text.
pub fn parse_sections<'h>(raw_text: &str, headings: &[&'h str]) -> Vec<ExtractedSection<'h>> {
    let found = locate_headings(raw_text, headings);

    headings
        .iter()
        .zip(&found)
        .filter_map(|(heading, m)| {
            let m = (*m)?;
            let end = found
                .iter()
                .flatten()
                .map(|other| other.line_start)
                .filter(|&other| other > m.line_start)
                .min()
                .unwrap_or(raw_text.len())
                .max(m.body_start);

            Some(ExtractedSection {
                heading,
                offset: m.line_start,
                body: raw_text[m.body_start..end].trim().to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct HeadingMatch {
    /// Start of the heading line, including any decoration.
    line_start: usize,
    /// First byte after the heading and its closing decoration.
    body_start: usize,
}

/// First line-anchored match of each heading, aligned with `headings`.
fn locate_headings(raw_text: &str, headings: &[&str]) -> Vec<Option<HeadingMatch>> {
    let mut found = vec![None; headings.len()];
    let Some(pattern) = heading_pattern(headings) else {
        return found;
    };

    for caps in pattern.captures_iter(raw_text) {
        let (Some(whole), Some(heading)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let Some(idx) = headings.iter().position(|h| *h == heading.as_str()) {
            found[idx].get_or_insert(HeadingMatch {
                line_start: whole.start(),
                body_start: whole.end(),
            });
        }
    }
    found
}

fn heading_pattern(headings: &[&str]) -> Option<Regex> {
    let mut alternatives: Vec<String> = headings
        .iter()
        .filter(|h| !h.is_empty())
        .map(|h| regex::escape(h))
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    // Longest first so a heading that prefixes another cannot shadow it.
    alternatives.sort_by_key(|a| std::cmp::Reverse(a.len()));

    let pattern = format!(
        r"(?m)^[ \t]*(?:[#>*_-]+[ \t]*|\d+[.)][ \t]*)?({})(?:[ \t]*(?:\*\*|__|\*|_))?",
        alternatives.join("|")
    );
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(error = %e, "Heading pattern rejected; treating text as unstructured");
            None
        }
    }
}
