//! Consultation report: prompt, sectioning, fallback, assembly and PDF export.

pub mod assembler;
pub mod export;
pub mod fallback;
pub mod prompt;
pub mod sections;

pub use assembler::{assemble, is_useful_response, MedicalReport, ReportSource};
pub use export::{render_report, report_filename, ExportError, PDF_MIME};
pub use fallback::generate_fallback;
pub use prompt::{build_consultation_prompt, CONSULTATION_SYSTEM_PROMPT};
pub use sections::{parse_sections, report_headings, ExtractedSection, SectionKey};
