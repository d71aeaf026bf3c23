//! PDF export of a consultation.
//!
//! The body is laid out from `raw_text` split on blank lines, independent of
//! the section headings, so any heading scheme renders without code changes.
//! PDF generation via `printpdf` builtin fonts.

use std::io::BufWriter;

use chrono::NaiveDateTime;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rgb,
};

use crate::models::PatientIntake;

use super::assembler::MedicalReport;

pub const PDF_MIME: &str = "application/pdf";

const REPORT_TITLE: &str = "MEDICARE AI - MEDICAL CONSULTATION REPORT";
const FOOTER: &str =
    "Generated by MediCare AI Assistant | This is not a substitute for professional medical advice";

// US Letter
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_LEFT_MM: f32 = 20.0;
const MARGIN_TOP_MM: f32 = 267.0;
const MARGIN_BOTTOM_MM: f32 = 18.0;
const LABEL_COLUMN_MM: f32 = 70.0;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),
}

/// Render the patient block and report into PDF bytes.
pub fn render_report(
    intake: &PatientIntake,
    report: &MedicalReport,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, ExportError> {
    let mut page = PageWriter::new(REPORT_TITLE)?;

    page.heading(REPORT_TITLE, 16.0);
    page.gap(6.0);

    page.heading("Patient Information", 13.0);
    let rows = [
        ("Patient Name:", intake.name.clone()),
        ("Age:", format!("{} years", intake.age)),
        ("Gender:", intake.gender.to_string()),
        (
            "Consultation Date:",
            generated_at.format("%Y-%m-%d %H:%M").to_string(),
        ),
        ("Symptom Severity:", format!("{}/10", intake.severity)),
        ("Duration:", intake.duration.to_string()),
        ("Location:", intake.location.clone()),
    ];
    for (label, value) in &rows {
        page.labelled_row(label, value);
    }
    page.gap(6.0);

    page.heading("Medical Analysis & Recommendations", 13.0);
    for paragraph in split_paragraphs(&report.raw_text) {
        for line in paragraph {
            page.body_line(line);
        }
        page.gap(4.0);
    }

    page.gap(8.0);
    page.footer(FOOTER);

    page.finish()
}

/// Deterministic download name: `medical_report_<name>_<YYYYmmdd_HHMM>.pdf`.
pub fn report_filename(patient_name: &str, at: NaiveDateTime) -> String {
    let mut safe: String = patient_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if safe.trim_matches('_').is_empty() {
        safe = "patient".into();
    }
    format!("medical_report_{}_{}.pdf", safe, at.format("%Y%m%d_%H%M"))
}

/// Group lines into paragraphs separated by blank (or whitespace-only) lines.
fn split_paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

/// Builtin PDF fonts only cover a Latin charset; map common typography and
/// replace anything else.
fn pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2022}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '°' => out.push_str(" deg "),
            '\t' => out.push_str("    "),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Cursor over the current page; starts a new page when the bottom margin
/// is reached.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, ExportError> {
        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Font(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Font(e.to_string()))?;

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: MARGIN_TOP_MM,
            pages: 1,
        })
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height >= MARGIN_BOTTOM_MM {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = MARGIN_TOP_MM;
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn heading(&mut self, text: &str, size: f32) {
        self.ensure_room(size * 0.6);
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.18, 0.525, 0.671, None)));
        self.layer
            .use_text(pdf_text(text), size, Mm(MARGIN_LEFT_MM), Mm(self.y), &self.bold);
        self.layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.y -= size * 0.6;
    }

    fn labelled_row(&mut self, label: &str, value: &str) {
        let lines = wrap_text(&pdf_text(value), 60);
        self.ensure_room(5.0);
        self.layer
            .use_text(label, 10.0, Mm(MARGIN_LEFT_MM), Mm(self.y), &self.bold);
        for line in lines {
            self.ensure_room(5.0);
            self.layer
                .use_text(line, 10.0, Mm(LABEL_COLUMN_MM), Mm(self.y), &self.regular);
            self.y -= 5.0;
        }
    }

    fn body_line(&mut self, text: &str) {
        for line in wrap_text(&pdf_text(text), 95) {
            self.ensure_room(5.0);
            self.layer
                .use_text(line, 10.0, Mm(MARGIN_LEFT_MM), Mm(self.y), &self.regular);
            self.y -= 5.0;
        }
    }

    fn footer(&mut self, text: &str) {
        self.ensure_room(4.0);
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None)));
        self.layer
            .use_text(text, 8.0, Mm(MARGIN_LEFT_MM), Mm(self.y), &self.regular);
        self.y -= 4.0;
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ExportError::Save(e.to_string()))?;
        buf.into_inner()
            .map_err(|e| ExportError::Save(format!("PDF buffer error: {e}")))
    }
}
