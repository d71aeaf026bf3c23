use axum::body::Body;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::report::{render_report, report_filename, PDF_MIME};

/// `GET /api/sessions/:id/report.pdf`
pub async fn report_pdf(
    State(ctx): State<ApiContext>,
    session_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(session_id) = session_id?;
    let consultation = ctx
        .sessions
        .consultation(&session_id)?
        .ok_or_else(|| ApiError::NotFound("No consultation to export".into()))?;

    let generated_at = chrono::Local::now().naive_local();
    let filename = report_filename(&consultation.intake.name, generated_at);

    let bytes = tokio::task::spawn_blocking(move || {
        render_report(
            &consultation.intake,
            &consultation.outcome.report,
            generated_at,
        )
    })
    .await??;

    tracing::info!(%session_id, size = bytes.len(), "Report exported");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PDF_MIME)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| ApiError::Internal(format!("response build failed: {e}")))
}
