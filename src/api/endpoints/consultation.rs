//! Submit, view and reset the consultation held by a session.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ConsultationView};
use crate::models::{IntakeForm, PatientIntake};

/// `POST /api/sessions/:id/consultation`
///
/// Validates the form before anything is stored or any service is called.
/// An intake identical to the session's current one returns the cached
/// outcome; otherwise the full consultation runs on a blocking worker.
pub async fn submit(
    State(ctx): State<ApiContext>,
    session_id: Result<Path<Uuid>, PathRejection>,
    form: Result<Json<IntakeForm>, JsonRejection>,
) -> Result<Json<ConsultationView>, ApiError> {
    let Path(session_id) = session_id?;
    let Json(form) = form?;
    let intake = PatientIntake::from_form(form)?;

    if let Some(outcome) = ctx.sessions.cached_outcome(&session_id, &intake)? {
        tracing::debug!(%session_id, "Returning cached consultation");
        return Ok(Json(ConsultationView::new(session_id, &intake, &outcome)));
    }

    let services = Arc::clone(&ctx.services);
    let run_intake = intake.clone();
    let outcome = tokio::task::spawn_blocking(move || services.run(&run_intake)).await?;

    let outcome = ctx.sessions.record(&session_id, intake.clone(), outcome)?;
    Ok(Json(ConsultationView::new(session_id, &intake, &outcome)))
}

/// `GET /api/sessions/:id/consultation`
pub async fn current(
    State(ctx): State<ApiContext>,
    session_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ConsultationView>, ApiError> {
    let Path(session_id) = session_id?;
    let consultation = ctx
        .sessions
        .consultation(&session_id)?
        .ok_or_else(|| ApiError::NotFound("No consultation in this session".into()))?;

    Ok(Json(ConsultationView::new(
        session_id,
        &consultation.intake,
        &consultation.outcome,
    )))
}

/// `DELETE /api/sessions/:id/consultation`: "New consultation".
pub async fn reset(
    State(ctx): State<ApiContext>,
    session_id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(session_id) = session_id?;
    ctx.sessions.reset(&session_id)?;
    tracing::debug!(%session_id, "Consultation reset");
    Ok(StatusCode::NO_CONTENT)
}
