use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::session::SessionInfo;

/// `POST /api/sessions`: called once per page load.
pub async fn create(
    State(ctx): State<ApiContext>,
) -> Result<(StatusCode, Json<SessionInfo>), ApiError> {
    let info = ctx.sessions.create()?;
    Ok((StatusCode::CREATED, Json(info)))
}
