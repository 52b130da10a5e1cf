//! Health and retry handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use packline_models::QueueMessage;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Healthcheck endpoint. Reports broker connectivity for the readiness
/// probe: 200 while connected, 503 otherwise.
pub async fn healthcheck(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    if state.broker.is_connected() {
        Ok(Json(HealthResponse {
            status: "up".to_string(),
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded".to_string(),
            }),
        ))
    }
}

#[derive(Serialize)]
pub struct RetryResponse {
    pub status: String,
    pub job_id: String,
}

/// Manual retry endpoint. Validates the body with the same schema as the
/// broker path and re-submits the message for handling.
pub async fn retry(State(state): State<AppState>, body: String) -> ApiResult<Json<RetryResponse>> {
    let message = QueueMessage::parse(&body).map_err(|e| ApiError::Validation(e.to_string()))?;
    state.broker.enqueue(&message).await?;
    info!(job_id = %message.job_id, "re-enqueued packaging message");
    Ok(Json(RetryResponse {
        status: "queued".to_string(),
        job_id: message.job_id,
    }))
}
