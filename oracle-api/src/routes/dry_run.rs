//! Dry-run endpoints: generation and adjudication without chain access

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use oracle_core::{NormalizedPrediction, Outcome};
use serde::Serialize;
use tracing::{error, info};

use super::predictions::PredictionsResponse;
use super::{required_field, DescriptionRequest, TopicRequest};
use crate::error::ApiError;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/test/generate-predictions", post(preview_predictions))
        .route("/test/finalize-prediction", post(preview_finalization))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewFinalizeResponse {
    message: String,
    description: String,
    outcome: Outcome,
    current_data: String,
}

async fn preview_predictions(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionsResponse<NormalizedPrediction>>, ApiError> {
    let topic = required_field(&body, |r: TopicRequest| r.topic)
        .ok_or_else(|| ApiError::bad_request("Topic is required"))?;

    info!("Previewing predictions for topic: {}", topic);

    let predictions = state
        .orchestrator
        .preview_predictions(&topic)
        .await
        .map_err(|e| {
            error!("Prediction preview failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(PredictionsResponse { predictions }))
}

async fn preview_finalization(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PreviewFinalizeResponse>, ApiError> {
    let description = required_field(&body, |r: DescriptionRequest| r.description)
        .ok_or_else(|| ApiError::bad_request("Description is required"))?;

    info!("Previewing adjudication for: {}", description);

    let preview = state
        .orchestrator
        .preview_adjudication(&description)
        .await
        .map_err(|e| {
            error!("Adjudication preview failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(PreviewFinalizeResponse {
        message: "Adjudication completed (no transaction submitted)".to_string(),
        description: preview.description,
        outcome: preview.outcome,
        current_data: preview.current_data,
    }))
}
