//! Prediction lifecycle endpoints (chain writes and reads)

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use oracle_chain::Address;
use oracle_core::{OnChainPrediction, Outcome, UserStats};
use oracle_services::PredictionSubmission;
use serde::Serialize;
use tracing::{error, info};

use super::{required_field, TopicRequest};
use crate::error::ApiError;
use crate::AppState;

/// Create prediction routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/generate-predictions", post(generate_predictions))
        .route("/finalize-prediction/{id}", post(finalize_prediction))
        .route("/prediction/{id}", get(get_prediction))
        .route("/user-stats/{address}", get(get_user_stats))
}

#[derive(Debug, Serialize)]
pub struct PredictionsResponse<T> {
    pub predictions: Vec<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub message: String,
    pub outcome: Outcome,
    pub transaction_hash: String,
}

/// Generate predictions for a topic and submit each one on-chain
async fn generate_predictions(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionsResponse<PredictionSubmission>>, ApiError> {
    let topic = required_field(&body, |r: TopicRequest| r.topic)
        .ok_or_else(|| ApiError::bad_request("Topic is required"))?;

    info!("Generating predictions for topic: {}", topic);

    let predictions = state
        .orchestrator
        .create_predictions(&topic)
        .await
        .map_err(|e| {
            error!("Prediction generation failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(PredictionsResponse { predictions }))
}

/// Adjudicate an on-chain prediction and submit the outcome
async fn finalize_prediction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FinalizeResponse>, ApiError> {
    let prediction_id = parse_prediction_id(&id)?;
    info!("Finalizing prediction {}", prediction_id);

    let receipt = state
        .orchestrator
        .finalize_prediction(prediction_id)
        .await
        .map_err(|e| {
            error!("Finalization of prediction {} failed: {}", prediction_id, e);
            ApiError::from(e)
        })?;

    Ok(Json(FinalizeResponse {
        message: "Prediction finalized successfully".to_string(),
        outcome: receipt.outcome,
        transaction_hash: receipt.transaction_hash,
    }))
}

async fn get_prediction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OnChainPrediction>, ApiError> {
    let prediction_id = parse_prediction_id(&id)?;

    let prediction = state
        .orchestrator
        .prediction_details(prediction_id)
        .await
        .map_err(|e| {
            error!("Failed to read prediction {}: {}", prediction_id, e);
            ApiError::from(e).without_stack()
        })?;

    Ok(Json(prediction))
}

async fn get_user_stats(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<UserStats>, ApiError> {
    let user: Address = address
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid address: {}", address)))?;

    let stats = state.orchestrator.user_stats(user).await.map_err(|e| {
        error!("Failed to read stats for {}: {}", user, e);
        ApiError::from(e).without_stack()
    })?;

    Ok(Json(stats))
}

fn parse_prediction_id(id: &str) -> Result<u64, ApiError> {
    id.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid prediction id: {}", id)))
}
