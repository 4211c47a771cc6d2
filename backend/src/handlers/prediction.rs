//! Prediction proxy handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::external::PredictRequest;
use crate::extract::AppJson;
use crate::AppState;
use shared::ApiResponse;

/// Forward a prediction request to the external model
pub async fn predict(
    State(state): State<AppState>,
    AppJson(request): AppJson<PredictRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let prediction = state.prediction.predict(request).await?;
    Ok(Json(ApiResponse::ok(prediction)))
}
