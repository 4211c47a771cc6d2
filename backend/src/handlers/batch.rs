//! Batch management HTTP handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::{BatchUpdate, NewBatch};
use crate::services::batch::{BatchQuery, BatchService};
use crate::AppState;
use shared::ApiResponse;

/// List batches with distributed/remaining counts
pub async fn list_batches(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BatchQuery>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.list_batches(&query).await {
        Ok((batches, pagination)) => (
            StatusCode::OK,
            Json(ApiResponse::paginated(batches, pagination)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a batch with its progress
pub async fn get_batch(
    State(state): State<AppState>,
    AppPath(batch_id): AppPath<String>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.get_batch(&batch_id).await {
        Ok(batch) => (StatusCode::OK, Json(ApiResponse::ok(batch))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new batch
pub async fn create_batch(
    State(state): State<AppState>,
    AppJson(input): AppJson<NewBatch>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.create_batch(input).await {
        Ok(batch) => (
            StatusCode::CREATED,
            Json(ApiResponse::ok(batch).with_message("Batch created successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a batch
pub async fn update_batch(
    State(state): State<AppState>,
    AppPath(batch_id): AppPath<String>,
    AppJson(input): AppJson<BatchUpdate>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.update_batch(&batch_id, input).await {
        Ok(batch) => (
            StatusCode::OK,
            Json(ApiResponse::ok(batch).with_message("Batch updated successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a batch
pub async fn delete_batch(
    State(state): State<AppState>,
    AppPath(batch_id): AppPath<String>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.delete_batch(&batch_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::message("Batch deleted successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
