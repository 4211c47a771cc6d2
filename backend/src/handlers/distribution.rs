//! Distribution record HTTP handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::AuthUser;
use crate::models::{DistributionStats, DistributionUpdate, NewDistribution, ReportFilters};
use crate::services::distribution::{
    DistributionQuery, DistributionService, SuggestionQuery, Suggestions,
};
use crate::services::ReportingService;
use crate::AppState;
use shared::ApiResponse;

/// List distributions with filters and pagination
pub async fn list_distributions(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DistributionQuery>,
) -> impl IntoResponse {
    let service = DistributionService::new(state.db.clone());

    match service.list_distributions(&query).await {
        Ok((records, pagination)) => (
            StatusCode::OK,
            Json(ApiResponse::paginated(records, pagination)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a single distribution
pub async fn get_distribution(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> impl IntoResponse {
    let service = DistributionService::new(state.db.clone());

    match service.get_distribution(id).await {
        Ok(record) => (StatusCode::OK, Json(ApiResponse::ok(record))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a distribution for the signed-in user
pub async fn create_distribution(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(input): AppJson<NewDistribution>,
) -> impl IntoResponse {
    let service = DistributionService::new(state.db.clone());

    match service.create_distribution(user.user_id, input).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(ApiResponse::ok(record).with_message("Distribution recorded successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a distribution
pub async fn update_distribution(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(input): AppJson<DistributionUpdate>,
) -> impl IntoResponse {
    let service = DistributionService::new(state.db.clone());

    match service.update_distribution(id, input).await {
        Ok(record) => (
            StatusCode::OK,
            Json(ApiResponse::ok(record).with_message("Distribution updated successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a distribution
pub async fn delete_distribution(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> impl IntoResponse {
    let service = DistributionService::new(state.db.clone());

    match service.delete_distribution(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::message("Distribution deleted successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Dashboard statistics
pub async fn get_stats(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<ReportFilters>,
) -> AppResult<Json<ApiResponse<DistributionStats>>> {
    let service = ReportingService::new(state.db.clone(), &state.config.reports);
    let stats = service.get_stats(&filters).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// Autocomplete values for the distribution form
pub async fn get_suggestions(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SuggestionQuery>,
) -> AppResult<Json<ApiResponse<Suggestions>>> {
    let service = DistributionService::new(state.db.clone());
    let suggestions = service.suggestions(&query).await?;
    Ok(Json(ApiResponse::ok(suggestions)))
}
