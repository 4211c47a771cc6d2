//! User management handlers (admin only)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::extract::AppJson;
use crate::models::NewUser;
use crate::services::UserService;
use crate::AppState;
use shared::ApiResponse;

/// List all users with their profiles
pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    let service = UserService::new(state.db.clone());

    match service.list_users().await {
        Ok(users) => (StatusCode::OK, Json(ApiResponse::ok(users))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a staff or admin account
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(input): AppJson<NewUser>,
) -> impl IntoResponse {
    let service = UserService::new(state.db.clone());

    match service.create_user(input).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(ApiResponse::ok(user).with_message("User created successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
