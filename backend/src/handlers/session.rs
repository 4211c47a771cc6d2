//! Stocking/field session HTTP handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::AuthUser;
use crate::models::{NewSession, SessionUpdate};
use crate::services::session::{SessionQuery, SessionService};
use crate::AppState;
use shared::ApiResponse;

pub async fn list_sessions(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SessionQuery>,
) -> impl IntoResponse {
    let service = SessionService::new(state.db.clone());

    match service.list_sessions(&query).await {
        Ok(sessions) => (StatusCode::OK, Json(ApiResponse::ok(sessions))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> impl IntoResponse {
    let service = SessionService::new(state.db.clone());

    match service.get_session(id).await {
        Ok(session) => (StatusCode::OK, Json(ApiResponse::ok(session))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(input): AppJson<NewSession>,
) -> impl IntoResponse {
    let service = SessionService::new(state.db.clone());

    match service.create_session(user.user_id, input).await {
        Ok(session) => (
            StatusCode::CREATED,
            Json(ApiResponse::ok(session).with_message("Session recorded successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(input): AppJson<SessionUpdate>,
) -> impl IntoResponse {
    let service = SessionService::new(state.db.clone());

    match service.update_session(id, input).await {
        Ok(session) => (
            StatusCode::OK,
            Json(ApiResponse::ok(session).with_message("Session updated successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> impl IntoResponse {
    let service = SessionService::new(state.db.clone());

    match service.delete_session(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::message("Session deleted successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
