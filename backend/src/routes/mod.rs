//! Route definitions for the Fingerling Distribution Tracking System

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, require_admin},
    AppState,
};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let upload_limit = state.config.server.max_upload_bytes * 2;

    let protected = Router::new()
        .route("/auth/me", get(handlers::me))
        .nest("/users", user_routes())
        .nest("/batches", batch_routes())
        .nest("/distributions-data", distribution_routes())
        .nest("/sessions", session_routes())
        .nest("/reports", report_routes())
        .route("/predict", post(handlers::predict))
        .route(
            "/upload",
            post(handlers::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        .merge(protected)
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// User management routes (admin only)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route_layer(middleware::from_fn(require_admin))
}

/// Batch routes
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches).post(handlers::create_batch))
        .route(
            "/:id",
            get(handlers::get_batch)
                .put(handlers::update_batch)
                .delete(handlers::delete_batch),
        )
}

/// Distribution routes
fn distribution_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_distributions).post(handlers::create_distribution),
        )
        .route("/stats", get(handlers::get_stats))
        .route("/suggestions", get(handlers::get_suggestions))
        .route(
            "/:id",
            get(handlers::get_distribution)
                .put(handlers::update_distribution)
                .delete(handlers::delete_distribution),
        )
}

/// Session routes
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sessions).post(handlers::create_session))
        .route(
            "/:id",
            get(handlers::get_session)
                .put(handlers::update_session)
                .delete(handlers::delete_session),
        )
}

/// Report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/beneficiaries",
            get(handlers::get_beneficiaries).post(handlers::post_beneficiaries),
        )
        .route(
            "/distributed-batches",
            get(handlers::get_distributed_batches).post(handlers::post_distributed_batches),
        )
        .route(
            "/undistributed-batches",
            get(handlers::get_undistributed_batches).post(handlers::post_undistributed_batches),
        )
        .route(
            "/fingerling-count",
            get(handlers::get_fingerling_count).post(handlers::post_fingerling_count),
        )
}
