//! Reporting handlers for distribution analytics and data export
//!
//! Every report is reachable as GET (query string) and POST (JSON body) with
//! the same filters. GET with `format=csv` downloads the data rows.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{AppJson, AppQuery};
use crate::models::{ReportFilters, ReportResponse};
use crate::services::reporting::{DistributedCsvRow, ReportingService};
use crate::AppState;

fn csv_download<T: Serialize>(rows: &[T], file_name: &str) -> AppResult<Response> {
    let csv = ReportingService::export_to_csv(rows)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        csv,
    )
        .into_response())
}

fn reporting(state: &AppState) -> ReportingService {
    ReportingService::new(state.db.clone(), &state.config.reports)
}

async fn beneficiaries(state: &AppState, filters: &ReportFilters, csv: bool) -> AppResult<Response> {
    let (records, summary) = reporting(state).get_beneficiaries(filters).await?;

    if csv {
        return csv_download(&records, "beneficiaries.csv");
    }
    Ok(Json(ReportResponse::new(records, summary).with_filters(filters.location_scope())).into_response())
}

async fn distributed_batches(
    state: &AppState,
    filters: &ReportFilters,
    csv: bool,
) -> AppResult<Response> {
    let (batches, summary) = reporting(state).get_distributed_batches(filters).await?;

    if csv {
        return csv_download(&DistributedCsvRow::flatten(&batches), "distributed_batches.csv");
    }
    Ok(Json(ReportResponse::new(batches, summary)).into_response())
}

async fn undistributed_batches(
    state: &AppState,
    filters: &ReportFilters,
    csv: bool,
) -> AppResult<Response> {
    let (batches, summary) = reporting(state).get_undistributed_batches(filters).await?;

    if csv {
        return csv_download(&batches, "undistributed_batches.csv");
    }
    Ok(Json(ReportResponse::new(batches, summary)).into_response())
}

async fn fingerling_count(
    state: &AppState,
    filters: &ReportFilters,
    csv: bool,
) -> AppResult<Response> {
    let (counts, summary) = reporting(state).get_fingerling_count(filters).await?;

    if csv {
        return csv_download(&counts, "fingerling_count.csv");
    }
    Ok(Json(ReportResponse::new(counts, summary)).into_response())
}

/// Beneficiaries report (GET)
pub async fn get_beneficiaries(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<ReportFilters>,
) -> AppResult<Response> {
    beneficiaries(&state, &filters, filters.wants_csv()).await
}

/// Beneficiaries report (POST)
pub async fn post_beneficiaries(
    State(state): State<AppState>,
    AppJson(filters): AppJson<ReportFilters>,
) -> AppResult<Response> {
    beneficiaries(&state, &filters, false).await
}

/// Distributed batches report (GET)
pub async fn get_distributed_batches(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<ReportFilters>,
) -> AppResult<Response> {
    distributed_batches(&state, &filters, filters.wants_csv()).await
}

/// Distributed batches report (POST)
pub async fn post_distributed_batches(
    State(state): State<AppState>,
    AppJson(filters): AppJson<ReportFilters>,
) -> AppResult<Response> {
    distributed_batches(&state, &filters, false).await
}

/// Undistributed batches report (GET)
pub async fn get_undistributed_batches(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<ReportFilters>,
) -> AppResult<Response> {
    undistributed_batches(&state, &filters, filters.wants_csv()).await
}

/// Undistributed batches report (POST)
pub async fn post_undistributed_batches(
    State(state): State<AppState>,
    AppJson(filters): AppJson<ReportFilters>,
) -> AppResult<Response> {
    undistributed_batches(&state, &filters, false).await
}

/// Fingerling count by date (GET)
pub async fn get_fingerling_count(
    State(state): State<AppState>,
    AppQuery(filters): AppQuery<ReportFilters>,
) -> AppResult<Response> {
    fingerling_count(&state, &filters, filters.wants_csv()).await
}

/// Fingerling count by date (POST)
pub async fn post_fingerling_count(
    State(state): State<AppState>,
    AppJson(filters): AppJson<ReportFilters>,
) -> AppResult<Response> {
    fingerling_count(&state, &filters, false).await
}
