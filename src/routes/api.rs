use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{IpHistoryRow, ReportParams, ReportQuery, ReportRow};
use crate::report::{query_report, search_by_ip};
use crate::AppState;

#[derive(Serialize)]
struct ReportResponse {
    generated_at: DateTime<Utc>,
    query: ReportQuery,
    rows: Vec<ReportRow>,
}

#[derive(Deserialize)]
struct SearchParams {
    ip: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    ip: String,
    rows: Vec<IpHistoryRow>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/api/report", get(report_json))
        .route("/admin/api/search", get(search_json))
        .route("/admin/export", get(export_report))
}

async fn build_report(state: &AppState, params: ReportParams) -> Result<ReportResponse, AppError> {
    let query = ReportQuery::from(params);
    let now = Utc::now();
    let rows = query_report(&state.db, &query, now).await?;
    Ok(ReportResponse {
        generated_at: now,
        query,
        rows,
    })
}

async fn report_json(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ReportResponse>, AppError> {
    Ok(Json(build_report(&state, params).await?))
}

async fn search_json(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let ip = super::search_input(params.ip)?;
    let rows = search_by_ip(&state.db, &ip).await?;
    Ok(Json(SearchResponse { ip, rows }))
}

/// Same payload as the JSON report, served as a file download.
async fn export_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    let report = build_report(&state, params).await?;

    let filename = format!(
        "ipstats-{}-{}.json",
        report.query.filter,
        report.generated_at.format("%Y-%m-%d")
    );
    let content_disposition = format!("attachment; filename=\"{}\"", filename);

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(&content_disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, Json(report)))
}
