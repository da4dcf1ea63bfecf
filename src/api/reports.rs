use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::state::AppState;
use crate::crypto::Claims;
use crate::db::models::{Report, ReportRow};
use crate::error::AppError;
use crate::services::reports::parse_report_id;
use crate::services::{Identity, ReportPayload, ReportQuery};

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: Report,
}

#[derive(Debug, Serialize)]
pub struct ReportListResponse {
    pub reports: Vec<ReportRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub changes: u64,
}

/// POST /api/reports (requires auth)
pub async fn create_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<ReportPayload>,
) -> Result<Json<ReportResponse>, AppError> {
    let report = state.reports.create(&Identity::from(&claims), payload).await?;
    Ok(Json(ReportResponse { report }))
}

/// GET /api/reports?q=&type=&status= (requires auth)
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> Result<Json<ReportListResponse>, AppError> {
    let reports = state.reports.search(&Identity::from(&claims), &query).await?;
    Ok(Json(ReportListResponse { reports }))
}

/// PATCH /api/reports/:id/status (requires auth, LOGIST)
pub async fn set_report_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> Result<Json<OkResponse>, AppError> {
    state
        .reports
        .set_status(&Identity::from(&claims), parse_report_id(&id), req.status.as_deref())
        .await?;
    Ok(Json(OkResponse { ok: true }))
}

/// DELETE /api/reports/:id (requires auth, LOGIST)
pub async fn delete_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let changes = state
        .reports
        .delete(&Identity::from(&claims), parse_report_id(&id))
        .await?;
    Ok(Json(DeleteResponse { ok: true, changes }))
}
