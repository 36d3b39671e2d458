use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use axum::Json;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::db::models::{NewReport, ReportStatus, ReportType, UpdateReport};
use crate::db::repositories::ReportRepository;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::middleware::auth::AuthContext;
use crate::response;

pub async fn create_report(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<NewReport>,
) -> AppResult<Response> {
    let report_type: ReportType = body.report_type.parse().map_err(|_| {
        AppError::domain(
            ErrorCode::InvalidReportType,
            format!(
                "'{}' is not a valid report type (expected 'self' or 'manager')",
                body.report_type
            ),
        )
    })?;
    if report_type == ReportType::Manager {
        ctx.assert_manager_or_admin()?;
    }

    let report = ReportRepository::create(
        &state.db,
        &body.user_id,
        &body.assessment_id,
        report_type,
        &ctx.email,
        body.responses,
    )
    .await?;
    Ok(response::created(report))
}

pub async fn get_report(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Path(report_id): Path<String>,
) -> AppResult<Response> {
    let report = ReportRepository::get(&state.db, &report_id).await?;
    Ok(response::ok(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    pub user_id: String,
    pub assessment_id: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

pub async fn list_reports(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Query(query): Query<ListReportsQuery>,
) -> AppResult<Response> {
    let reports = ReportRepository::list_for_subject(
        &state.db,
        &query.user_id,
        query.assessment_id.as_deref(),
        query.include_inactive,
    )
    .await?;
    Ok(response::ok(reports))
}

pub async fn update_report(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Path(report_id): Path<String>,
    Json(body): Json<UpdateReport>,
) -> AppResult<Response> {
    let status = match &body.status {
        Some(raw) => Some(raw.parse::<ReportStatus>().map_err(|_| {
            AppError::domain(
                ErrorCode::InvalidStatus,
                format!("'{}' is not a valid report status", raw),
            )
        })?),
        None => None,
    };

    let report = ReportRepository::update(&state.db, &report_id, body.responses, status).await?;
    Ok(response::ok(report))
}

pub async fn submit_report(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Path(report_id): Path<String>,
) -> AppResult<Response> {
    let report = ReportRepository::submit(&state.db, &report_id).await?;
    Ok(response::ok(report))
}

pub async fn share_report(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(report_id): Path<String>,
) -> AppResult<Response> {
    ctx.assert_manager_or_admin()?;
    let report = ReportRepository::share(&state.db, &report_id, &ctx.email).await?;
    Ok(response::ok(report))
}

pub async fn delete_report(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Path(report_id): Path<String>,
) -> AppResult<Response> {
    ReportRepository::soft_delete(&state.db, &report_id).await?;
    Ok(response::no_content())
}
