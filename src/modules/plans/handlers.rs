use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use axum::Json;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::db::models::UpsertPlan;
use crate::db::repositories::{PlanRepository, TeamRepository};
use crate::error::AppResult;
use crate::middleware::auth::AuthContext;
use crate::response;
use crate::validation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPlansQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

pub async fn list_plans(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Path(team_id): Path<String>,
    Query(query): Query<ListPlansQuery>,
) -> AppResult<Response> {
    let plans =
        PlanRepository::list_by_team(&state.db, &team_id, query.include_inactive).await?;
    Ok(response::ok(plans))
}

pub async fn get_plan(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Path((team_id, season)): Path<(String, String)>,
) -> AppResult<Response> {
    let plan = PlanRepository::get(&state.db, &team_id, &season).await?;
    Ok(response::ok(plan))
}

/// Upsert: overwrites the rubric at (team, season), preserving the original
/// `created_at`/`created_by`.
pub async fn upsert_plan(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path((team_id, season)): Path<(String, String)>,
    Json(body): Json<UpsertPlan>,
) -> AppResult<Response> {
    ctx.assert_manager_or_admin()?;
    TeamRepository::require_active(&state.db, &team_id).await?;
    validation::validate_plan_config(&body.plan_config)?;

    let plan = PlanRepository::upsert(
        &state.db,
        &team_id,
        &season,
        &body.name,
        body.description.as_deref(),
        body.plan_config,
        body.is_active,
        &ctx.email,
    )
    .await?;
    Ok(response::ok(plan))
}

pub async fn toggle_plan_status(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path((team_id, season)): Path<(String, String)>,
) -> AppResult<Response> {
    ctx.assert_manager_or_admin()?;
    let plan = PlanRepository::toggle_status(&state.db, &team_id, &season, &ctx.email).await?;
    Ok(response::ok(plan))
}
