use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use axum::Json;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::db::models::{NewTeam, TeamStatusFilter, UpdateManager};
use crate::db::repositories::TeamRepository;
use crate::error::AppResult;
use crate::middleware::auth::AuthContext;
use crate::response;
use crate::validation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTeamsQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub status: TeamStatusFilter,
    pub manager_id: Option<String>,
}

pub async fn list_teams(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Query(query): Query<ListTeamsQuery>,
) -> AppResult<Response> {
    let teams = TeamRepository::list(
        &state.db,
        query.search.as_deref(),
        query.status,
        query.manager_id.as_deref(),
    )
    .await?;
    Ok(response::ok(teams))
}

pub async fn create_team(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<NewTeam>,
) -> AppResult<Response> {
    ctx.assert_admin()?;
    validation::validate_team_id(&body.team_id)?;
    validation::validate_team_name(&body.name)?;

    let team = TeamRepository::create(&state.db, &body.team_id, &body.name, &ctx.email).await?;
    Ok(response::created(team))
}

pub async fn get_team(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Path(team_id): Path<String>,
) -> AppResult<Response> {
    let team = TeamRepository::require_active(&state.db, &team_id).await?;
    Ok(response::ok(team))
}

pub async fn team_members(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Path(team_id): Path<String>,
) -> AppResult<Response> {
    let members = TeamRepository::member_list(&state.db, &team_id).await?;
    Ok(response::ok(members))
}

pub async fn update_team_manager(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(team_id): Path<String>,
    Json(body): Json<UpdateManager>,
) -> AppResult<Response> {
    ctx.assert_admin()?;
    let team = TeamRepository::update_manager(
        &state.db,
        &team_id,
        body.manager_id.as_deref(),
        &ctx.email,
    )
    .await?;
    Ok(response::ok(team))
}

pub async fn archive_team(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(team_id): Path<String>,
) -> AppResult<Response> {
    ctx.assert_admin()?;
    TeamRepository::archive(&state.db, &team_id, &ctx.email).await?;
    Ok(response::no_content())
}
