use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use axum::Json;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::db::models::{NewUser, UpdateRoles, User, UserStatusFilter};
use crate::db::repositories::UserRepository;
use crate::error::AppResult;
use crate::middleware::auth::AuthContext;
use crate::pagination::{decode_token, Page};
use crate::response;
use crate::validation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub status: UserStatusFilter,
    pub limit: Option<i64>,
    pub token: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<Response> {
    let default_limit = state.env.app.page_size as i64;
    let limit = query.limit.unwrap_or(default_limit).clamp(1, default_limit);
    let after = match &query.token {
        Some(token) => Some(decode_token(token)?),
        None => None,
    };

    let rows = UserRepository::list(
        &state.db,
        query.search.as_deref(),
        query.status,
        after.as_deref(),
        limit,
    )
    .await?;

    let page = Page::from_rows(rows, limit as usize, |user: &User| user.user_id.as_str());
    Ok(response::ok(page))
}

pub async fn create_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<NewUser>,
) -> AppResult<Response> {
    ctx.assert_admin()?;
    validation::validate_email(&body.user_id)?;
    validation::validate_display_name(&body.name)?;
    let roles = validation::validate_roles(&body.roles)?;

    let user = UserRepository::create(
        &state.db,
        &body.user_id,
        body.name.trim(),
        roles,
        body.team.as_deref(),
        &ctx.email,
    )
    .await?;
    Ok(response::created(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Path(user_id): Path<String>,
) -> AppResult<Response> {
    let user = UserRepository::require(&state.db, &user_id).await?;
    Ok(response::ok(user))
}

pub async fn update_user_roles(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateRoles>,
) -> AppResult<Response> {
    ctx.assert_admin()?;
    let roles = validation::validate_roles(&body.roles)?;
    let user = UserRepository::update_roles(&state.db, &user_id, roles, &ctx.email).await?;
    Ok(response::ok(user))
}

/// Deactivation: the database write is authoritative; the identity-provider
/// disable that follows is best-effort and never fails the request.
pub async fn deactivate_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(user_id): Path<String>,
) -> AppResult<Response> {
    ctx.assert_admin()?;
    UserRepository::deactivate(&state.db, &user_id, &ctx.email).await?;
    state.idp.disable_account(&user_id).await;
    Ok(response::no_content())
}

/// Returns the caller's own record, provisioning it on first sign-in.
pub async fn me(State(state): State<AppState>, ctx: AuthContext) -> AppResult<Response> {
    let user = UserRepository::ensure_exists(&state.db, &ctx.email, &ctx.name).await?;
    Ok(response::ok(user))
}
